//! Wire format for peer position updates.
//!
//! One JSON object per message, e.g. `{"x": 1.5, "z": -2}`. Any subset of
//! `x`, `y`, `z` may be present; other keys are ignored.

use prism_scene::TransformPatch;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RelayResult, TransportError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
}

impl PositionPatch {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.z.is_none()
    }
}

impl From<PositionPatch> for TransformPatch {
    fn from(p: PositionPatch) -> Self {
        TransformPatch {
            x: p.x,
            y: p.y,
            z: p.z,
            ..TransformPatch::default()
        }
    }
}

/// Parses one message. `null` counts as an absent field.
pub fn decode(text: &str) -> RelayResult<PositionPatch> {
    let value: Value = serde_json::from_str(text)?;
    let fields = match value {
        Value::Object(fields) => fields,
        other => {
            return Err(TransportError::Unrecognized(format!(
                "expected a JSON object, got {}",
                kind_of(&other)
            )));
        }
    };

    let mut patch = PositionPatch::default();
    for (axis, slot) in [("x", &mut patch.x), ("y", &mut patch.y), ("z", &mut patch.z)] {
        match fields.get(axis) {
            None | Some(Value::Null) => {}
            Some(Value::Number(n)) => {
                let v = n.as_f64().map(|v| v as f32).filter(|v| v.is_finite());
                match v {
                    Some(v) => *slot = Some(v),
                    None => {
                        return Err(TransportError::Unrecognized(format!(
                            "`{axis}` is out of range: {n}"
                        )));
                    }
                }
            }
            Some(other) => {
                return Err(TransportError::Unrecognized(format!(
                    "`{axis}` must be a number, got {}",
                    kind_of(other)
                )));
            }
        }
    }

    if patch.is_empty() {
        return Err(TransportError::Unrecognized("no position field".into()));
    }
    Ok(patch)
}

pub fn encode(patch: &PositionPatch) -> RelayResult<String> {
    Ok(serde_json::to_string(patch)?)
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_patch_keeps_absent_axes_empty() {
        let patch = decode(r#"{"y": 2.5}"#).unwrap();
        assert_eq!(
            patch,
            PositionPatch {
                x: None,
                y: Some(2.5),
                z: None
            }
        );
    }

    #[test]
    fn extra_keys_are_ignored() {
        let patch = decode(r#"{"type": "move", "x": 1, "z": -3, "peer": "abc"}"#).unwrap();
        assert_eq!(patch.x, Some(1.0));
        assert_eq!(patch.z, Some(-3.0));
        assert_eq!(patch.y, None);
    }

    #[test]
    fn null_axis_counts_as_absent() {
        let patch = decode(r#"{"x": null, "y": 4}"#).unwrap();
        assert_eq!(patch.x, None);
        assert_eq!(patch.y, Some(4.0));
    }

    #[test]
    fn invalid_json_is_malformed() {
        assert!(matches!(decode("{x: 1"), Err(TransportError::Malformed(_))));
        assert!(matches!(decode(""), Err(TransportError::Malformed(_))));
    }

    #[test]
    fn unrecognized_shapes_are_rejected() {
        for text in [
            "[1, 2, 3]",
            "42",
            r#""x""#,
            "{}",
            r#"{"rx": 1.0}"#,
            r#"{"x": "1.0"}"#,
            r#"{"x": 1, "y": true}"#,
            r#"{"z": 1e300}"#,
        ] {
            assert!(
                matches!(decode(text), Err(TransportError::Unrecognized(_))),
                "{text}"
            );
        }
    }

    #[test]
    fn encode_omits_absent_axes() {
        let text = encode(&PositionPatch {
            x: Some(1.0),
            ..PositionPatch::default()
        })
        .unwrap();
        assert_eq!(text, r#"{"x":1.0}"#);
        assert_eq!(decode(&text).unwrap().x, Some(1.0));
    }

    #[test]
    fn converts_to_position_only_transform_patch() {
        let patch: TransformPatch = PositionPatch::new(1.0, 2.0, 3.0).into();
        assert_eq!(patch, TransformPatch::position(1.0, 2.0, 3.0));
        assert!(patch.rx.is_none() && patch.scale.is_none());
    }
}
