use serde::{Deserialize, Serialize};

/// A partial pose update. Only fields that are `Some` are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ry: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rz: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
}

impl TransformPatch {
    pub fn position(x: f32, y: f32, z: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
            ..Self::default()
        }
    }

    pub fn with_x(mut self, v: f32) -> Self {
        self.x = Some(v);
        self
    }

    pub fn with_y(mut self, v: f32) -> Self {
        self.y = Some(v);
        self
    }

    pub fn with_z(mut self, v: f32) -> Self {
        self.z = Some(v);
        self
    }

    pub fn with_rx(mut self, v: f32) -> Self {
        self.rx = Some(v);
        self
    }

    pub fn with_ry(mut self, v: f32) -> Self {
        self.ry = Some(v);
        self
    }

    pub fn with_rz(mut self, v: f32) -> Self {
        self.rz = Some(v);
        self
    }

    pub fn with_scale(mut self, v: f32) -> Self {
        self.scale = Some(v);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
