use std::time::Duration;

use glam::Vec3;
use prism_scene::{Color, DEFAULT_SPIN_RATE, PrimitiveKind, clock::DEFAULT_MAX_FRAME_DELTA};
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::viewport::DEFAULT_MAX_PIXEL_RATIO;

/// How `toggle_spin` behaves while reduced motion is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReducedMotionPolicy {
    /// An explicit toggle may still turn spin back on.
    #[default]
    AllowUserOverride,
    /// Spin stays off until reduced motion is cleared.
    Locked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenePreset {
    /// One object built from `primitive_kind` and `color`.
    #[default]
    Single,
    /// Box, sphere and torus side by side, spinning at increasing rates.
    Showcase,
}

pub const SHOWCASE_BACKGROUND: Color = Color(0x000011);

impl ScenePreset {
    /// Clear color used when none is configured.
    pub fn background(self) -> Color {
        match self {
            ScenePreset::Single => prism_scene::DEFAULT_BACKGROUND,
            ScenePreset::Showcase => SHOWCASE_BACKGROUND,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeOptions {
    pub primitive_kind: PrimitiveKind,
    pub color: Color,
    pub enable_shadows: bool,
    pub enable_spin: bool,
    pub enable_controls: bool,
    /// Unlit flat color instead of Phong shading.
    pub unlit: bool,
    pub spin_rate: Vec3,
    pub preset: ScenePreset,
    pub ground: bool,
    pub point_light: bool,
    /// `None` takes the preset's background.
    pub background: Option<Color>,
    /// 4x multisampling on GPU surfaces.
    pub antialias: bool,
    pub reduced_motion: bool,
    pub reduced_motion_policy: ReducedMotionPolicy,
    pub max_frame_delta: Duration,
    pub max_pixel_ratio: f64,
}

impl RuntimeOptions {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_frame_delta.is_zero() {
            return Err(ConfigurationError::InvalidOption {
                name: "max_frame_delta",
                reason: "must be positive".into(),
            });
        }
        if !(self.max_pixel_ratio.is_finite() && self.max_pixel_ratio >= 1.0) {
            return Err(ConfigurationError::InvalidOption {
                name: "max_pixel_ratio",
                reason: format!("must be at least 1.0, got {}", self.max_pixel_ratio),
            });
        }
        if !self.spin_rate.is_finite() {
            return Err(ConfigurationError::InvalidOption {
                name: "spin_rate",
                reason: "must be finite".into(),
            });
        }
        Ok(())
    }
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            primitive_kind: PrimitiveKind::Box,
            color: Color(0x00ff88),
            enable_shadows: true,
            enable_spin: true,
            enable_controls: true,
            unlit: false,
            spin_rate: DEFAULT_SPIN_RATE,
            preset: ScenePreset::Single,
            ground: false,
            point_light: false,
            background: None,
            antialias: true,
            reduced_motion: false,
            reduced_motion_policy: ReducedMotionPolicy::AllowUserOverride,
            max_frame_delta: DEFAULT_MAX_FRAME_DELTA,
            max_pixel_ratio: DEFAULT_MAX_PIXEL_RATIO,
        }
    }
}
