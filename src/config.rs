use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use glam::Vec3;
use prism_runtime::{ConfigurationError, ReducedMotionPolicy, RuntimeOptions, ScenePreset};
use prism_scene::{Color, DEFAULT_SPIN_RATE, PrimitiveKind};
use serde::{Deserialize, Serialize};

use crate::cli::Args;

pub const DEFAULT_CONFIG_FILE: &str = "prism.toml";
pub const DEFAULT_RELAY_ADDRESS: &str = "127.0.0.1:7878";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowSection {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            title: "Prism".into(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneSection {
    pub preset: ScenePreset,
    /// Falls back to the preset's background.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
    pub ground: bool,
}

impl Default for SceneSection {
    fn default() -> Self {
        Self {
            preset: ScenePreset::Single,
            background: None,
            ground: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ObjectSection {
    pub kind: PrimitiveKind,
    pub color: Color,
    /// Radians per second around x, y, z.
    pub spin_rate: [f32; 3],
    pub unlit: bool,
}

impl Default for ObjectSection {
    fn default() -> Self {
        Self {
            kind: PrimitiveKind::Box,
            color: Color(0x00ff88),
            spin_rate: DEFAULT_SPIN_RATE.to_array(),
            unlit: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightsSection {
    pub point_light: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeSection {
    pub enable_spin: bool,
    pub enable_shadows: bool,
    pub enable_controls: bool,
    pub antialias: bool,
    pub reduced_motion: bool,
    pub reduced_motion_policy: ReducedMotionPolicy,
    /// Seconds.
    pub max_frame_delta: f64,
    pub max_pixel_ratio: f64,
}

impl Default for RuntimeSection {
    fn default() -> Self {
        let defaults = RuntimeOptions::default();
        Self {
            enable_spin: defaults.enable_spin,
            enable_shadows: defaults.enable_shadows,
            enable_controls: defaults.enable_controls,
            antialias: defaults.antialias,
            reduced_motion: defaults.reduced_motion,
            reduced_motion_policy: defaults.reduced_motion_policy,
            max_frame_delta: defaults.max_frame_delta.as_secs_f64(),
            max_pixel_ratio: defaults.max_pixel_ratio,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayMode {
    #[default]
    Off,
    /// Wait for one peer on `address`.
    Listen,
    /// Dial a peer at `address`.
    Connect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelaySection {
    pub mode: RelayMode,
    pub address: String,
}

impl Default for RelaySection {
    fn default() -> Self {
        Self {
            mode: RelayMode::Off,
            address: DEFAULT_RELAY_ADDRESS.into(),
        }
    }
}

/// Contents of `prism.toml`. Every field has a default, so a partial or
/// empty file is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub window: WindowSection,
    pub scene: SceneSection,
    pub object: ObjectSection,
    pub lights: LightsSection,
    pub runtime: RuntimeSection,
    pub relay: RelaySection,
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    /// An explicit `--config` must exist; otherwise `./prism.toml` is used
    /// when present and defaults when not.
    pub fn resolve(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }
        let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            Ok((Self::load(&fallback)?, Some(fallback)))
        } else {
            log::info!("no {DEFAULT_CONFIG_FILE} found, using built-in defaults");
            Ok((Self::default(), None))
        }
    }

    /// Command-line flags win over the file.
    pub fn apply_args(&mut self, args: &Args) {
        if args.reduced_motion {
            self.runtime.reduced_motion = true;
        }
        if let Some(addr) = &args.relay_listen {
            self.relay.mode = RelayMode::Listen;
            self.relay.address = addr.clone();
        }
        if let Some(addr) = &args.relay_connect {
            self.relay.mode = RelayMode::Connect;
            self.relay.address = addr.clone();
        }
    }

    pub fn to_runtime_options(&self) -> Result<RuntimeOptions, ConfigurationError> {
        let max_frame_delta = Duration::try_from_secs_f64(self.runtime.max_frame_delta).map_err(|e| {
            ConfigurationError::InvalidOption {
                name: "max_frame_delta",
                reason: format!("{}: {e}", self.runtime.max_frame_delta),
            }
        })?;

        let options = RuntimeOptions {
            primitive_kind: self.object.kind,
            color: self.object.color,
            enable_shadows: self.runtime.enable_shadows,
            enable_spin: self.runtime.enable_spin,
            enable_controls: self.runtime.enable_controls,
            unlit: self.object.unlit,
            spin_rate: Vec3::from_array(self.object.spin_rate),
            preset: self.scene.preset,
            ground: self.scene.ground,
            point_light: self.lights.point_light,
            background: self.scene.background,
            antialias: self.runtime.antialias,
            reduced_motion: self.runtime.reduced_motion,
            reduced_motion_policy: self.runtime.reduced_motion_policy,
            max_frame_delta,
            max_pixel_ratio: self.runtime.max_pixel_ratio,
        };
        options.validate()?;
        Ok(options)
    }
}
