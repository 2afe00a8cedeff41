use glam::Vec3;

use crate::primitive::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    /// Light shines from here towards the origin.
    pub position: Vec3,
    pub cast_shadow: bool,
    pub shadow_map_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: Color,
    pub intensity: f32,
    /// Zero means no falloff.
    pub range: f32,
    pub position: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lights {
    pub ambient: AmbientLight,
    pub directional: DirectionalLight,
    pub point: Option<PointLight>,
}

impl Lights {
    pub fn warm_point_light() -> PointLight {
        PointLight {
            color: Color(0xff6600),
            intensity: 1.0,
            range: 100.0,
            position: Vec3::new(-5.0, 5.0, 5.0),
        }
    }
}

impl Default for Lights {
    fn default() -> Self {
        Self {
            ambient: AmbientLight {
                color: Color(0x404040),
                intensity: 0.4,
            },
            directional: DirectionalLight {
                color: Color::WHITE,
                intensity: 0.8,
                position: Vec3::new(10.0, 10.0, 5.0),
                cast_shadow: false,
                shadow_map_size: 2048,
            },
            point: None,
        }
    }
}
