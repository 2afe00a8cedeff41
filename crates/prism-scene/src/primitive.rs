use serde::{Deserialize, Serialize};

/// Primitive shapes an object can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    #[default]
    #[serde(alias = "cube")]
    Box,
    Sphere,
    Torus,
}

impl PrimitiveKind {
    pub fn geometry(self) -> Geometry {
        match self {
            PrimitiveKind::Box => Geometry::Box {
                width: 1.0,
                height: 1.0,
                depth: 1.0,
            },
            PrimitiveKind::Sphere => Geometry::Sphere {
                radius: 0.5,
                width_segments: 32,
                height_segments: 32,
            },
            PrimitiveKind::Torus => Geometry::Torus {
                radius: 0.5,
                tube: 0.2,
                radial_segments: 16,
                tubular_segments: 100,
            },
        }
    }
}

/// Construction parameters for a mesh. Fixed once an object is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    },
    Plane {
        width: f32,
        height: f32,
    },
}

/// An sRGB color stored as `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color(0xffffff);
    pub const BLACK: Color = Color(0x000000);

    pub fn rgb8(self) -> [u8; 3] {
        [
            ((self.0 >> 16) & 0xff) as u8,
            ((self.0 >> 8) & 0xff) as u8,
            (self.0 & 0xff) as u8,
        ]
    }

    /// Linear-light components, ready for shading into an sRGB target.
    pub fn to_linear(self) -> [f32; 3] {
        self.rgb8().map(|c| srgb_to_linear(c as f32 / 255.0))
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shading {
    /// Flat color, ignores lights.
    Unlit,
    Phong { shininess: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Color,
    pub shading: Shading,
}

impl Material {
    pub fn phong(color: Color) -> Self {
        Self {
            color,
            shading: Shading::Phong { shininess: 30.0 },
        }
    }

    pub fn unlit(color: Color) -> Self {
        Self {
            color,
            shading: Shading::Unlit,
        }
    }
}

/// Geometry, material and shadow participation of an object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectDescriptor {
    pub geometry: Geometry,
    pub material: Material,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl ObjectDescriptor {
    pub fn primitive(kind: PrimitiveKind, color: Color) -> Self {
        Self {
            geometry: kind.geometry(),
            material: Material::phong(color),
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    pub fn with_shadows(mut self, cast: bool, receive: bool) -> Self {
        self.cast_shadow = cast;
        self.receive_shadow = receive;
        self
    }
}
