use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::patch::TransformPatch;
use crate::primitive::ObjectDescriptor;

/// 0.01 rad per frame at 60 Hz.
pub const DEFAULT_SPIN_RATE: Vec3 = Vec3::new(0.6, 0.6, 0.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) u32);

impl ObjectId {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Position, XYZ Euler rotation in radians, and per-axis scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn matrix(&self) -> Mat4 {
        let r = self.rotation;
        Mat4::from_scale_rotation_translation(
            self.scale,
            Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z),
            self.position,
        )
    }

    pub fn apply(&mut self, patch: &TransformPatch) {
        if let Some(v) = patch.x {
            self.position.x = v;
        }
        if let Some(v) = patch.y {
            self.position.y = v;
        }
        if let Some(v) = patch.z {
            self.position.z = v;
        }
        if let Some(v) = patch.rx {
            self.rotation.x = v;
        }
        if let Some(v) = patch.ry {
            self.rotation.y = v;
        }
        if let Some(v) = patch.rz {
            self.rotation.z = v;
        }
        if let Some(v) = patch.scale {
            self.scale = Vec3::splat(v);
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

pub struct SceneObject {
    id: ObjectId,
    descriptor: ObjectDescriptor,
    pub transform: Transform,
    /// Radians per second on each axis while spin is on.
    pub spin_rate: Vec3,
}

impl SceneObject {
    pub(crate) fn new(id: ObjectId, descriptor: ObjectDescriptor, transform: Transform) -> Self {
        Self {
            id,
            descriptor,
            transform,
            spin_rate: Vec3::ZERO,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn descriptor(&self) -> &ObjectDescriptor {
        &self.descriptor
    }

    pub fn spins(&self) -> bool {
        self.spin_rate != Vec3::ZERO
    }

    /// Advances rotation from whatever the current pose is.
    pub fn spin(&mut self, dt: f32) {
        if self.spins() {
            self.transform.rotation += self.spin_rate * dt;
        }
    }
}
