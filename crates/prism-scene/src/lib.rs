pub mod clock;
pub mod light;
pub mod object;
pub mod patch;
pub mod primitive;

pub use clock::{FrameClock, FrameTime, RateMeter};
pub use light::{AmbientLight, DirectionalLight, Lights, PointLight};
pub use object::{DEFAULT_SPIN_RATE, ObjectId, SceneObject, Transform};
pub use patch::TransformPatch;
pub use primitive::{Color, Geometry, Material, ObjectDescriptor, PrimitiveKind, Shading};

use glam::Vec3;
use prism_camera::PerspectiveCamera;

pub const DEFAULT_BACKGROUND: Color = Color(0x1a1a1a);

/// Everything that gets drawn, plus the clock that drives it.
pub struct SceneState {
    objects: Vec<SceneObject>,
    next_id: u32,
    pub camera: PerspectiveCamera,
    pub lights: Lights,
    pub background: Color,
    pub spin: bool,
    pub clock: FrameClock,
}

impl SceneState {
    pub fn new(camera: PerspectiveCamera, clock: FrameClock) -> Self {
        Self {
            objects: Vec::new(),
            next_id: 0,
            camera,
            lights: Lights::default(),
            background: DEFAULT_BACKGROUND,
            spin: false,
            clock,
        }
    }

    pub fn add_object(&mut self, descriptor: ObjectDescriptor, transform: Transform) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.push(SceneObject::new(id, descriptor, transform));
        id
    }

    /// Adds the 10x10 floor used by the lit presets.
    pub fn add_ground(&mut self) -> ObjectId {
        let descriptor = ObjectDescriptor {
            geometry: Geometry::Plane {
                width: 10.0,
                height: 10.0,
            },
            material: Material::phong(Color(0x333333)),
            cast_shadow: false,
            receive_shadow: true,
        };
        let transform = Transform {
            position: Vec3::new(0.0, -2.0, 0.0),
            rotation: Vec3::new(-std::f32::consts::FRAC_PI_2, 0.0, 0.0),
            scale: Vec3::ONE,
        };
        self.add_object(descriptor, transform)
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id() == id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id() == id)
    }

    pub fn apply_patch(&mut self, id: ObjectId, patch: &TransformPatch) -> bool {
        match self.object_mut(id) {
            Some(obj) => {
                obj.transform.apply(patch);
                true
            }
            None => {
                log::warn!("dropping transform patch for unknown object {:?}", id);
                false
            }
        }
    }

    /// Rotates every spinning object when the scene-wide spin flag is on.
    pub fn advance_spin(&mut self, dt: f32) {
        if !self.spin {
            return;
        }
        for obj in &mut self.objects {
            obj.spin(dt);
        }
    }
}
