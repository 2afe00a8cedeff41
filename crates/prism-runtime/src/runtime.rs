use std::time::Duration;

use glam::Vec3;
use prism_camera::{OrbitControls, PerspectiveCamera};
use prism_scene::{
    Color, FrameClock, FrameTime, Lights, Material, ObjectDescriptor, ObjectId, PrimitiveKind,
    SceneState, Transform, TransformPatch,
};

use crate::error::ConfigurationError;
use crate::inbox::{PatchInbox, PatchSender, PatchTarget};
use crate::options::{ReducedMotionPolicy, RuntimeOptions, ScenePreset};
use crate::surface::RenderSurface;
use crate::viewport::{SurfaceSize, Viewport};

const ORBIT_DAMPING: f32 = 0.05;

/// Owns the scene and drives it one frame at a time.
///
/// All mutation goes through `&mut self`, so `tick` cannot overlap with
/// itself or with `apply_transform`. Work produced on other threads arrives
/// through [`SceneRuntime::patch_sender`] and is applied at the next tick.
pub struct SceneRuntime<S: RenderSurface> {
    scene: SceneState,
    surface: S,
    viewport: Viewport,
    surface_size: SurfaceSize,
    options: RuntimeOptions,
    primary: ObjectId,
    controls: Option<OrbitControls>,
    reduced_motion: bool,
    inbox: PatchInbox,
}

impl<S: RenderSurface> SceneRuntime<S> {
    /// Builds the scene and attaches `surface`.
    ///
    /// Nothing touches the surface unless the viewport and options are valid.
    pub fn initialize(
        viewport: Viewport,
        options: RuntimeOptions,
        mut surface: S,
    ) -> Result<Self, ConfigurationError> {
        if viewport.is_empty() {
            return Err(ConfigurationError::ZeroViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        options.validate()?;

        let (mut scene, primary) = build_scene(&viewport, &options);
        scene.spin = options.enable_spin && !options.reduced_motion;

        let surface_size = viewport.surface_size(options.max_pixel_ratio);
        surface.attach(surface_size, &scene)?;

        log::debug!(
            "scene runtime up: {}x{} @{} -> {}x{} px, {} object(s)",
            viewport.width,
            viewport.height,
            viewport.pixel_ratio,
            surface_size.width,
            surface_size.height,
            scene.objects().len()
        );

        let controls = options
            .enable_controls
            .then(|| OrbitControls::new(ORBIT_DAMPING));

        Ok(Self {
            scene,
            surface,
            viewport,
            surface_size,
            reduced_motion: options.reduced_motion,
            options,
            primary,
            controls,
            inbox: PatchInbox::new(),
        })
    }

    /// Matches camera aspect and surface size to the host viewport.
    ///
    /// Cheap to call every frame: unchanged sizes return early.
    pub fn on_viewport_resize(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            log::debug!("ignoring empty viewport {}x{}", viewport.width, viewport.height);
            return;
        }
        if viewport == self.viewport {
            return;
        }

        self.viewport = viewport;
        let (width, height) = viewport.framing();
        self.scene.camera.set_viewport(width, height);

        let size = viewport.surface_size(self.options.max_pixel_ratio);
        if size != self.surface_size {
            log::debug!("resizing surface to {}x{}", size.width, size.height);
            self.surface_size = size;
            self.surface.resize(size);
        }
    }

    /// Advances one frame and renders it.
    pub fn tick(&mut self, now: Duration) -> FrameTime {
        let primary = self.primary;
        while let Some(queued) = self.inbox.try_recv() {
            let id = match queued.target {
                PatchTarget::Primary => primary,
                PatchTarget::Object(id) => id,
            };
            self.scene.apply_patch(id, &queued.patch);
        }

        let frame = self.scene.clock.advance(now);
        self.scene.advance_spin(frame.dt);

        if let Some(controls) = &mut self.controls {
            controls.update(&mut self.scene.camera);
        }

        self.surface.render(&self.scene);
        frame
    }

    /// Writes the fields present in `patch`. Returns `false` for unknown ids.
    pub fn apply_transform(&mut self, object: ObjectId, patch: &TransformPatch) -> bool {
        self.scene.apply_patch(object, patch)
    }

    /// Flips spin for subsequent ticks and returns the new state.
    ///
    /// With reduced motion on and [`ReducedMotionPolicy::Locked`], this is a no-op.
    pub fn toggle_spin(&mut self) -> bool {
        if self.reduced_motion && self.options.reduced_motion_policy == ReducedMotionPolicy::Locked {
            log::info!("spin toggle ignored: reduced motion is locked on");
            return self.scene.spin;
        }
        self.scene.spin = !self.scene.spin;
        self.scene.spin
    }

    /// Mirrors the host's reduced-motion preference.
    ///
    /// Turning it on stops spin immediately. Turning it off never restarts
    /// spin by itself.
    pub fn set_reduced_motion(&mut self, flag: bool) {
        self.reduced_motion = flag;
        if flag {
            self.scene.spin = false;
        }
    }

    /// Adds another object after startup, spinning at `spin_rate`.
    pub fn add_object(
        &mut self,
        descriptor: ObjectDescriptor,
        transform: Transform,
        spin_rate: Vec3,
    ) -> ObjectId {
        let id = self.scene.add_object(descriptor, transform);
        if let Some(obj) = self.scene.object_mut(id) {
            obj.spin_rate = spin_rate;
        }
        id
    }

    pub fn patch_sender(&self) -> PatchSender {
        self.inbox.sender()
    }

    pub fn primary_object(&self) -> ObjectId {
        self.primary
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    pub fn transform(&self, object: ObjectId) -> Option<Transform> {
        self.scene.object(object).map(|o| o.transform)
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.scene.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn surface_size(&self) -> SurfaceSize {
        self.surface_size
    }

    pub fn is_spinning(&self) -> bool {
        self.scene.spin
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    pub fn frame_rate(&self) -> Option<f32> {
        self.scene.clock.frame_rate()
    }

    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    pub fn controls_mut(&mut self) -> Option<&mut OrbitControls> {
        self.controls.as_mut()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

fn build_scene(viewport: &Viewport, options: &RuntimeOptions) -> (SceneState, ObjectId) {
    let showcase = options.preset == ScenePreset::Showcase;
    let eye = if showcase {
        Vec3::new(0.0, 5.0, 10.0)
    } else {
        Vec3::new(0.0, 0.0, 5.0)
    };
    let camera = PerspectiveCamera::new(eye, Vec3::ZERO, viewport.aspect());
    let mut scene = SceneState::new(camera, FrameClock::new(options.max_frame_delta));

    scene.background = options.background.unwrap_or_else(|| options.preset.background());
    scene.lights.directional.cast_shadow = options.enable_shadows;
    if options.point_light || showcase {
        scene.lights.point = Some(Lights::warm_point_light());
    }

    let shadows = options.enable_shadows;
    let descriptor = |kind: PrimitiveKind, color: Color| {
        let mut d = ObjectDescriptor::primitive(kind, color).with_shadows(shadows, shadows);
        if options.unlit {
            d.material = Material::unlit(color);
        }
        d
    };

    let primary = if showcase {
        let layout = [
            (PrimitiveKind::Box, Color(0x00ff88), Vec3::new(-2.0, 0.0, 0.0), 1.0),
            (PrimitiveKind::Sphere, Color(0xff0066), Vec3::new(2.0, 0.0, 0.0), 2.0),
            (PrimitiveKind::Torus, Color(0x0066ff), Vec3::ZERO, 3.0),
        ];
        let [first, _, _] = layout.map(|(kind, color, at, rate_scale)| {
            let id = scene.add_object(descriptor(kind, color), Transform::from_position(at));
            if let Some(obj) = scene.object_mut(id) {
                obj.spin_rate = options.spin_rate * rate_scale;
            }
            id
        });
        first
    } else {
        let id = scene.add_object(
            descriptor(options.primitive_kind, options.color),
            Transform::IDENTITY,
        );
        if let Some(obj) = scene.object_mut(id) {
            obj.spin_rate = options.spin_rate;
        }
        id
    };

    if options.ground || showcase {
        scene.add_ground();
    }

    (scene, primary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::HeadlessSurface;

    fn runtime(options: RuntimeOptions) -> SceneRuntime<HeadlessSurface> {
        SceneRuntime::initialize(Viewport::new(800, 600), options, HeadlessSurface::new()).unwrap()
    }

    #[test]
    fn showcase_builds_three_primitives_and_ground() {
        let rt = runtime(RuntimeOptions {
            preset: ScenePreset::Showcase,
            ..RuntimeOptions::default()
        });
        let objects = rt.scene().objects();
        assert_eq!(objects.len(), 4);
        assert_eq!(objects[2].spin_rate, RuntimeOptions::default().spin_rate * 3.0);
        assert!(!objects[3].spins());
        assert_eq!(rt.primary_object(), objects[0].id());
        assert!(rt.scene().lights.point.is_some());
    }

    #[test]
    fn shadows_flag_reaches_lights_and_objects() {
        let rt = runtime(RuntimeOptions {
            enable_shadows: false,
            ..RuntimeOptions::default()
        });
        assert!(!rt.scene().lights.directional.cast_shadow);
        let primary = rt.scene().object(rt.primary_object()).unwrap();
        assert!(!primary.descriptor().cast_shadow);
    }

    #[test]
    fn reduced_motion_at_startup_keeps_spin_off() {
        let rt = runtime(RuntimeOptions {
            reduced_motion: true,
            ..RuntimeOptions::default()
        });
        assert!(!rt.is_spinning());
        assert!(rt.reduced_motion());
    }

    #[test]
    fn invalid_options_are_rejected_before_attach() {
        let surface = HeadlessSurface::new();
        let log = surface.log();
        let err = SceneRuntime::initialize(
            Viewport::new(800, 600),
            RuntimeOptions {
                max_frame_delta: Duration::ZERO,
                ..RuntimeOptions::default()
            },
            surface,
        )
        .err()
        .unwrap();
        assert!(matches!(err, ConfigurationError::InvalidOption { name: "max_frame_delta", .. }));
        assert_eq!(log.borrow().attaches, 0);
    }

    #[test]
    fn controls_are_optional() {
        let mut rt = runtime(RuntimeOptions {
            enable_controls: false,
            ..RuntimeOptions::default()
        });
        assert!(rt.controls_mut().is_none());
    }
}
