use std::time::Duration;

use glam::Vec3;
use prism_runtime::{
    ConfigurationError, HeadlessSurface, PatchTarget, ReducedMotionPolicy, RuntimeOptions,
    SceneRuntime, ScenePreset, Viewport,
};
use prism_scene::{Color, ObjectDescriptor, PrimitiveKind, Transform, TransformPatch};
use winit::dpi::PhysicalSize;

const EPS: f32 = 1e-5;

fn create_test_runtime(options: RuntimeOptions) -> SceneRuntime<HeadlessSurface> {
    SceneRuntime::initialize(Viewport::new(800, 600), options, HeadlessSurface::new()).unwrap()
}

fn green_box() -> RuntimeOptions {
    RuntimeOptions {
        primitive_kind: PrimitiveKind::Box,
        color: Color(0x00ff00),
        enable_spin: true,
        ..RuntimeOptions::default()
    }
}

fn ms(v: f64) -> Duration {
    Duration::from_secs_f64(v / 1000.0)
}

#[test]
fn test_aspect_tracks_every_resize() {
    let mut rt = create_test_runtime(green_box());
    for (w, h) in [(1, 1), (1920, 1080), (333, 777), (4096, 17), (800, 600)] {
        rt.on_viewport_resize(Viewport::new(w, h));
        assert_eq!(rt.camera().aspect, w as f32 / h as f32, "{w}x{h}");
    }
}

#[test]
fn test_initialize_rejects_empty_viewport() {
    for (w, h) in [(0, 600), (800, 0), (0, 0)] {
        let surface = HeadlessSurface::new();
        let log = surface.log();
        let result = SceneRuntime::initialize(Viewport::new(w, h), green_box(), surface);
        assert!(matches!(
            result,
            Err(ConfigurationError::ZeroViewport { width, height }) if width == w && height == h
        ));
        let log = log.borrow();
        assert_eq!(log.attaches, 0);
        assert_eq!(log.frames, 0);
        assert!(log.size.is_none());
    }
}

#[test]
fn test_initialize_fails_without_surface() {
    let result =
        SceneRuntime::initialize(Viewport::new(800, 600), green_box(), HeadlessSurface::unavailable());
    assert!(matches!(result, Err(ConfigurationError::MissingSurface(_))));
}

#[test]
fn test_surface_attached_once_at_initialize() {
    let surface = HeadlessSurface::new();
    let log = surface.log();
    let mut rt = SceneRuntime::initialize(Viewport::new(800, 600), green_box(), surface).unwrap();
    rt.tick(Duration::ZERO);
    rt.tick(ms(16.0));
    let log = log.borrow();
    assert_eq!(log.attaches, 1);
    assert_eq!(log.frames, 2);
}

#[test]
fn test_apply_transform_only_touches_patched_fields() {
    let mut rt = create_test_runtime(green_box());
    let id = rt.primary_object();
    rt.apply_transform(
        id,
        &TransformPatch {
            x: Some(0.25),
            y: Some(-1.5),
            z: Some(3.0),
            rx: Some(0.1),
            ry: Some(0.2),
            rz: Some(0.3),
            scale: Some(2.0),
        },
    );
    let before = rt.transform(id).unwrap();

    assert!(rt.apply_transform(id, &TransformPatch::default().with_y(9.0)));
    let after = rt.transform(id).unwrap();
    assert_eq!(after.position.y, 9.0);
    assert_eq!(after.position.x.to_bits(), before.position.x.to_bits());
    assert_eq!(after.position.z.to_bits(), before.position.z.to_bits());
    assert_eq!(after.rotation, before.rotation);
    assert_eq!(after.scale, before.scale);

    assert!(rt.apply_transform(id, &TransformPatch::default()));
    assert_eq!(rt.transform(id).unwrap(), after);
}

#[test]
fn test_apply_transform_is_idempotent() {
    let mut rt = create_test_runtime(green_box());
    let id = rt.primary_object();
    let patch = TransformPatch::position(1.0, 2.0, 3.0).with_scale(0.5);
    rt.apply_transform(id, &patch);
    let once = rt.transform(id).unwrap();
    rt.apply_transform(id, &patch);
    assert_eq!(rt.transform(id).unwrap(), once);
}

#[test]
fn test_resize_to_same_size_is_a_noop() {
    let surface = HeadlessSurface::new();
    let log = surface.log();
    let mut rt = SceneRuntime::initialize(Viewport::new(800, 600), green_box(), surface).unwrap();

    rt.on_viewport_resize(Viewport::new(800, 600));
    assert_eq!(log.borrow().reallocations, 0);

    rt.on_viewport_resize(Viewport::new(1024, 768));
    rt.on_viewport_resize(Viewport::new(1024, 768));
    assert_eq!(log.borrow().reallocations, 1);
}

#[test]
fn test_resize_respects_pixel_ratio_cap() {
    let surface = HeadlessSurface::new();
    let log = surface.log();
    let mut rt = SceneRuntime::initialize(Viewport::new(800, 600), green_box(), surface).unwrap();

    rt.on_viewport_resize(Viewport::new(800, 600).with_pixel_ratio(2.0));
    rt.on_viewport_resize(Viewport::new(800, 600).with_pixel_ratio(3.0));
    let size = rt.surface_size();
    assert_eq!((size.width, size.height), (1600, 1200));
    assert_eq!(log.borrow().reallocations, 1);
}

#[test]
fn test_fractional_scale_window_fills_surface_exactly() {
    let mut rt = create_test_runtime(green_box());
    rt.on_viewport_resize(Viewport::from_physical(PhysicalSize::new(1003, 701), 1.5));

    let size = rt.surface_size();
    assert_eq!((size.width, size.height), (1003, 701));
    assert_eq!(rt.camera().aspect, 1003.0 / 701.0);
}

#[test]
fn test_background_follows_preset_unless_configured() {
    let single = create_test_runtime(green_box());
    assert_eq!(single.scene().background, prism_scene::DEFAULT_BACKGROUND);

    let showcase = create_test_runtime(RuntimeOptions {
        preset: ScenePreset::Showcase,
        ..RuntimeOptions::default()
    });
    assert_eq!(showcase.scene().background, Color(0x000011));

    let custom = create_test_runtime(RuntimeOptions {
        preset: ScenePreset::Showcase,
        background: Some(Color::BLACK),
        ..RuntimeOptions::default()
    });
    assert_eq!(custom.scene().background, Color::BLACK);
}

#[test]
fn test_empty_resize_keeps_last_aspect() {
    let mut rt = create_test_runtime(green_box());
    rt.on_viewport_resize(Viewport::new(0, 0));
    assert_eq!(rt.camera().aspect, 800.0 / 600.0);
    assert_eq!(rt.viewport(), Viewport::new(800, 600));
}

#[test]
fn test_spin_advances_by_rate_times_delta() {
    let rate = Vec3::new(0.7, -1.25, 0.5);
    let mut rt = create_test_runtime(RuntimeOptions {
        spin_rate: rate,
        max_frame_delta: Duration::from_secs(2),
        ..green_box()
    });
    let id = rt.primary_object();

    rt.tick(Duration::ZERO);
    rt.tick(Duration::from_secs(1));
    assert_eq!(rt.transform(id).unwrap().rotation, rate);
}

#[test]
fn test_static_object_ignores_delta() {
    let mut rt = create_test_runtime(RuntimeOptions {
        enable_spin: false,
        ..green_box()
    });
    let id = rt.primary_object();
    rt.tick(Duration::ZERO);
    rt.tick(Duration::from_millis(50));
    rt.tick(Duration::from_secs(30));
    assert_eq!(rt.transform(id).unwrap().rotation, Vec3::ZERO);
}

#[test]
fn test_toggle_spin_affects_following_ticks() {
    let mut rt = create_test_runtime(green_box());
    let id = rt.primary_object();
    rt.tick(Duration::ZERO);
    assert!(!rt.toggle_spin());
    rt.tick(ms(50.0));
    assert_eq!(rt.transform(id).unwrap().rotation, Vec3::ZERO);

    assert!(rt.toggle_spin());
    rt.tick(ms(100.0));
    assert!(rt.transform(id).unwrap().rotation.x > 0.0);
}

#[test]
fn test_reduced_motion_stops_spin_and_allows_override_by_default() {
    let mut rt = create_test_runtime(green_box());
    assert!(rt.is_spinning());
    rt.set_reduced_motion(true);
    assert!(!rt.is_spinning());

    let id = rt.primary_object();
    rt.tick(Duration::ZERO);
    rt.tick(ms(50.0));
    assert_eq!(rt.transform(id).unwrap().rotation, Vec3::ZERO);

    assert!(rt.toggle_spin());
    assert!(rt.is_spinning());
}

#[test]
fn test_reduced_motion_locked_policy_ignores_toggle() {
    let mut rt = create_test_runtime(RuntimeOptions {
        reduced_motion_policy: ReducedMotionPolicy::Locked,
        ..green_box()
    });
    rt.set_reduced_motion(true);
    assert!(!rt.toggle_spin());
    assert!(!rt.toggle_spin());
    assert!(!rt.is_spinning());

    rt.set_reduced_motion(false);
    assert!(!rt.is_spinning());
    assert!(rt.toggle_spin());
}

#[test]
fn test_first_two_frames_of_green_box() {
    let mut rt = create_test_runtime(green_box());
    let rate = rt.options().spin_rate;
    let id = rt.primary_object();

    rt.tick(Duration::ZERO);
    let frame = rt.tick(ms(16.67));
    assert!((frame.dt - 0.01667).abs() < EPS);

    let rot = rt.transform(id).unwrap().rotation;
    assert!((rot.x - rate.x * 0.01667).abs() < EPS, "rx {}", rot.x);
    assert!((rot.y - rate.y * 0.01667).abs() < EPS, "ry {}", rot.y);
}

#[test]
fn test_long_pause_is_clamped() {
    let mut rt = create_test_runtime(green_box());
    let rate = rt.options().spin_rate;
    let cap = rt.options().max_frame_delta.as_secs_f32();
    let id = rt.primary_object();

    rt.tick(Duration::ZERO);
    rt.tick(Duration::from_secs(5));
    let rot = rt.transform(id).unwrap().rotation;
    assert!(rot.x <= rate.x * cap + EPS);
    assert!((rot.x - rate.x * cap).abs() < EPS);
}

#[test]
fn test_spin_resumes_from_external_pose() {
    let mut rt = create_test_runtime(green_box());
    let rate = rt.options().spin_rate;
    let id = rt.primary_object();

    rt.tick(Duration::ZERO);
    rt.tick(ms(50.0));
    rt.apply_transform(id, &TransformPatch::default().with_rx(2.0));
    assert!(rt.is_spinning());
    rt.tick(ms(100.0));

    let rx = rt.transform(id).unwrap().rotation.x;
    assert!((rx - (2.0 + rate.x * 0.05)).abs() < EPS, "rx {rx}");
}

#[test]
fn test_queued_patches_apply_at_next_tick() {
    let surface = HeadlessSurface::new();
    let log = surface.log();
    let mut rt = SceneRuntime::initialize(
        Viewport::new(800, 600),
        RuntimeOptions {
            enable_spin: false,
            ..green_box()
        },
        surface,
    )
    .unwrap();
    let id = rt.primary_object();
    let sender = rt.patch_sender();

    std::thread::spawn(move || {
        sender.send(TransformPatch::default().with_x(1.0));
        sender.send(TransformPatch::default().with_x(2.0).with_z(-4.0));
    })
    .join()
    .unwrap();

    assert_eq!(rt.transform(id).unwrap().position, Vec3::ZERO);
    rt.tick(Duration::ZERO);
    assert_eq!(rt.transform(id).unwrap().position, Vec3::new(2.0, 0.0, -4.0));
    assert_eq!(log.borrow().last_frame[0].position, Vec3::new(2.0, 0.0, -4.0));
}

#[test]
fn test_queued_patch_for_added_object() {
    let mut rt = create_test_runtime(green_box());
    let extra = rt.add_object(
        ObjectDescriptor::primitive(PrimitiveKind::Torus, Color(0x0066ff)),
        Transform::IDENTITY,
        Vec3::ZERO,
    );
    rt.patch_sender()
        .send_to(PatchTarget::Object(extra), TransformPatch::position(0.0, 1.0, 0.0));
    rt.tick(Duration::ZERO);
    assert_eq!(rt.transform(extra).unwrap().position, Vec3::Y);
    assert_eq!(rt.scene().objects().len(), 2);
}

#[test]
fn test_frame_rate_sampled_over_half_second() {
    let mut rt = create_test_runtime(green_box());
    assert_eq!(rt.frame_rate(), None);
    let mut now = Duration::ZERO;
    rt.tick(now);
    for _ in 0..40 {
        now += ms(1000.0 / 60.0);
        rt.tick(now);
    }
    let fps = rt.frame_rate().unwrap();
    assert!((fps - 60.0).abs() < 0.5, "fps {fps}");
}
