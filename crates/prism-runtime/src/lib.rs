//! Frame-driven scene runtime.
//!
//! [`SceneRuntime`] owns a [`prism_scene::SceneState`] and a [`RenderSurface`].
//! Hosts call [`SceneRuntime::tick`] once per display refresh, forward size
//! changes to [`SceneRuntime::on_viewport_resize`], and move objects through
//! [`SceneRuntime::apply_transform`] or a [`PatchSender`].

pub mod error;
pub mod gpu;
pub mod inbox;
pub mod options;
pub mod runtime;
pub mod surface;
pub mod viewport;

pub use error::ConfigurationError;
pub use gpu::{GpuSurface, Overlay, RcWindow};
pub use inbox::{PatchInbox, PatchSender, PatchTarget, QueuedPatch};
pub use options::{ReducedMotionPolicy, RuntimeOptions, SHOWCASE_BACKGROUND, ScenePreset};
pub use runtime::SceneRuntime;
pub use surface::{HeadlessSurface, RenderSurface, SurfaceLog};
pub use viewport::{DEFAULT_MAX_PIXEL_RATIO, SurfaceSize, Viewport, clamp_pixel_ratio};
