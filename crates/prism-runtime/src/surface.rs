use std::cell::RefCell;
use std::rc::Rc;

use prism_scene::{SceneState, Transform};

use crate::error::ConfigurationError;
use crate::viewport::SurfaceSize;

/// A drawable target owned by the runtime.
pub trait RenderSurface {
    /// Called exactly once, from `SceneRuntime::initialize`.
    fn attach(&mut self, size: SurfaceSize, scene: &SceneState) -> Result<(), ConfigurationError>;

    /// Reallocates backing buffers. Only called when the size actually changes.
    fn resize(&mut self, size: SurfaceSize);

    fn render(&mut self, scene: &SceneState);
}

/// What a [`HeadlessSurface`] has been asked to do.
#[derive(Debug, Default)]
pub struct SurfaceLog {
    pub attaches: u32,
    pub reallocations: u32,
    pub frames: u64,
    pub size: Option<SurfaceSize>,
    /// Object poses as of the last rendered frame.
    pub last_frame: Vec<Transform>,
}

/// GPU-free surface that records calls instead of drawing.
///
/// The log is shared so it stays readable after the surface has been moved
/// into (or dropped by) the runtime.
#[derive(Debug)]
pub struct HeadlessSurface {
    log: Rc<RefCell<SurfaceLog>>,
    available: bool,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self {
            log: Rc::default(),
            available: true,
        }
    }

    /// A surface whose host has no drawable target to offer.
    pub fn unavailable() -> Self {
        Self {
            log: Rc::default(),
            available: false,
        }
    }

    pub fn log(&self) -> Rc<RefCell<SurfaceLog>> {
        Rc::clone(&self.log)
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSurface for HeadlessSurface {
    fn attach(&mut self, size: SurfaceSize, _scene: &SceneState) -> Result<(), ConfigurationError> {
        if !self.available {
            return Err(ConfigurationError::MissingSurface(
                "headless host has no target".into(),
            ));
        }
        let mut log = self.log.borrow_mut();
        log.attaches += 1;
        log.size = Some(size);
        Ok(())
    }

    fn resize(&mut self, size: SurfaceSize) {
        let mut log = self.log.borrow_mut();
        log.reallocations += 1;
        log.size = Some(size);
    }

    fn render(&mut self, scene: &SceneState) {
        let mut log = self.log.borrow_mut();
        log.frames += 1;
        log.last_frame.clear();
        log.last_frame
            .extend(scene.objects().iter().map(|o| o.transform));
    }
}
