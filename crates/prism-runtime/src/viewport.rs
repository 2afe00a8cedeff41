use winit::dpi::PhysicalSize;

pub const DEFAULT_MAX_PIXEL_RATIO: f64 = 2.0;

/// Host viewport in device-independent units.
///
/// A viewport built from a window also keeps the window's physical size, so
/// the surface matches the window exactly at fractional scale factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f64,
    physical: Option<SurfaceSize>,
}

/// Output surface size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixel_ratio: 1.0,
            physical: None,
        }
    }

    pub fn with_pixel_ratio(mut self, pixel_ratio: f64) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    /// Logical size for layout, physical size kept for the surface.
    pub fn from_physical(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        let scale_factor = clamp_pixel_ratio(scale_factor, f64::MAX);
        let logical = size.to_logical::<f64>(scale_factor);
        Self {
            width: logical.width.round() as u32,
            height: logical.height.round() as u32,
            pixel_ratio: scale_factor,
            physical: Some(SurfaceSize {
                width: size.width,
                height: size.height,
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self.physical {
            Some(size) => size.width == 0 || size.height == 0,
            None => self.width == 0 || self.height == 0,
        }
    }

    /// The dimensions the camera aspect is taken from.
    pub fn framing(&self) -> (u32, u32) {
        match self.physical {
            Some(size) => (size.width, size.height),
            None => (self.width, self.height),
        }
    }

    pub fn aspect(&self) -> f32 {
        let (width, height) = self.framing();
        width as f32 / height as f32
    }

    pub fn surface_size(&self, max_pixel_ratio: f64) -> SurfaceSize {
        let ratio = clamp_pixel_ratio(self.pixel_ratio, max_pixel_ratio);
        let (width, height) = match self.physical {
            Some(size) if ratio == self.pixel_ratio => return size,
            Some(size) => {
                let shrink = ratio / self.pixel_ratio;
                (size.width as f64 * shrink, size.height as f64 * shrink)
            }
            None => (self.width as f64 * ratio, self.height as f64 * ratio),
        };
        SurfaceSize {
            width: (width.round() as u32).max(1),
            height: (height.round() as u32).max(1),
        }
    }
}

pub fn clamp_pixel_ratio(ratio: f64, max: f64) -> f64 {
    if !ratio.is_finite() || ratio <= 0.0 {
        return 1.0;
    }
    ratio.min(max)
}
