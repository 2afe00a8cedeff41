mod orbit;

pub use orbit::OrbitControls;

use glam::{Mat4, Vec3};
use wgpu::{Buffer, Queue};

pub const DEFAULT_FOV_Y_DEG: f32 = 75.0;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 1000.0;

/// Right-handed perspective camera looking at `target`.
///
/// `aspect` is owned by the camera but driven from outside: whoever owns the
/// viewport calls [`PerspectiveCamera::set_viewport`] on every size change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    pub fn new(position: Vec3, target: Vec3, aspect: f32) -> Self {
        Self {
            position,
            target,
            up: Vec3::Y,
            fov_y_deg: DEFAULT_FOV_Y_DEG,
            aspect,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        }
    }

    /// Recomputes the aspect ratio from a viewport size.
    ///
    /// Zero-sized viewports are ignored and the previous aspect is kept.
    pub fn set_viewport(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.aspect = width as f32 / height as f32;
        true
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 1.0)
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 4],
}

impl CameraUniform {
    pub fn from_camera(camera: &PerspectiveCamera) -> Self {
        Self {
            view_proj: camera.view_proj().to_cols_array_2d(),
            position: camera.position.extend(1.0).to_array(),
        }
    }
}

pub fn update_camera_buffer(queue: &Queue, camera_buf: &Buffer, camera: &PerspectiveCamera) {
    let uniform = CameraUniform::from_camera(camera);
    queue.write_buffer(camera_buf, 0, bytemuck::bytes_of(&uniform));
}
