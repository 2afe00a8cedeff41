use glam::Vec3;
use winit::event::{DeviceEvent, ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::PerspectiveCamera;

const MIN_POLAR: f32 = 1.0e-3;
const MIN_RADIUS: f32 = 0.5;
const MAX_RADIUS: f32 = 500.0;

/// Orbits the camera around its target with damped mouse input.
///
/// Input accumulates into a pending delta; [`OrbitControls::update`] applies a
/// share of it every frame and decays the rest by `damping_factor`.
pub struct OrbitControls {
    dragging: bool,
    delta_azimuth: f32,
    delta_polar: f32,
    zoom: f32,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
}

impl OrbitControls {
    pub fn new(damping_factor: f32) -> Self {
        Self {
            dragging: false,
            delta_azimuth: 0.0,
            delta_polar: 0.0,
            zoom: 0.0,
            damping_factor,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
        }
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = *state == ElementState::Pressed;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / 40.0) as f32,
                };
                self.zoom -= lines * self.zoom_speed;
            }
            _ => {}
        }
    }

    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        if !self.dragging {
            return;
        }
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.rotate(*dx as f32, *dy as f32);
        }
    }

    /// Queues a rotation expressed in pointer pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.delta_azimuth -= dx * self.rotate_speed;
        self.delta_polar -= dy * self.rotate_speed;
    }

    pub fn is_settled(&self) -> bool {
        self.delta_azimuth.abs() < 1.0e-5 && self.delta_polar.abs() < 1.0e-5 && self.zoom.abs() < 1.0e-5
    }

    pub fn update(&mut self, cam: &mut PerspectiveCamera) {
        if self.is_settled() {
            return;
        }

        let offset = cam.position - cam.target;
        let mut radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }

        let share = if self.damping_factor > 0.0 {
            self.damping_factor
        } else {
            1.0
        };

        let mut azimuth = offset.x.atan2(offset.z);
        let mut polar = (offset.y / radius).clamp(-1.0, 1.0).acos();

        azimuth += self.delta_azimuth * share;
        polar = (polar + self.delta_polar * share).clamp(MIN_POLAR, std::f32::consts::PI - MIN_POLAR);
        radius = (radius * (1.0 + self.zoom * share)).clamp(MIN_RADIUS, MAX_RADIUS);

        let sin_polar = polar.sin();
        cam.position = cam.target
            + Vec3::new(
                radius * sin_polar * azimuth.sin(),
                radius * polar.cos(),
                radius * sin_polar * azimuth.cos(),
            );

        let keep = 1.0 - share;
        self.delta_azimuth *= keep;
        self.delta_polar *= keep;
        self.zoom *= keep;
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(0.05)
    }
}
