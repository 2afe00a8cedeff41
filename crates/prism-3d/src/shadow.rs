use glam::{Mat4, Vec3};
use prism_scene::DirectionalLight;
use wgpu::util::DeviceExt;
use wgpu::{BindGroup, BindGroupLayout, Buffer, Device, Queue, Sampler, Texture, TextureView};

use crate::depth::DEPTH_FORMAT;

const SHADOW_EXTENT: f32 = 10.0;
const SHADOW_NEAR: f32 = 0.5;
const SHADOW_FAR: f32 = 50.0;

/// Depth map rendered from the directional light.
///
/// When shadows are off the map is a single texel and the pass is skipped,
/// so the scene bind group layout stays the same either way.
pub struct ShadowMap {
    pub enabled: bool,
    pub size: u32,
    pub texture: Texture,
    pub view: TextureView,
    pub sampler: Sampler,
    pub light_buf: Buffer,
    pub light_bg: BindGroup,
}

impl ShadowMap {
    pub fn new(device: &Device, light_bgl: &BindGroupLayout, enabled: bool, size: u32) -> Self {
        let size = if enabled { size.max(1) } else { 1 };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("shadow_map"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let light_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("shadow_light_ubo"),
            contents: bytemuck::bytes_of(&Mat4::IDENTITY.to_cols_array_2d()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let light_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow_light_bg"),
            layout: light_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: light_buf.as_entire_binding(),
            }],
        });

        Self {
            enabled,
            size,
            texture,
            view,
            sampler,
            light_buf,
            light_bg,
        }
    }

    pub fn write(&self, queue: &Queue, light_view_proj: Mat4) {
        queue.write_buffer(
            &self.light_buf,
            0,
            bytemuck::bytes_of(&light_view_proj.to_cols_array_2d()),
        );
    }
}

/// Orthographic view of the origin from the light's position.
pub fn light_view_proj(light: &DirectionalLight) -> Mat4 {
    let eye = light.position;
    let up = if eye.normalize_or_zero().abs_diff_eq(Vec3::Y, 1e-3) {
        Vec3::Z
    } else {
        Vec3::Y
    };
    let view = Mat4::look_at_rh(eye, Vec3::ZERO, up);
    let proj = Mat4::orthographic_rh(
        -SHADOW_EXTENT,
        SHADOW_EXTENT,
        -SHADOW_EXTENT,
        SHADOW_EXTENT,
        SHADOW_NEAR,
        SHADOW_FAR,
    );
    proj * view
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_scene::Lights;

    #[test]
    fn origin_lands_inside_light_frustum() {
        let m = light_view_proj(&Lights::default().directional);
        let p = m * Vec3::ZERO.extend(1.0);
        assert!(p.x.abs() < 1e-4 && p.y.abs() < 1e-4);
        assert!(p.z > 0.0 && p.z < 1.0);
    }

    #[test]
    fn overhead_light_gets_a_valid_up_vector() {
        let mut light = Lights::default().directional;
        light.position = Vec3::new(0.0, 20.0, 0.0);
        let m = light_view_proj(&light);
        assert!(m.is_finite());
    }
}
