use glam::{Mat4, Vec3};
use prism_scene::{Lights, SceneObject, Shading};
use wgpu::util::DeviceExt;
use wgpu::{BindGroup, BindGroupLayout, Buffer, Device, Queue};

use crate::mesh::{MeshData, build_mesh};

pub struct GpuMesh {
    pub vbuf: Buffer,
    pub ibuf: Buffer,
    pub index_count: u32,
}

impl GpuMesh {
    pub fn upload(device: &Device, data: &MeshData, label: &str) -> Self {
        let vbuf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let ibuf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vbuf,
            ibuf,
            index_count: data.indices.len() as u32,
        }
    }
}

/// Per-object uniform: transform, normal matrix and material.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// x: shininess, y: lit, z: receives shadow.
    pub params: [f32; 4],
}

impl ObjectUniform {
    pub fn from_object(object: &SceneObject) -> Self {
        let model = object.transform.matrix();
        let desc = object.descriptor();
        let (lit, shininess) = match desc.material.shading {
            Shading::Unlit => (0.0, 1.0),
            Shading::Phong { shininess } => (1.0, shininess.max(1.0)),
        };
        let [r, g, b] = desc.material.color.to_linear();
        Self {
            model: model.to_cols_array_2d(),
            normal: model.inverse().transpose().to_cols_array_2d(),
            color: [r, g, b, 1.0],
            params: [shininess, lit, if desc.receive_shadow { 1.0 } else { 0.0 }, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsUniform {
    pub light_view_proj: [[f32; 4]; 4],
    /// Pre-multiplied by intensity.
    pub ambient: [f32; 4],
    /// Unit vector towards the light; w: shadows on.
    pub dir_direction: [f32; 4],
    pub dir_color: [f32; 4],
    /// w: range, zero for none.
    pub point_position: [f32; 4],
    /// w: 1 when the point light exists.
    pub point_color: [f32; 4],
}

impl LightsUniform {
    pub fn new(lights: &Lights, light_view_proj: Mat4, shadows: bool) -> Self {
        let scaled = |c: [f32; 3], k: f32, w: f32| [c[0] * k, c[1] * k, c[2] * k, w];

        let dir = &lights.directional;
        let towards = dir.position.try_normalize().unwrap_or(Vec3::Y);
        let (point_position, point_color) = match &lights.point {
            Some(p) => (
                p.position.extend(p.range).to_array(),
                scaled(p.color.to_linear(), p.intensity, 1.0),
            ),
            None => ([0.0; 4], [0.0; 4]),
        };

        Self {
            light_view_proj: light_view_proj.to_cols_array_2d(),
            ambient: scaled(lights.ambient.color.to_linear(), lights.ambient.intensity, 1.0),
            dir_direction: towards.extend(if shadows { 1.0 } else { 0.0 }).to_array(),
            dir_color: scaled(dir.color.to_linear(), dir.intensity, 1.0),
            point_position,
            point_color,
        }
    }
}

/// GPU resources backing one scene object.
pub struct GpuObject {
    pub mesh: GpuMesh,
    pub ubo: Buffer,
    pub bind_group: BindGroup,
}

impl GpuObject {
    pub fn new(device: &Device, object_bgl: &BindGroupLayout, object: &SceneObject) -> Self {
        let label = format!("object_{}", object.id().index());
        let mesh = GpuMesh::upload(device, &build_mesh(&object.descriptor().geometry), &label);
        let (ubo, bind_group) = create_object_ubo(device, object_bgl, &ObjectUniform::from_object(object));
        Self {
            mesh,
            ubo,
            bind_group,
        }
    }

    pub fn write(&self, queue: &Queue, object: &SceneObject) {
        queue.write_buffer(&self.ubo, 0, bytemuck::bytes_of(&ObjectUniform::from_object(object)));
    }
}

pub fn create_object_ubo(
    device: &Device,
    object_bgl: &BindGroupLayout,
    uniform: &ObjectUniform,
) -> (Buffer, BindGroup) {
    let buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("object_ubo"),
        contents: bytemuck::bytes_of(uniform),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("object_bg"),
        layout: object_bgl,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buf.as_entire_binding(),
        }],
    });
    (buf, bg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_camera::PerspectiveCamera;
    use prism_scene::{Color, FrameClock, ObjectDescriptor, PrimitiveKind, SceneState, Transform};

    #[test]
    fn uniforms_have_gpu_friendly_sizes() {
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 160);
        assert_eq!(std::mem::size_of::<LightsUniform>(), 144);
    }

    #[test]
    fn object_uniform_carries_material() {
        let mut scene = SceneState::new(PerspectiveCamera::default(), FrameClock::default());
        let id = scene.add_object(
            ObjectDescriptor::primitive(PrimitiveKind::Box, Color(0xffffff)).with_shadows(true, true),
            Transform::from_position(Vec3::new(1.0, 2.0, 3.0)),
        );
        let u = ObjectUniform::from_object(scene.object(id).unwrap());
        assert_eq!(u.color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(u.params[1], 1.0);
        assert_eq!(u.params[2], 1.0);
        assert_eq!(u.model[3], [1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn missing_point_light_is_flagged_off() {
        let u = LightsUniform::new(&Lights::default(), Mat4::IDENTITY, false);
        assert_eq!(u.point_color[3], 0.0);
        assert_eq!(u.dir_direction[3], 0.0);
        let len = Vec3::from_slice(&u.dir_direction[..3]).length();
        assert!((len - 1.0).abs() < 1e-6);
    }
}
