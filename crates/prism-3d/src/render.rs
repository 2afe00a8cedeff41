use std::collections::HashMap;

use prism_camera::{CameraUniform, update_camera_buffer};
use prism_scene::{ObjectId, SceneState};
use wgpu::util::DeviceExt;
use wgpu::*;

use crate::depth::{create_depth, create_msaa_target};
use crate::model::{GpuObject, LightsUniform};
use crate::pipeline::{Layouts, create_bind_group_layouts, create_pipeline, create_shadow_pipeline};
use crate::shadow::{ShadowMap, light_view_proj};

pub struct Renderer3D {
    pub render_pipeline: RenderPipeline,
    pub shadow_pipeline: RenderPipeline,
    pub depth_view: TextureView,
    pub depth_tex: Texture,
    /// Present when rendering with more than one sample per pixel.
    pub msaa: Option<(TextureView, Texture)>,
    surface_format: TextureFormat,
    sample_count: u32,
    pub camera_buf: Buffer,
    pub lights_buf: Buffer,
    pub scene_bg: BindGroup,
    pub shadow: ShadowMap,
    layouts: Layouts,
    objects: HashMap<ObjectId, GpuObject>,
}

impl Renderer3D {
    pub fn new(
        device: &Device,
        surface_format: TextureFormat,
        width: u32,
        height: u32,
        scene: &SceneState,
        shadows: bool,
        sample_count: u32,
    ) -> Self {
        let sample_count = sample_count.max(1);
        let layouts = create_bind_group_layouts(device);
        let (depth_view, depth_tex) = create_depth(device, width, height, sample_count);
        let msaa = (sample_count > 1)
            .then(|| create_msaa_target(device, surface_format, width, height, sample_count));

        let render_pipeline = create_pipeline(device, surface_format, &layouts, sample_count);
        let shadow_pipeline = create_shadow_pipeline(device, &layouts);

        let shadow = ShadowMap::new(
            device,
            &layouts.shadow_bgl,
            shadows,
            scene.lights.directional.shadow_map_size,
        );

        let camera_buf = device.create_buffer_init(&util::BufferInitDescriptor {
            label: Some("camera_ubo"),
            contents: bytemuck::bytes_of(&CameraUniform::from_camera(&scene.camera)),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let lights_buf = device.create_buffer_init(&util::BufferInitDescriptor {
            label: Some("lights_ubo"),
            contents: bytemuck::bytes_of(&LightsUniform::new(
                &scene.lights,
                light_view_proj(&scene.lights.directional),
                shadow.enabled,
            )),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });

        let scene_bg = device.create_bind_group(&BindGroupDescriptor {
            label: Some("scene_bg"),
            layout: &layouts.scene_bgl,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: camera_buf.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: lights_buf.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 2,
                    resource: BindingResource::TextureView(&shadow.view),
                },
                BindGroupEntry {
                    binding: 3,
                    resource: BindingResource::Sampler(&shadow.sampler),
                },
            ],
        });

        let mut renderer = Self {
            render_pipeline,
            shadow_pipeline,
            depth_view,
            depth_tex,
            msaa,
            surface_format,
            sample_count,
            camera_buf,
            lights_buf,
            scene_bg,
            shadow,
            layouts,
            objects: HashMap::new(),
        };
        renderer.sync_objects(device, scene);
        renderer
    }

    pub fn resize(&mut self, device: &Device, width: u32, height: u32) {
        let (dv, dt) = create_depth(device, width, height, self.sample_count);
        self.depth_view = dv;
        self.depth_tex = dt;
        if self.msaa.is_some() {
            self.msaa = Some(create_msaa_target(
                device,
                self.surface_format,
                width,
                height,
                self.sample_count,
            ));
        }
    }

    /// Uploads meshes for objects added since the last frame.
    fn sync_objects(&mut self, device: &Device, scene: &SceneState) {
        for object in scene.objects() {
            if !self.objects.contains_key(&object.id()) {
                log::debug!("uploading mesh for object {:?}", object.id());
                let gpu = GpuObject::new(device, &self.layouts.object_bgl, object);
                self.objects.insert(object.id(), gpu);
            }
        }
    }

    /// Writes this frame's camera, light and object uniforms.
    pub fn prepare(&mut self, device: &Device, queue: &Queue, scene: &SceneState) {
        self.sync_objects(device, scene);

        update_camera_buffer(queue, &self.camera_buf, &scene.camera);

        let light_vp = light_view_proj(&scene.lights.directional);
        let lights = LightsUniform::new(&scene.lights, light_vp, self.shadow.enabled);
        queue.write_buffer(&self.lights_buf, 0, bytemuck::bytes_of(&lights));
        if self.shadow.enabled {
            self.shadow.write(queue, light_vp);
        }

        for object in scene.objects() {
            if let Some(gpu) = self.objects.get(&object.id()) {
                gpu.write(queue, object);
            }
        }
    }

    pub fn render(&self, encoder: &mut CommandEncoder, target_view: &TextureView, scene: &SceneState) {
        if self.shadow.enabled {
            self.render_shadow_pass(encoder, scene);
        }

        let [r, g, b] = scene.background.to_linear();
        let (view, resolve_target) = match &self.msaa {
            Some((msaa_view, _)) => (msaa_view, Some(target_view)),
            None => (target_view, None),
        };
        let mut r_pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("scene_pass"),
            color_attachments: &[Some(RenderPassColorAttachment {
                view,
                depth_slice: None,
                resolve_target,
                ops: Operations {
                    load: LoadOp::Clear(Color {
                        r: r as f64,
                        g: g as f64,
                        b: b as f64,
                        a: 1.0,
                    }),
                    store: StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(Operations {
                    load: LoadOp::Clear(1.0),
                    store: StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        r_pass.set_pipeline(&self.render_pipeline);
        r_pass.set_bind_group(0, &self.scene_bg, &[]);

        for object in scene.objects() {
            let Some(gpu) = self.objects.get(&object.id()) else {
                continue;
            };
            r_pass.set_bind_group(1, &gpu.bind_group, &[]);
            r_pass.set_vertex_buffer(0, gpu.mesh.vbuf.slice(..));
            r_pass.set_index_buffer(gpu.mesh.ibuf.slice(..), IndexFormat::Uint32);
            r_pass.draw_indexed(0..gpu.mesh.index_count, 0, 0..1);
        }
    }

    fn render_shadow_pass(&self, encoder: &mut CommandEncoder, scene: &SceneState) {
        let mut s_pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("shadow_pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                view: &self.shadow.view,
                depth_ops: Some(Operations {
                    load: LoadOp::Clear(1.0),
                    store: StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        s_pass.set_pipeline(&self.shadow_pipeline);
        s_pass.set_bind_group(0, &self.shadow.light_bg, &[]);

        for object in scene.objects() {
            if !object.descriptor().cast_shadow {
                continue;
            }
            let Some(gpu) = self.objects.get(&object.id()) else {
                continue;
            };
            s_pass.set_bind_group(1, &gpu.bind_group, &[]);
            s_pass.set_vertex_buffer(0, gpu.mesh.vbuf.slice(..));
            s_pass.set_index_buffer(gpu.mesh.ibuf.slice(..), IndexFormat::Uint32);
            s_pass.draw_indexed(0..gpu.mesh.index_count, 0, 0..1);
        }
    }
}
