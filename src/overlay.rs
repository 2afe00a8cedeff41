use prism_runtime::{Overlay, SurfaceSize};
use wgpu::{CommandBuffer, CommandEncoder, Device, Queue, TextureFormat, TextureView};

/// Tessellated UI waiting to be painted over the next frame.
pub struct EguiFrame {
    pub paint_jobs: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub pixels_per_point: f32,
}

pub struct EguiOverlay {
    renderer: egui_wgpu::Renderer,
    frame: Option<EguiFrame>,
}

impl EguiOverlay {
    pub fn new(device: &Device, format: TextureFormat) -> Self {
        Self {
            renderer: egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default()),
            frame: None,
        }
    }

    /// Replaces the pending paint jobs. Texture updates of a frame that was
    /// never painted carry over, since egui sends each one only once.
    pub fn set_frame(&mut self, frame: EguiFrame) {
        self.frame = Some(merge_frames(self.frame.take(), frame));
    }
}

fn merge_frames(pending: Option<EguiFrame>, mut next: EguiFrame) -> EguiFrame {
    if let Some(mut pending) = pending {
        pending.textures_delta.append(next.textures_delta);
        next.textures_delta = pending.textures_delta;
    }
    next
}

impl Overlay for EguiOverlay {
    fn paint(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        target: &TextureView,
        size: SurfaceSize,
    ) -> Vec<CommandBuffer> {
        let Some(frame) = self.frame.take() else {
            return Vec::new();
        };

        for (id, image_delta) in &frame.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point: frame.pixels_per_point,
        };

        let callbacks = self.renderer.update_buffers(
            device,
            queue,
            encoder,
            &frame.paint_jobs,
            &screen_descriptor,
        );

        let rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("egui_overlay_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let mut rpass = rpass.forget_lifetime();
        self.renderer
            .render(&mut rpass, &frame.paint_jobs, &screen_descriptor);
        drop(rpass);

        for id in &frame.textures_delta.free {
            self.renderer.free_texture(id);
        }
        callbacks
    }
}
