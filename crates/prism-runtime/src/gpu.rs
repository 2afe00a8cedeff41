use std::sync::Arc;

use prism_3d::{DEPTH_FORMAT, MSAA_SAMPLES, Renderer3D};
use prism_scene::SceneState;
use wgpu::{
    Adapter, CommandBuffer, CommandEncoder, CommandEncoderDescriptor, Device, ExperimentalFeatures, Features,
    Instance, Limits, MemoryHints, PowerPreference, Queue, RequestAdapterOptions, Surface,
    SurfaceConfiguration, SurfaceError, TextureFormat, TextureView, TextureViewDescriptor,
};
use winit::window::Window;

use crate::error::ConfigurationError;
use crate::surface::RenderSurface;
use crate::viewport::SurfaceSize;

pub type RcWindow = Arc<Window>;

/// Extra drawing recorded after the scene pass, on the same frame.
pub trait Overlay {
    /// Returned command buffers are submitted ahead of the frame encoder.
    fn paint(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        target: &TextureView,
        size: SurfaceSize,
    ) -> Vec<CommandBuffer>;
}

impl Overlay for () {
    fn paint(
        &mut self,
        _: &Device,
        _: &Queue,
        _: &mut CommandEncoder,
        _: &TextureView,
        _: SurfaceSize,
    ) -> Vec<CommandBuffer> {
        Vec::new()
    }
}

/// Swapchain-backed surface for a winit window.
pub struct GpuSurface<O: Overlay = ()> {
    window: RcWindow,
    #[allow(dead_code)]
    instance: Instance,
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    adapter: Adapter,
    device: Device,
    queue: Queue,
    renderer: Option<Renderer3D>,
    sample_count: u32,
    overlay: O,
}

impl<O: Overlay> GpuSurface<O> {
    /// Acquires adapter, device and swapchain for `window`.
    ///
    /// `make_overlay` runs once the device exists so overlays can build
    /// their own pipelines against the chosen surface format.
    pub async fn new<F>(window: RcWindow, make_overlay: F) -> Result<Self, ConfigurationError>
    where
        F: FnOnce(&Device, TextureFormat) -> O,
    {
        let instance = Instance::default();
        let surface = instance
            .create_surface(Arc::clone(&window))
            .map_err(|e| ConfigurationError::MissingSurface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
            .map_err(|e| ConfigurationError::Backend(format!("no adapter: {e}")))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("prism device"),
                required_features: Features::empty(),
                required_limits: Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits()),
                memory_hints: MemoryHints::Performance,
                trace: Default::default(),
                experimental_features: ExperimentalFeatures::disabled(),
            })
            .await
            .map_err(|e| ConfigurationError::Backend(format!("no device: {e}")))?;

        let size = window.inner_size();
        let mut surface_config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .ok_or_else(|| ConfigurationError::MissingSurface("surface not supported by adapter".into()))?;
        if let Some(format) = choose_srgb_format(&surface.get_capabilities(&adapter).formats) {
            surface_config.format = format;
        }

        let overlay = make_overlay(&device, surface_config.format);
        log::info!(
            "gpu surface ready: {:?} on {}",
            surface_config.format,
            adapter.get_info().name
        );

        Ok(Self {
            window,
            instance,
            surface,
            surface_config,
            adapter,
            device,
            queue,
            renderer: None,
            sample_count: 1,
            overlay,
        })
    }

    /// Multisampled scene pass, if the adapter supports it for both the
    /// swapchain and depth formats. Takes effect at attach.
    pub fn with_antialias(mut self, antialias: bool) -> Self {
        let supported = [self.surface_config.format, DEPTH_FORMAT].iter().all(|&format| {
            self.adapter
                .get_texture_format_features(format)
                .flags
                .sample_count_supported(MSAA_SAMPLES)
        });
        self.sample_count = if antialias && supported { MSAA_SAMPLES } else { 1 };
        if antialias && !supported {
            log::warn!("{MSAA_SAMPLES}x multisampling unsupported, rendering without antialiasing");
        }
        self
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn surface_config(&self) -> &SurfaceConfiguration {
        &self.surface_config
    }

    pub fn overlay_mut(&mut self) -> &mut O {
        &mut self.overlay
    }

    fn configure(&mut self, size: SurfaceSize) {
        self.surface_config.width = size.width.max(1);
        self.surface_config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.surface_config);
    }

    pub fn current_size(&self) -> SurfaceSize {
        SurfaceSize {
            width: self.surface_config.width,
            height: self.surface_config.height,
        }
    }
}

impl<O: Overlay> RenderSurface for GpuSurface<O> {
    fn attach(&mut self, size: SurfaceSize, scene: &SceneState) -> Result<(), ConfigurationError> {
        if self.renderer.is_some() {
            return Err(ConfigurationError::MissingSurface("surface already attached".into()));
        }
        self.configure(size);
        self.renderer = Some(Renderer3D::new(
            &self.device,
            self.surface_config.format,
            self.surface_config.width,
            self.surface_config.height,
            scene,
            scene.lights.directional.cast_shadow,
            self.sample_count,
        ));
        Ok(())
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.configure(size);
        if let Some(renderer) = &mut self.renderer {
            renderer.resize(&self.device, self.surface_config.width, self.surface_config.height);
        }
    }

    fn render(&mut self, scene: &SceneState) {
        let Some(renderer) = &mut self.renderer else {
            return;
        };

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                log::debug!("surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                return;
            }
            Err(SurfaceError::OutOfMemory) => {
                log::error!("surface out of memory, skipping frame");
                return;
            }
            Err(e) => {
                log::warn!("skipping frame: {e}");
                return;
            }
        };

        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("prism frame encoder"),
            });

        renderer.prepare(&self.device, &self.queue, scene);
        renderer.render(&mut encoder, &view, scene);

        let size = self.current_size();
        let extra = self
            .overlay
            .paint(&self.device, &self.queue, &mut encoder, &view, size);

        self.queue
            .submit(extra.into_iter().chain(Some(encoder.finish())));
        self.window.pre_present_notify();
        frame.present();
    }
}

fn choose_srgb_format(formats: &[TextureFormat]) -> Option<TextureFormat> {
    [TextureFormat::Bgra8UnormSrgb, TextureFormat::Rgba8UnormSrgb]
        .into_iter()
        .find(|f| formats.contains(f))
        .or_else(|| formats.iter().copied().find(|f| f.is_srgb()))
}
