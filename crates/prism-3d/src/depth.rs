use wgpu::{Device, Texture, TextureFormat, TextureView};

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Sample count used when antialiasing is on.
pub const MSAA_SAMPLES: u32 = 4;

pub fn create_depth(device: &Device, width: u32, height: u32, sample_count: u32) -> (TextureView, Texture) {
    create_attachment(device, "scene_depth", DEPTH_FORMAT, width, height, sample_count)
}

/// Multisampled color target resolved into the swapchain image.
pub fn create_msaa_target(
    device: &Device,
    format: TextureFormat,
    width: u32,
    height: u32,
    sample_count: u32,
) -> (TextureView, Texture) {
    create_attachment(device, "scene_msaa", format, width, height, sample_count)
}

fn create_attachment(
    device: &Device,
    label: &str,
    format: TextureFormat,
    width: u32,
    height: u32,
    sample_count: u32,
) -> (TextureView, Texture) {
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = tex.create_view(&wgpu::TextureViewDescriptor::default());
    (view, tex)
}
