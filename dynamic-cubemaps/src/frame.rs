use crate::{BindGroupBuilder, Camera, SampledTexture};

/// Inputs of a single tick, supplied by the host renderer.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    pub camera: Camera,

    /// Scene depth after the depth prepass, e.g. an `R32Float` copy; `1.0`
    /// marks the far plane (sky)
    pub depth: &'a wgpu::TextureView,

    /// Scene color
    pub color: &'a wgpu::TextureView,
}

impl<'a> Frame<'a> {
    pub fn layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("dynamic_cubemaps_frame_layout"),
            entries: &[
                SampledTexture::layout(
                    0,
                    wgpu::TextureViewDimension::D2,
                    false,
                ),
                SampledTexture::layout(
                    1,
                    wgpu::TextureViewDimension::D2,
                    false,
                ),
            ],
        })
    }

    pub fn bind_group(
        &self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
    ) -> wgpu::BindGroup {
        BindGroupBuilder::new("frame")
            .add(SampledTexture::loaded(self.depth))
            .add(SampledTexture::loaded(self.color))
            .build(device, layout)
    }
}
