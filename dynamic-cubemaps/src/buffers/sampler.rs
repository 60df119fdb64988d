use super::Bindable;

/// Trilinear, wrapping sampler shared by all kernels
#[derive(Debug)]
pub struct Sampler {
    sampler: wgpu::Sampler,
}

impl Sampler {
    pub fn new(device: &wgpu::Device, label: impl AsRef<str>) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label.as_ref()),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self { sampler }
    }
}

impl<'a> Bindable<'a> for &'a Sampler {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource<'a>)> {
        let layout = wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Sampler(
                wgpu::SamplerBindingType::Filtering,
            ),
            count: None,
        };

        let sampler: &'a wgpu::Sampler = &self.sampler;
        let resource = wgpu::BindingResource::Sampler(sampler);

        vec![(layout, resource)]
    }
}
