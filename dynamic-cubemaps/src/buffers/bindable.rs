/// Object that can be attached to a pipeline, e.g. a buffer or a texture view
pub trait Bindable<'a> {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource<'a>)>;
}

/// Texture view read by a kernel through `textureLoad()` or
/// `textureSampleLevel()`
#[derive(Clone, Copy, Debug)]
pub struct SampledTexture<'a> {
    view: &'a wgpu::TextureView,
    dimension: wgpu::TextureViewDimension,
    filterable: bool,
}

impl<'a> SampledTexture<'a> {
    pub fn new(
        view: &'a wgpu::TextureView,
        dimension: wgpu::TextureViewDimension,
        filterable: bool,
    ) -> Self {
        Self {
            view,
            dimension,
            filterable,
        }
    }

    /// Cubemap sampled through a filtering sampler.
    pub fn cube(view: &'a wgpu::TextureView) -> Self {
        Self::new(view, wgpu::TextureViewDimension::Cube, true)
    }

    /// Regular 2D texture accessed only through `textureLoad()`.
    pub fn loaded(view: &'a wgpu::TextureView) -> Self {
        Self::new(view, wgpu::TextureViewDimension::D2, false)
    }

    pub fn layout(
        binding: u32,
        dimension: wgpu::TextureViewDimension,
        filterable: bool,
    ) -> wgpu::BindGroupLayoutEntry {
        wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: dimension,
                sample_type: wgpu::TextureSampleType::Float { filterable },
            },
            count: None,
        }
    }
}

impl<'a> Bindable<'a> for SampledTexture<'a> {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource<'a>)> {
        let layout = Self::layout(binding, self.dimension, self.filterable);
        let resource = wgpu::BindingResource::TextureView(self.view);

        vec![(layout, resource)]
    }
}

/// Single mip level of a texture written by a kernel through
/// `textureStore()`
#[derive(Clone, Copy, Debug)]
pub struct StorageTexture<'a> {
    view: &'a wgpu::TextureView,
    format: wgpu::TextureFormat,
}

impl<'a> StorageTexture<'a> {
    pub fn new(
        view: &'a wgpu::TextureView,
        format: wgpu::TextureFormat,
    ) -> Self {
        Self { view, format }
    }
}

impl<'a> Bindable<'a> for StorageTexture<'a> {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource<'a>)> {
        let layout = wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::StorageTexture {
                access: wgpu::StorageTextureAccess::WriteOnly,
                format: self.format,
                view_dimension: wgpu::TextureViewDimension::D2Array,
            },
            count: None,
        };

        let resource = wgpu::BindingResource::TextureView(self.view);

        vec![(layout, resource)]
    }
}
