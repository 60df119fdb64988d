use std::path::Path;

use derivative::Derivative;
use dynamic_cubemaps_gpu::{self as gpu, CUBE_FACES, MIP_LEVELS};
use log::debug;

use crate::{
    fallback, BindGroupBuilder, CubeTexture, Error, Frame, KernelKind,
    PerVariant, Result, SampledTexture, Sampler, UniformBuffer, Variant,
};

/// Bind-group layouts shared by both variants and by the kernels' pipeline
/// layouts.
#[derive(Debug)]
pub struct Layouts {
    pub capture: wgpu::BindGroupLayout,
    pub frame: wgpu::BindGroupLayout,
    pub infer: wgpu::BindGroupLayout,
    pub filter: wgpu::BindGroupLayout,
    pub downsample: wgpu::BindGroupLayout,
}

impl Layouts {
    /// Bind-group layouts of given kernel, in the order of their groups.
    pub fn kernel(&self, kind: KernelKind) -> Vec<&wgpu::BindGroupLayout> {
        match kind {
            KernelKind::Update | KernelKind::UpdateReflections => {
                vec![&self.capture, &self.frame]
            }
            KernelKind::Infer | KernelKind::InferReflections => {
                vec![&self.infer]
            }
            KernelKind::SpecularIrradiance => vec![&self.filter],
            KernelKind::Downsample => vec![&self.downsample],
        }
    }
}

/// Textures owned by a single variant.
#[derive(Debug)]
pub struct VariantResources {
    /// Premultiplied scene color, with a full mip chain for the inference
    capture: CubeTexture,

    /// Accumulated (non-premultiplied) color; alpha is the coverage
    capture_raw: CubeTexture,

    /// Camera-relative position of each captured texel
    capture_position: CubeTexture,

    /// Prefiltered environment read by the shading pass
    environment: CubeTexture,

    params: UniformBuffer<gpu::CaptureParams>,
}

impl VariantResources {
    fn new(device: &wgpu::Device, variant: Variant, size: u32) -> Self {
        let name = variant.name();

        let capture = CubeTexture::builder(format!("{name}_capture"))
            .with_size(size)
            .with_mip_levels(MIP_LEVELS)
            .with_usage(wgpu::TextureUsages::STORAGE_BINDING)
            .with_usage(wgpu::TextureUsages::RENDER_ATTACHMENT)
            .with_usage(wgpu::TextureUsages::COPY_SRC)
            .build(device);

        let capture_raw = CubeTexture::builder(format!("{name}_capture_raw"))
            .with_size(size)
            .with_usage(wgpu::TextureUsages::STORAGE_BINDING)
            .with_usage(wgpu::TextureUsages::RENDER_ATTACHMENT)
            .with_usage(wgpu::TextureUsages::COPY_SRC)
            .build(device);

        let capture_position =
            CubeTexture::builder(format!("{name}_capture_position"))
                .with_size(size)
                .with_usage(wgpu::TextureUsages::STORAGE_BINDING)
                .with_usage(wgpu::TextureUsages::RENDER_ATTACHMENT)
                .with_usage(wgpu::TextureUsages::COPY_SRC)
                .build(device);

        let environment = CubeTexture::builder(format!("{name}_environment"))
            .with_size(size)
            .with_mip_levels(MIP_LEVELS)
            .with_usage(wgpu::TextureUsages::STORAGE_BINDING)
            .with_usage(wgpu::TextureUsages::COPY_DST)
            .with_usage(wgpu::TextureUsages::COPY_SRC)
            .build(device);

        let params =
            UniformBuffer::new(device, format!("{name}_capture_params"));

        Self {
            capture,
            capture_raw,
            capture_position,
            environment,
            params,
        }
    }

    pub fn capture(&self) -> &CubeTexture {
        &self.capture
    }

    pub fn capture_raw(&self) -> &CubeTexture {
        &self.capture_raw
    }

    pub fn capture_position(&self) -> &CubeTexture {
        &self.capture_position
    }

    pub fn environment(&self) -> &CubeTexture {
        &self.environment
    }

    pub fn params(&self) -> &UniformBuffer<gpu::CaptureParams> {
        &self.params
    }

    /// Targets cleared when the variant gets reset.
    pub fn capture_targets(&self) -> [&CubeTexture; 3] {
        [&self.capture, &self.capture_raw, &self.capture_position]
    }

    fn destroy(&self) {
        for texture in self.capture_targets() {
            texture.destroy();
        }

        self.environment.destroy();
    }
}

/// Pre-built bind groups of a single variant.
pub struct VariantBindGroups {
    pub capture: wgpu::BindGroup,
    pub infer: wgpu::BindGroup,

    /// Indexed by `level - 1`
    pub filter: Vec<wgpu::BindGroup>,

    /// Downsampling chain of the capture; indexed by `level - 1`
    pub capture_mips: Vec<wgpu::BindGroup>,
}

/// All GPU state of the pipeline.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct CubemapResources {
    size: u32,
    layouts: Layouts,
    variants: PerVariant<VariantResources>,

    /// Copies of the capture's raw and position targets, taken right before
    /// capturing so that the kernel can read the previous accumulation while
    /// writing the new one
    history_raw: CubeTexture,
    history_position: CubeTexture,

    /// Scratch cubemap shared by both variants
    inferred: CubeTexture,

    fallback: CubeTexture,
    probe: wgpu::TextureView,
    sampler: Sampler,

    /// Indexed by `level - 1`
    filter_params: Vec<UniformBuffer<gpu::FilterParams>>,

    #[derivative(Debug = "ignore")]
    bind_groups: PerVariant<VariantBindGroups>,

    /// Downsampling chain of the inferred cubemap; indexed by `level - 1`
    #[derivative(Debug = "ignore")]
    inferred_mips: Vec<wgpu::BindGroup>,
}

impl CubemapResources {
    /// Smallest reference cubemap that still has room for the whole mip
    /// chain.
    pub const MIN_SIZE: u32 = 1 << (MIP_LEVELS - 1);

    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        reference: &wgpu::Texture,
        default_cubemap: &Path,
    ) -> Result<Self> {
        let size = Self::validate_reference(
            reference.width(),
            reference.height(),
            reference.depth_or_array_layers(),
        )?;

        debug!("Allocating resources; size={size}");

        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let this = Self::allocate(device, queue, reference, default_cubemap);

        let validation = pollster::block_on(device.pop_error_scope());
        let out_of_memory = pollster::block_on(device.pop_error_scope());

        if let Some(err) = out_of_memory.or(validation) {
            this.destroy();

            return Err(Error::Device(err));
        }

        Ok(this)
    }

    /// Returns the size of the pipeline's cubemaps for given reference
    /// cubemap.
    pub fn validate_reference(
        width: u32,
        height: u32,
        layers: u32,
    ) -> Result<u32> {
        let is_valid = width == height
            && width.is_power_of_two()
            && width >= Self::MIN_SIZE
            && layers == CUBE_FACES;

        if is_valid {
            Ok(width)
        } else {
            Err(Error::InvalidReference {
                width,
                height,
                min: Self::MIN_SIZE,
            })
        }
    }

    fn allocate(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        reference: &wgpu::Texture,
        default_cubemap: &Path,
    ) -> Self {
        let size = reference.width();

        let variants = PerVariant::from_fn(|variant| {
            VariantResources::new(device, variant, size)
        });

        let history_raw = CubeTexture::builder("history_raw")
            .with_size(size)
            .with_usage(wgpu::TextureUsages::COPY_DST)
            .build(device);

        let history_position = CubeTexture::builder("history_position")
            .with_size(size)
            .with_usage(wgpu::TextureUsages::COPY_DST)
            .build(device);

        let inferred = CubeTexture::builder("inferred")
            .with_size(size)
            .with_mip_levels(MIP_LEVELS)
            .with_usage(wgpu::TextureUsages::STORAGE_BINDING)
            .with_usage(wgpu::TextureUsages::COPY_SRC)
            .build(device);

        let fallback = fallback::load(device, queue, default_cubemap);

        let probe = reference.create_view(&wgpu::TextureViewDescriptor {
            label: Some("dynamic_cubemaps_probe"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });

        let sampler = Sampler::new(device, "dynamic_cubemaps_sampler");

        let filter_params: Vec<_> = (1..MIP_LEVELS)
            .map(|level| {
                UniformBuffer::with_contents(
                    device,
                    format!("filter_params{level}"),
                    &gpu::FilterParams::new(level),
                )
            })
            .collect();

        // ---

        let primary = &variants[Variant::Primary];

        let layouts = Layouts {
            capture: capture_bindings(
                primary,
                &history_raw,
                &history_position,
            )
            .layout(device),
            frame: Frame::layout(device),
            infer: infer_bindings(
                primary, &inferred, &probe, &fallback, &sampler,
            )
            .layout(device),
            filter: filter_bindings(
                primary,
                &inferred,
                &sampler,
                &filter_params[0],
                1,
            )
            .layout(device),
            downsample: downsample_bindings("primary", &primary.capture, 1)
                .layout(device),
        };

        let bind_groups = PerVariant::from_fn(|variant| {
            let resources = &variants[variant];
            let name = variant.name();

            let capture =
                capture_bindings(resources, &history_raw, &history_position)
                    .build(device, &layouts.capture);

            let infer = infer_bindings(
                resources, &inferred, &probe, &fallback, &sampler,
            )
            .build(device, &layouts.infer);

            let filter = (1..MIP_LEVELS)
                .map(|level| {
                    filter_bindings(
                        resources,
                        &inferred,
                        &sampler,
                        &filter_params[level as usize - 1],
                        level,
                    )
                    .build(device, &layouts.filter)
                })
                .collect();

            let capture_mips = (1..MIP_LEVELS)
                .map(|level| {
                    downsample_bindings(name, &resources.capture, level)
                        .build(device, &layouts.downsample)
                })
                .collect();

            VariantBindGroups {
                capture,
                infer,
                filter,
                capture_mips,
            }
        });

        let inferred_mips = (1..MIP_LEVELS)
            .map(|level| {
                downsample_bindings("inferred", &inferred, level)
                    .build(device, &layouts.downsample)
            })
            .collect();

        Self {
            size,
            layouts,
            variants,
            history_raw,
            history_position,
            inferred,
            fallback,
            probe,
            sampler,
            filter_params,
            bind_groups,
            inferred_mips,
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn layouts(&self) -> &Layouts {
        &self.layouts
    }

    pub fn variant(&self, variant: Variant) -> &VariantResources {
        &self.variants[variant]
    }

    pub fn bind_groups(&self, variant: Variant) -> &VariantBindGroups {
        &self.bind_groups[variant]
    }

    pub fn history_raw(&self) -> &CubeTexture {
        &self.history_raw
    }

    pub fn history_position(&self) -> &CubeTexture {
        &self.history_position
    }

    pub fn inferred(&self) -> &CubeTexture {
        &self.inferred
    }

    pub fn inferred_mips(&self) -> &[wgpu::BindGroup] {
        &self.inferred_mips
    }

    /// Parameters of the prefilter for given level (`1..MIP_LEVELS`).
    pub fn filter_params(
        &self,
        level: u32,
    ) -> &UniformBuffer<gpu::FilterParams> {
        &self.filter_params[level as usize - 1]
    }

    pub fn destroy(&self) {
        debug!("Releasing resources");

        for (_, variant) in self.variants.iter() {
            variant.destroy();
        }

        self.history_raw.destroy();
        self.history_position.destroy();
        self.inferred.destroy();
        self.fallback.destroy();
    }
}

fn capture_bindings<'a>(
    variant: &'a VariantResources,
    history_raw: &'a CubeTexture,
    history_position: &'a CubeTexture,
) -> BindGroupBuilder<'a> {
    BindGroupBuilder::new("capture")
        .add(&variant.params)
        .add(history_raw.mip(0))
        .add(history_position.mip(0))
        .add(variant.capture.storage(0))
        .add(variant.capture_raw.storage(0))
        .add(variant.capture_position.storage(0))
}

fn infer_bindings<'a>(
    variant: &'a VariantResources,
    inferred: &'a CubeTexture,
    probe: &'a wgpu::TextureView,
    fallback: &'a CubeTexture,
    sampler: &'a Sampler,
) -> BindGroupBuilder<'a> {
    BindGroupBuilder::new("infer")
        .add(variant.capture.sampled())
        .add(SampledTexture::cube(probe))
        .add(fallback.sampled())
        .add(sampler)
        .add(inferred.storage(0))
}

fn filter_bindings<'a>(
    variant: &'a VariantResources,
    inferred: &'a CubeTexture,
    sampler: &'a Sampler,
    params: &'a UniformBuffer<gpu::FilterParams>,
    level: u32,
) -> BindGroupBuilder<'a> {
    BindGroupBuilder::new(format!("filter{level}"))
        .add(inferred.sampled())
        .add(sampler)
        .add(params)
        .add(variant.environment.storage(level))
}

fn downsample_bindings<'a>(
    name: &str,
    texture: &'a CubeTexture,
    level: u32,
) -> BindGroupBuilder<'a> {
    BindGroupBuilder::new(format!("{name}_downsample{level}"))
        .add(texture.mip(level - 1))
        .add(texture.storage(level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_reference() {
        assert_eq!(128, CubemapResources::MIN_SIZE);

        for size in [128, 256, 1024] {
            assert_eq!(
                size,
                CubemapResources::validate_reference(size, size, 6).unwrap()
            );
        }

        let invalid = [
            (64, 64, 6),
            (100, 100, 6),
            (256, 128, 6),
            (384, 384, 6),
            (256, 256, 1),
        ];

        for (width, height, layers) in invalid {
            let actual =
                CubemapResources::validate_reference(width, height, layers);

            assert!(
                matches!(
                    actual,
                    Err(Error::InvalidReference {
                        width: w,
                        height: h,
                        min: 128,
                    }) if w == width && h == height
                ),
                "{width}x{height}x{layers}"
            );
        }
    }
}
