use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use derivative::Derivative;
use fxhash::FxHashMap;
use log::{debug, error};

use crate::{Error, Layouts, Result, Variant};

/// Compute kernel used by one of the stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KernelKind {
    Update,
    UpdateReflections,
    Infer,
    InferReflections,
    SpecularIrradiance,
    Downsample,
}

impl KernelKind {
    pub const ALL: [Self; 6] = [
        Self::Update,
        Self::UpdateReflections,
        Self::Infer,
        Self::InferReflections,
        Self::SpecularIrradiance,
        Self::Downsample,
    ];

    pub fn update(variant: Variant) -> Self {
        match variant {
            Variant::Primary => Self::Update,
            Variant::Reflections => Self::UpdateReflections,
        }
    }

    pub fn infer(variant: Variant) -> Self {
        match variant {
            Variant::Primary => Self::Infer,
            Variant::Reflections => Self::InferReflections,
        }
    }

    /// Returns whether this kernel is specific to the reflections variant.
    pub fn is_reflections(self) -> bool {
        matches!(self, Self::UpdateReflections | Self::InferReflections)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::UpdateReflections => "update_reflections",
            Self::Infer => "infer",
            Self::InferReflections => "infer_reflections",
            Self::SpecularIrradiance => "specular_irradiance",
            Self::Downsample => "downsample",
        }
    }

    pub fn file(self) -> &'static str {
        match self {
            Self::Update | Self::UpdateReflections => "update_cubemap.wgsl",
            Self::Infer | Self::InferReflections => "infer_cubemap.wgsl",
            Self::SpecularIrradiance => "specular_irradiance.wgsl",
            Self::Downsample => "downsample.wgsl",
        }
    }

    fn embedded_source(self) -> &'static str {
        match self {
            Self::Update | Self::UpdateReflections => {
                include_str!("../shaders/update_cubemap.wgsl")
            }
            Self::Infer | Self::InferReflections => {
                include_str!("../shaders/infer_cubemap.wgsl")
            }
            Self::SpecularIrradiance => {
                include_str!("../shaders/specular_irradiance.wgsl")
            }
            Self::Downsample => include_str!("../shaders/downsample.wgsl"),
        }
    }

    /// Pipeline-overridable constants the kernel is specialized with.
    pub fn constants(self) -> HashMap<String, f64> {
        let mut constants = HashMap::new();

        match self {
            Self::Update | Self::Infer => {
                constants.insert("REFLECTIONS".into(), 0.0);
            }
            Self::UpdateReflections | Self::InferReflections => {
                constants.insert("REFLECTIONS".into(), 1.0);
            }
            Self::SpecularIrradiance | Self::Downsample => {
                //
            }
        }

        constants
    }
}

/// Where kernel sources come from.
#[derive(Clone, Debug, Default)]
pub struct ShaderSources {
    dir: Option<PathBuf>,
}

impl ShaderSources {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    pub fn load(&self, kind: KernelKind) -> Result<Cow<'static, str>> {
        let Some(dir) = &self.dir else {
            return Ok(Cow::Borrowed(kind.embedded_source()));
        };

        let path = dir.join(kind.file());

        fs::read_to_string(&path)
            .map(Cow::Owned)
            .map_err(|source| Error::ShaderSource { path, source })
    }
}

pub trait KernelCompiler {
    type Kernel;

    fn compile(&self, kind: KernelKind) -> Result<Self::Kernel>;
}

/// Lazily compiled kernels.
///
/// Each kind is compiled at most once between invalidations - including
/// kinds that failed to compile, which stay unavailable until the next
/// [`Self::invalidate()`].
#[derive(Debug, Derivative)]
#[derivative(Default(bound = ""))]
pub struct Kernels<K> {
    slots: FxHashMap<KernelKind, Option<Arc<K>>>,
}

impl<K> Kernels<K> {
    pub fn get<C>(&mut self, compiler: &C, kind: KernelKind) -> Result<Arc<K>>
    where
        C: KernelCompiler<Kernel = K>,
    {
        if let Some(slot) = self.slots.get(&kind) {
            return slot.clone().ok_or(Error::KernelUnavailable(kind));
        }

        debug!("Compiling kernel `{}`", kind.name());

        match compiler.compile(kind) {
            Ok(kernel) => {
                let kernel = Arc::new(kernel);

                self.slots.insert(kind, Some(kernel.clone()));

                Ok(kernel)
            }

            Err(err) => {
                error!("Couldn't compile kernel `{}`: {err:?}", kind.name());

                self.slots.insert(kind, None);

                Err(err)
            }
        }
    }

    #[cfg(test)]
    fn is_compiled(&self, kind: KernelKind) -> bool {
        matches!(self.slots.get(&kind), Some(Some(_)))
    }

    pub fn invalidate(&mut self) {
        if !self.slots.is_empty() {
            debug!("Invalidating {} kernel(s)", self.slots.len());
        }

        self.slots.clear();
    }
}

/// Compiles WGSL kernels into compute pipelines.
pub struct WgslCompiler<'a> {
    device: &'a wgpu::Device,
    layouts: &'a Layouts,
    sources: &'a ShaderSources,
}

impl<'a> WgslCompiler<'a> {
    pub fn new(
        device: &'a wgpu::Device,
        layouts: &'a Layouts,
        sources: &'a ShaderSources,
    ) -> Self {
        Self {
            device,
            layouts,
            sources,
        }
    }
}

impl KernelCompiler for WgslCompiler<'_> {
    type Kernel = wgpu::ComputePipeline;

    fn compile(&self, kind: KernelKind) -> Result<Self::Kernel> {
        let source = self.sources.load(kind)?;
        let label = format!("dynamic_cubemaps_{}", kind.name());
        let constants = kind.constants();

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module =
            self.device
                .create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some(&label),
                    source: wgpu::ShaderSource::Wgsl(source),
                });

        let pipeline_layout =
            self.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some(&format!("{label}_pipeline_layout")),
                    bind_group_layouts: &self.layouts.kernel(kind),
                    push_constant_ranges: &[],
                });

        let pipeline = self.device.create_compute_pipeline(
            &wgpu::ComputePipelineDescriptor {
                label: Some(&format!("{label}_pipeline")),
                layout: Some(&pipeline_layout),
                module: &module,
                entry_point: "main",
                compilation_options: wgpu::PipelineCompilationOptions {
                    constants: &constants,
                    ..Default::default()
                },
                cache: None,
            },
        );

        // Validation happens on the calling thread, so this doesn't wait for
        // the GPU
        if let Some(source) = pollster::block_on(self.device.pop_error_scope())
        {
            return Err(Error::Compile { kind, source });
        }

        Ok(pipeline)
    }
}
