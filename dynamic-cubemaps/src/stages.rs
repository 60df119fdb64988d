mod capture;
mod filter;
mod infer;
mod mipmaps;

use std::sync::Arc;

pub use self::capture::*;
pub use self::filter::*;
pub use self::infer::*;
use crate::{
    CubemapResources, KernelKind, Kernels, Result, ShaderSources,
    WgslCompiler,
};

/// Everything a stage needs to record its work.
pub struct StageContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub resources: &'a CubemapResources,
    pub kernels: &'a mut Kernels<wgpu::ComputePipeline>,
    pub sources: &'a ShaderSources,
    pub encoder: &'a mut wgpu::CommandEncoder,
}

impl StageContext<'_> {
    pub fn kernel(
        &mut self,
        kind: KernelKind,
    ) -> Result<Arc<wgpu::ComputePipeline>> {
        let compiler = WgslCompiler::new(
            self.device,
            self.resources.layouts(),
            self.sources,
        );

        self.kernels.get(&compiler, kind)
    }

    /// Records a single dispatch in its own compute pass.
    pub fn dispatch(
        &mut self,
        label: &str,
        kernel: &wgpu::ComputePipeline,
        bind_groups: &[&wgpu::BindGroup],
        workgroups: (u32, u32, u32),
    ) {
        let label = format!("dynamic_cubemaps_{label}_pass");

        let mut pass =
            self.encoder
                .begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some(&label),
                    timestamp_writes: None,
                });

        pass.set_pipeline(kernel);

        for (bind_group_idx, bind_group) in bind_groups.iter().enumerate() {
            pass.set_bind_group(bind_group_idx as u32, *bind_group, &[]);
        }

        pass.dispatch_workgroups(workgroups.0, workgroups.1, workgroups.2);
    }
}
