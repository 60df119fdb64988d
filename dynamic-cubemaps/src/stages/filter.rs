use dynamic_cubemaps_gpu::{
    self as gpu, filter_workgroups, CubeFace, CUBE_FACES,
};

use super::{mipmaps, StageContext};
use crate::{KernelKind, Result, Variant};

/// Publishes the inferred cubemap as the variant's environment and
/// prefilters its mip chain, one roughness per level.
pub fn filter(ctx: &mut StageContext, variant: Variant) -> Result<()> {
    let downsample = ctx.kernel(KernelKind::Downsample)?;
    let kernel = ctx.kernel(KernelKind::SpecularIrradiance)?;
    let resources = ctx.resources;
    let inferred = resources.inferred();
    let environment = resources.variant(variant).environment();
    let size = resources.size();

    for face in CubeFace::ALL {
        let origin = wgpu::Origin3d {
            x: 0,
            y: 0,
            z: face.index(),
        };

        ctx.encoder.copy_texture_to_texture(
            wgpu::ImageCopyTexture {
                texture: inferred.texture(),
                mip_level: 0,
                origin,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyTexture {
                texture: environment.texture(),
                mip_level: 0,
                origin,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
        );
    }

    mipmaps::generate(
        ctx,
        "inferred",
        &downsample,
        size,
        resources.inferred_mips(),
    );

    let bind_groups = resources.bind_groups(variant);

    for (idx, bind_group) in bind_groups.filter.iter().enumerate() {
        let level = idx as u32 + 1;
        let workgroups = filter_workgroups(size, level);

        resources
            .filter_params(level)
            .write(ctx.queue, &gpu::FilterParams::new(level));

        ctx.dispatch(
            &format!("{}_filter{level}", variant.name()),
            &kernel,
            &[bind_group],
            (workgroups, workgroups, CUBE_FACES),
        );
    }

    Ok(())
}
