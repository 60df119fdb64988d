use dynamic_cubemaps_gpu::{tile_workgroups, CUBE_FACES};

use super::{mipmaps, StageContext};
use crate::{KernelKind, Result, Variant};

/// Fills the holes of the variant's capture, writing the result into the
/// shared inferred cubemap.
pub fn infer(ctx: &mut StageContext, variant: Variant) -> Result<()> {
    let downsample = ctx.kernel(KernelKind::Downsample)?;
    let kernel = ctx.kernel(KernelKind::infer(variant))?;
    let resources = ctx.resources;
    let bind_groups = resources.bind_groups(variant);
    let name = variant.name();

    mipmaps::generate(
        ctx,
        &format!("{name}_capture"),
        &downsample,
        resources.size(),
        &bind_groups.capture_mips,
    );

    let tiles = tile_workgroups(resources.size());

    ctx.dispatch(
        &format!("{name}_infer"),
        &kernel,
        &[&bind_groups.infer],
        (tiles, tiles, CUBE_FACES),
    );

    Ok(())
}
