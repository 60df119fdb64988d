use dynamic_cubemaps_gpu::{mip_size, tile_workgroups, CUBE_FACES};

use super::StageContext;

/// Fills levels `1..` of a cubemap by repeatedly box-filtering the level
/// above; `chain[n]` binds level `n` for read and level `n + 1` for write.
pub fn generate(
    ctx: &mut StageContext,
    label: &str,
    kernel: &wgpu::ComputePipeline,
    size: u32,
    chain: &[wgpu::BindGroup],
) {
    for (idx, bind_group) in chain.iter().enumerate() {
        let level = idx as u32 + 1;
        let tiles = tile_workgroups(mip_size(size, level));

        ctx.dispatch(
            &format!("{label}_downsample{level}"),
            kernel,
            &[bind_group],
            (tiles, tiles, CUBE_FACES),
        );
    }
}
