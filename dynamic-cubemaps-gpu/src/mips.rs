use crate::{MIP_LEVELS, WORKGROUP_SIZE};

/// Roughness encoded by given mip level of the prefiltered environment.
pub fn roughness(level: u32) -> f32 {
    level as f32 / (MIP_LEVELS - 1) as f32
}

/// Size of given mip level of a square texture.
pub fn mip_size(base: u32, level: u32) -> u32 {
    (base >> level).max(1)
}

/// Number of workgroups (per axis) dispatched by the specular prefilter for
/// given level.
pub fn filter_workgroups(base: u32, level: u32) -> u32 {
    ((base >> level) / WORKGROUP_SIZE).max(1)
}

/// Number of workgroups (per axis) needed to cover `size` texels with 8x8
/// tiles.
pub fn tile_workgroups(size: u32) -> u32 {
    size.div_ceil(WORKGROUP_SIZE)
}
