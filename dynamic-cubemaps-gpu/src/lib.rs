//! Parameter blocks and math shared by the dynamic-cubemaps kernels and the
//! host side of the pipeline.

mod cube;
mod mips;
mod params;

pub use self::cube::*;
pub use self::mips::*;
pub use self::params::*;

/// Number of mip levels of every cubemap owned by the pipeline.
///
/// Level `n` of the prefiltered environment holds the response for roughness
/// `n / (MIP_LEVELS - 1)`.
pub const MIP_LEVELS: u32 = 8;

/// Width and height of a single workgroup; the third dispatch dimension
/// always walks the cube faces.
pub const WORKGROUP_SIZE: u32 = 8;

pub const CUBE_FACES: u32 = 6;

/// Importance samples taken per texel by the specular prefilter.
pub const FILTER_SAMPLES: u32 = 64;
