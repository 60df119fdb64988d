use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::KernelKind;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("dynamic cubemaps were used before setup")]
    NotInitialized,

    #[error(
        "reference cubemap must be square, a power of two and at least \
         {min} texels wide, got {width}x{height}"
    )]
    InvalidReference { width: u32, height: u32, min: u32 },

    #[error("couldn't allocate GPU resources")]
    Device(#[source] wgpu::Error),

    #[error("couldn't read kernel `{}`", .path.display())]
    ShaderSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("couldn't compile kernel `{}`", .kind.name())]
    Compile {
        kind: KernelKind,
        #[source]
        source: wgpu::Error,
    },

    #[error("kernel `{}` failed to compile earlier", .0.name())]
    KernelUnavailable(KernelKind),

    #[error("couldn't load default cubemap `{}`", .path.display())]
    DefaultCubemap {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(
        "default cubemap `{}` must be six square faces stacked vertically, \
         got {width}x{height}",
        .path.display()
    )]
    DefaultCubemapLayout {
        path: PathBuf,
        width: u32,
        height: u32,
    },
}
