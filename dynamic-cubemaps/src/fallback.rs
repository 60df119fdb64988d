use std::path::Path;

use dynamic_cubemaps_gpu::{CubeFace, CUBE_FACES};
use image::RgbaImage;
use log::{debug, warn};

use crate::{CubeTexture, Error, Result};

/// Cubemap used to fill directions that neither the capture nor the probe
/// know about.
///
/// Missing or malformed files are not fatal - we log them and continue with
/// a transparent-black cubemap, which makes the inference fall back to the
/// probe alone.
pub fn load(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    path: &Path,
) -> CubeTexture {
    let faces = match FaceStrip::read(path) {
        Ok(faces) => {
            debug!(
                "Loaded default cubemap `{}`; size={}",
                path.display(),
                faces.size()
            );

            faces
        }

        Err(err) => {
            warn!("{err}; using a black default cubemap instead");

            FaceStrip::black()
        }
    };

    faces.upload(device, queue)
}

/// Six square RGBA8 faces, laid out one after another.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaceStrip {
    size: u32,
    data: Vec<u8>,
}

impl FaceStrip {
    pub fn read(path: &Path) -> Result<Self> {
        let image = image::open(path)
            .map_err(|source| Error::DefaultCubemap {
                path: path.to_owned(),
                source,
            })?
            .into_rgba8();

        Self::from_image(path, image)
    }

    /// Decodes a vertical strip of faces (+X, -X, +Y, -Y, +Z, -Z, top to
    /// bottom); since each face is stored row by row, the strip's pixels are
    /// already in the array-layer order.
    pub fn from_image(path: &Path, image: RgbaImage) -> Result<Self> {
        let (width, height) = image.dimensions();

        if width == 0 || height != width * CUBE_FACES {
            return Err(Error::DefaultCubemapLayout {
                path: path.to_owned(),
                width,
                height,
            });
        }

        Ok(Self {
            size: width,
            data: image.into_raw(),
        })
    }

    pub fn black() -> Self {
        Self {
            size: 1,
            data: vec![0; 4 * CUBE_FACES as usize],
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn face(&self, face: CubeFace) -> &[u8] {
        let len = (4 * self.size * self.size) as usize;
        let offset = len * face.index() as usize;

        &self.data[offset..offset + len]
    }

    fn upload(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> CubeTexture {
        let size = self.size();

        let texture = CubeTexture::builder("fallback")
            .with_size(size)
            .with_format(wgpu::TextureFormat::Rgba8Unorm)
            .with_usage(wgpu::TextureUsages::COPY_DST)
            .build(device);

        for face in CubeFace::ALL {
            queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture: texture.texture(),
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: face.index(),
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                self.face(face),
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * size),
                    rows_per_image: Some(size),
                },
                wgpu::Extent3d {
                    width: size,
                    height: size,
                    depth_or_array_layers: 1,
                },
            );
        }

        texture
    }
}
