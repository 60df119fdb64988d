use dynamic_cubemaps_gpu::{CubeFace, CUBE_FACES};
use log::debug;

use crate::{SampledTexture, StorageTexture};

/// Six-layer texture together with all the views the pipeline needs.
///
/// Cube, per-mip and per-face views are created once, from this very texture,
/// so that whatever reads a level and whatever writes it always agree on the
/// underlying resource and mip layout.
#[derive(Debug)]
pub struct CubeTexture {
    texture: wgpu::Texture,
    cube: wgpu::TextureView,
    mips: Vec<wgpu::TextureView>,
    faces: Vec<wgpu::TextureView>,
}

impl CubeTexture {
    pub fn builder(label: impl ToString) -> CubeTextureBuilder {
        CubeTextureBuilder {
            label: label.to_string(),
            size: 1,
            mip_levels: 1,
            format: wgpu::TextureFormat::Rgba16Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING,
        }
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.texture.format()
    }

    pub fn cube_view(&self) -> &wgpu::TextureView {
        &self.cube
    }

    /// Whole mip chain, sampled as a cube.
    pub fn sampled(&self) -> SampledTexture<'_> {
        SampledTexture::cube(&self.cube)
    }

    /// Single mip level, loaded as a 2D array (one layer per face).
    pub fn mip(&self, level: u32) -> SampledTexture<'_> {
        SampledTexture::new(
            &self.mips[level as usize],
            wgpu::TextureViewDimension::D2Array,
            false,
        )
    }

    /// Single mip level, written as a 2D array (one layer per face).
    pub fn storage(&self, level: u32) -> StorageTexture<'_> {
        StorageTexture::new(&self.mips[level as usize], self.format())
    }

    /// Base level of given face; available only for render-attachment
    /// textures.
    pub fn face(&self, face: CubeFace) -> &wgpu::TextureView {
        &self.faces[face.index() as usize]
    }

    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

pub struct CubeTextureBuilder {
    label: String,
    size: u32,
    mip_levels: u32,
    format: wgpu::TextureFormat,
    usage: wgpu::TextureUsages,
}

impl CubeTextureBuilder {
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_mip_levels(mut self, mip_levels: u32) -> Self {
        self.mip_levels = mip_levels;
        self
    }

    pub fn with_format(mut self, format: wgpu::TextureFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_usage(mut self, usage: wgpu::TextureUsages) -> Self {
        self.usage |= usage;
        self
    }

    pub fn build(self, device: &wgpu::Device) -> CubeTexture {
        let label = format!("dynamic_cubemaps_{}", self.label);

        debug!(
            "Allocating cubemap `{label}`; size={}, mip_levels={}, format={:?}",
            self.size, self.mip_levels, self.format,
        );

        assert!(self.size > 0);
        assert!(self.mip_levels > 0);

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&label),
            size: wgpu::Extent3d {
                width: self.size,
                height: self.size,
                depth_or_array_layers: CUBE_FACES,
            },
            mip_level_count: self.mip_levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.format,
            usage: self.usage,
            view_formats: &[],
        });

        let cube = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&format!("{label}_cube")),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });

        let mips = (0..self.mip_levels)
            .map(|level| {
                texture.create_view(&wgpu::TextureViewDescriptor {
                    label: Some(&format!("{label}_mip{level}")),
                    dimension: Some(wgpu::TextureViewDimension::D2Array),
                    base_mip_level: level,
                    mip_level_count: Some(1),
                    ..Default::default()
                })
            })
            .collect();

        let faces = if self
            .usage
            .contains(wgpu::TextureUsages::RENDER_ATTACHMENT)
        {
            CubeFace::ALL
                .into_iter()
                .map(|face| {
                    texture.create_view(&wgpu::TextureViewDescriptor {
                        label: Some(&format!("{label}_{}", face.name())),
                        dimension: Some(wgpu::TextureViewDimension::D2),
                        base_mip_level: 0,
                        mip_level_count: Some(1),
                        base_array_layer: face.index(),
                        array_layer_count: Some(1),
                        ..Default::default()
                    })
                })
                .collect()
        } else {
            Vec::new()
        };

        CubeTexture {
            texture,
            cube,
            mips,
            faces,
        }
    }
}
