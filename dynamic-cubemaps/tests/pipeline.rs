use std::path::PathBuf;

use dynamic_cubemaps::gpu::{CubeFace, MIP_LEVELS};
use dynamic_cubemaps::{
    Camera, Config, DynamicCubemaps, Error, Event, Frame, Settings,
    ShadingViews, Stage, Tick, Variant,
};
use glam::{uvec2, Vec3};

const SCREEN: u32 = 64;

fn device() -> Option<(wgpu::Device, wgpu::Queue)> {
    pollster::block_on(async {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .await?;

        adapter
            .request_device(&wgpu::DeviceDescriptor::default(), None)
            .await
            .ok()
    })
}

macro_rules! device_or_skip {
    () => {
        match device() {
            Some(device) => device,
            None => {
                eprintln!("No GPU adapter available; skipping");
                return;
            }
        }
    };
}

fn config() -> Config {
    Config {
        default_cubemap: PathBuf::from("missing/default-cubemap.png"),
        ..Default::default()
    }
}

fn texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    size: u32,
    layers: u32,
    format: wgpu::TextureFormat,
    texel: &[u8],
) -> wgpu::Texture {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("test"),
        size: wgpu::Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: layers,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    let data = texel.repeat((size * size * layers) as usize);

    queue.write_texture(
        texture.as_image_copy(),
        &data,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(size * texel.len() as u32),
            rows_per_image: Some(size),
        },
        wgpu::Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: layers,
        },
    );

    texture
}

fn probe(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    size: u32,
) -> wgpu::Texture {
    texture(
        device,
        queue,
        size,
        6,
        wgpu::TextureFormat::Rgba8Unorm,
        &[32, 64, 128, 255],
    )
}

struct Scene {
    depth: wgpu::TextureView,
    color: wgpu::TextureView,
}

impl Scene {
    fn new(device: &wgpu::Device, queue: &wgpu::Queue, color: [u8; 4]) -> Self {
        let depth = texture(
            device,
            queue,
            SCREEN,
            1,
            wgpu::TextureFormat::R32Float,
            &0.5f32.to_le_bytes(),
        );

        let color = texture(
            device,
            queue,
            SCREEN,
            1,
            wgpu::TextureFormat::Rgba8Unorm,
            &color,
        );

        Self {
            depth: depth.create_view(&Default::default()),
            color: color.create_view(&Default::default()),
        }
    }

    fn frame(&self) -> Frame<'_> {
        self.frame_towards(Vec3::NEG_Z)
    }

    fn frame_towards(&self, forward: Vec3) -> Frame<'_> {
        Frame {
            camera: Camera::perspective(
                Vec3::new(1.0, 2.0, 3.0),
                forward,
                Vec3::Y,
                1.2,
                uvec2(SCREEN, SCREEN),
            ),
            depth: &self.depth,
            color: &self.color,
        }
    }
}

/// Reads all layers of given mip level, without the row padding.
fn read(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    mip_level: u32,
) -> Vec<u8> {
    let size = (texture.width() >> mip_level).max(1);
    let layers = texture.depth_or_array_layers();
    let texel = texture.format().block_copy_size(None).unwrap();
    let row = size * texel;
    let padded_row = row.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
        * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("test_readback"),
        size: (padded_row * size * layers) as u64,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&Default::default());

    encoder.copy_texture_to_buffer(
        wgpu::ImageCopyTexture {
            texture,
            mip_level,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::ImageCopyBuffer {
            buffer: &buffer,
            layout: wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(padded_row),
                rows_per_image: Some(size),
            },
        },
        wgpu::Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: layers,
        },
    );

    queue.submit([encoder.finish()]);

    let slice = buffer.slice(..);

    slice.map_async(wgpu::MapMode::Read, |result| result.unwrap());
    device.poll(wgpu::Maintain::Wait);

    let data = slice.get_mapped_range();

    let texels = data
        .chunks(padded_row as usize)
        .flat_map(|padded| &padded[..row as usize])
        .copied()
        .collect();

    drop(data);
    buffer.unmap();

    texels
}

/// Reads the base level of a single face of an `Rgba16Float` cubemap.
fn read_face(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    face: CubeFace,
) -> Vec<u8> {
    let layer = (texture.width() * texture.height() * 8) as usize;
    let offset = layer * face.index() as usize;

    read(device, queue, texture, 0)[offset..offset + layer].to_vec()
}

/// Splits `Rgba16Float` texels into their (bit-encoded) color channels.
fn rgb_channels(texels: &[u8]) -> impl Iterator<Item = u16> + '_ {
    texels.chunks(8).flat_map(|texel| {
        texel[..6]
            .chunks(2)
            .map(|channel| u16::from_le_bytes([channel[0], channel[1]]))
    })
}

fn is_zero(channel: u16) -> bool {
    channel & 0x7fff == 0
}

#[test]
fn six_tick_cycle() {
    let (device, queue) = device_or_skip!();
    let reference = probe(&device, &queue, 128);
    let scene = Scene::new(&device, &queue, [255, 255, 255, 255]);
    let mut target = DynamicCubemaps::new(config());

    target.setup(&device, &queue, &reference).unwrap();

    target.events().send(Event::SceneModeChanged {
        full_reflections: true,
    });

    let expected = [
        Stage::Capture,
        Stage::Infer,
        Stage::Filter,
        Stage::Capture2,
        Stage::Infer2,
        Stage::Filter2,
    ];

    for stage in expected {
        assert_eq!(
            Tick::Executed(stage),
            target.tick(&device, &queue, &scene.frame()).unwrap()
        );
    }

    assert_eq!(Stage::Capture, target.stage());
}

#[test]
fn primary_only_cycle() {
    let (device, queue) = device_or_skip!();
    let reference = probe(&device, &queue, 128);
    let scene = Scene::new(&device, &queue, [255, 255, 255, 255]);
    let mut target = DynamicCubemaps::new(config());

    target.setup(&device, &queue, &reference).unwrap();

    for _ in 0..6 {
        let tick = target.tick(&device, &queue, &scene.frame()).unwrap();

        assert!(
            matches!(
                tick,
                Tick::Executed(stage) if stage.variant() == Variant::Primary
            ),
            "{tick:?}"
        );
    }
}

/// Runs the capture of given variant once while looking along -Z, then once
/// more (optionally after a reset) while looking along +Z; returns the +Z and
/// -Z faces of the variant's color, raw and position targets.
fn capture_turning_around(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    variant: Variant,
    reset: bool,
) -> [[Vec<u8>; 3]; 2] {
    let reference = probe(device, queue, 128);
    let scene = Scene::new(device, queue, [255, 255, 255, 255]);
    let mut target = DynamicCubemaps::new(config());

    let capture = match variant {
        Variant::Primary => Stage::Capture,
        Variant::Reflections => Stage::Capture2,
    };

    target.setup(device, queue, &reference).unwrap();

    target.events().send(Event::SceneModeChanged {
        full_reflections: variant == Variant::Reflections,
    });

    let mut captured = false;

    while !captured || target.stage() != capture {
        let tick = target
            .tick(device, queue, &scene.frame_towards(Vec3::NEG_Z))
            .unwrap();

        captured |= tick == Tick::Executed(capture);
    }

    if reset {
        target.events().send(Event::LoadingFinished);
    }

    assert_eq!(
        Tick::Executed(capture),
        target
            .tick(device, queue, &scene.frame_towards(Vec3::Z))
            .unwrap()
    );

    let targets = target.resources().unwrap().variant(variant);

    [CubeFace::PositiveZ, CubeFace::NegativeZ].map(|face| {
        targets.capture_targets().map(|texture| {
            read_face(device, queue, texture.texture(), face)
        })
    })
}

fn reset_clears_capture(variant: Variant) {
    let (device, queue) = device_or_skip!();

    let [seen, behind] =
        capture_turning_around(&device, &queue, variant, true);

    for texels in &behind {
        assert!(rgb_channels(texels).all(is_zero), "{variant:?}");
    }

    assert!(!rgb_channels(&seen[1]).all(is_zero), "{variant:?}");

    let [_, behind] = capture_turning_around(&device, &queue, variant, false);

    for texels in &behind {
        assert!(!rgb_channels(texels).all(is_zero), "{variant:?}");
    }
}

#[test]
fn reset_clears_primary_capture() {
    reset_clears_capture(Variant::Primary);
}

#[test]
fn reset_clears_reflections_capture() {
    reset_clears_capture(Variant::Reflections);
}

#[test]
fn determinism() {
    let (device, queue) = device_or_skip!();
    let reference = probe(&device, &queue, 128);
    let scene = Scene::new(&device, &queue, [200, 100, 50, 255]);

    let run = || {
        let mut target = DynamicCubemaps::new(config());

        target.setup(&device, &queue, &reference).unwrap();

        target.events().send(Event::SceneModeChanged {
            full_reflections: true,
        });

        for _ in 0..6 {
            target.tick(&device, &queue, &scene.frame()).unwrap();
        }

        let resources = target.resources().unwrap();

        let mut texels = Vec::new();

        for variant in Variant::ALL {
            let environment = resources.variant(variant).environment();

            for level in 0..MIP_LEVELS {
                texels.extend(read(
                    &device,
                    &queue,
                    environment.texture(),
                    level,
                ));
            }
        }

        target.teardown();
        texels
    };

    let a = run();
    let b = run();

    assert!(!a.is_empty());
    assert!(a == b, "environments differ between runs");
}

#[test]
fn hot_reload() {
    let (device, queue) = device_or_skip!();
    let reference = probe(&device, &queue, 128);
    let scene = Scene::new(&device, &queue, [255, 255, 255, 255]);
    let mut target = DynamicCubemaps::new(config());

    target.setup(&device, &queue, &reference).unwrap();

    assert_eq!(
        Tick::Executed(Stage::Capture),
        target.tick(&device, &queue, &scene.frame()).unwrap()
    );

    target.events().send(Event::ShadersChanged);

    assert_eq!(
        Tick::Recompiling {
            host_shaders: false
        },
        target.tick(&device, &queue, &scene.frame()).unwrap()
    );

    assert_eq!(Stage::Infer, target.stage());

    assert_eq!(
        Tick::Executed(Stage::Infer),
        target.tick(&device, &queue, &scene.frame()).unwrap()
    );
}

#[test]
fn toggling_ssr_recompiles() {
    let (device, queue) = device_or_skip!();
    let reference = probe(&device, &queue, 128);
    let scene = Scene::new(&device, &queue, [255, 255, 255, 255]);
    let mut target = DynamicCubemaps::new(config());

    target.setup(&device, &queue, &reference).unwrap();

    target.events().send(Event::SettingsChanged(Settings {
        enable_ssr: false,
        ..Default::default()
    }));

    assert_eq!(
        Tick::Recompiling { host_shaders: true },
        target.tick(&device, &queue, &scene.frame()).unwrap()
    );

    assert!(target.settings().shader_defines().is_empty());

    assert_eq!(
        Tick::Executed(Stage::Capture),
        target.tick(&device, &queue, &scene.frame()).unwrap()
    );
}

#[test]
fn disabled() {
    let (device, queue) = device_or_skip!();
    let reference = probe(&device, &queue, 128);
    let scene = Scene::new(&device, &queue, [255, 255, 255, 255]);
    let mut target = DynamicCubemaps::new(config());

    target.setup(&device, &queue, &reference).unwrap();
    target.tick(&device, &queue, &scene.frame()).unwrap();

    target.events().send(Event::SettingsChanged(Settings {
        enabled: false,
        ..Default::default()
    }));

    for _ in 0..3 {
        assert_eq!(
            Tick::Disabled,
            target.tick(&device, &queue, &scene.frame()).unwrap()
        );
    }

    target.events().send(Event::SettingsChanged(Settings::default()));

    assert_eq!(
        Tick::Executed(Stage::Infer),
        target.tick(&device, &queue, &scene.frame()).unwrap()
    );
}

#[test]
fn toggling_ssr_while_disabled() {
    let (device, queue) = device_or_skip!();
    let reference = probe(&device, &queue, 128);
    let scene = Scene::new(&device, &queue, [255, 255, 255, 255]);
    let mut target = DynamicCubemaps::new(config());

    target.setup(&device, &queue, &reference).unwrap();

    target.events().send(Event::SettingsChanged(Settings {
        enabled: false,
        enable_ssr: false,
        ..Default::default()
    }));

    assert_eq!(
        Tick::Recompiling { host_shaders: true },
        target.tick(&device, &queue, &scene.frame()).unwrap()
    );

    assert_eq!(
        Tick::Disabled,
        target.tick(&device, &queue, &scene.frame()).unwrap()
    );

    assert_eq!(Stage::Capture, target.stage());
}

#[test]
fn teardown() {
    let (device, queue) = device_or_skip!();
    let reference = probe(&device, &queue, 128);
    let scene = Scene::new(&device, &queue, [255, 255, 255, 255]);
    let mut target = DynamicCubemaps::new(config());

    assert!(matches!(
        target.tick(&device, &queue, &scene.frame()),
        Err(Error::NotInitialized)
    ));

    target.setup(&device, &queue, &reference).unwrap();
    target.teardown();
    target.teardown();

    assert!(target.shading_views().is_none());

    assert!(matches!(
        target.tick(&device, &queue, &scene.frame()),
        Err(Error::NotInitialized)
    ));
}

#[test]
fn invalid_reference() {
    let (device, queue) = device_or_skip!();
    let reference = probe(&device, &queue, 100);
    let mut target = DynamicCubemaps::new(config());

    assert!(matches!(
        target.setup(&device, &queue, &reference),
        Err(Error::InvalidReference {
            width: 100,
            height: 100,
            ..
        })
    ));

    assert!(target.resources().is_none());
}

#[test]
fn shading_views() {
    let (device, queue) = device_or_skip!();
    let reference = probe(&device, &queue, 256);
    let mut target = DynamicCubemaps::new(config());

    target.setup(&device, &queue, &reference).unwrap();

    let views = target.shading_views().unwrap();

    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let layout =
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("test_shading_layout"),
            entries: &ShadingViews::layout_entries(),
        });

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("test_shading"),
        layout: &layout,
        entries: &views.entries(),
    });

    assert!(pollster::block_on(device.pop_error_scope()).is_none());
    assert_eq!(256, target.resources().unwrap().size());
}
