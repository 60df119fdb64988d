use std::mem;

use dynamic_cubemaps_gpu::{tile_workgroups, CubeFace, CUBE_FACES};
use glam::Vec3;
use log::trace;

use super::StageContext;
use crate::{Frame, KernelKind, Result, Variant, VariantResources};

/// Accumulates the current frame into the variant's capture.
///
/// Returns the camera position the capture was taken from, to be passed as
/// `previous` to the next capture of this variant.
pub fn capture(
    ctx: &mut StageContext,
    variant: Variant,
    frame: &Frame,
    reset: &mut bool,
    previous: Option<Vec3>,
) -> Result<Vec3> {
    let kernel = ctx.kernel(KernelKind::update(variant))?;
    let resources = ctx.resources;
    let targets = resources.variant(variant);
    let size = resources.size();

    trace!(
        "Capturing `{}`; reset={reset}, {}",
        variant.name(),
        frame.camera.describe()
    );

    // A reset also forgets the previous position, so the first capture after
    // it doesn't try to reproject anything
    let previous = if mem::take(reset) {
        clear(ctx.encoder, variant, targets);
        None
    } else {
        previous
    };

    let history = [
        (targets.capture_raw(), resources.history_raw()),
        (targets.capture_position(), resources.history_position()),
    ];

    for (source, destination) in history {
        ctx.encoder.copy_texture_to_texture(
            source.texture().as_image_copy(),
            destination.texture().as_image_copy(),
            wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: CUBE_FACES,
            },
        );
    }

    targets
        .params()
        .write(ctx.queue, &frame.camera.serialize(previous));

    let frame_bind_group =
        frame.bind_group(ctx.device, &resources.layouts().frame);

    let tiles = tile_workgroups(size);

    ctx.dispatch(
        &format!("{}_capture", variant.name()),
        &kernel,
        &[&resources.bind_groups(variant).capture, &frame_bind_group],
        (tiles, tiles, CUBE_FACES),
    );

    Ok(frame.camera.position)
}

fn clear(
    encoder: &mut wgpu::CommandEncoder,
    variant: Variant,
    targets: &VariantResources,
) {
    for face in CubeFace::ALL {
        let label = format!(
            "dynamic_cubemaps_{}_clear_{}",
            variant.name(),
            face.name()
        );

        let attachments = targets.capture_targets().map(|target| {
            Some(wgpu::RenderPassColorAttachment {
                view: target.face(face),
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })
        });

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(&label),
            color_attachments: &attachments,
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
    }
}
