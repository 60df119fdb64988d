use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

use crate::{roughness, FILTER_SAMPLES};

/// Parameters of the capture kernel, one buffer per variant.
///
/// Positions stored in the capture are relative to the camera that took
/// them, so all matrices here are camera-relative (i.e. they don't contain
/// the camera's translation).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct CaptureParams {
    pub clip_from_world: Mat4,
    pub world_from_clip: Mat4,

    /// x, y, z - how far the camera has moved since the previous capture of
    /// this variant
    pub camera_delta: Vec4,

    /// x, y - size of the scene's render targets, in pixels
    pub screen: Vec4,
}

/// Parameters of the specular prefilter, one buffer per mip level.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct FilterParams {
    pub roughness: f32,
    pub sample_count: u32,
    pub _padding: [u32; 2],
}

impl FilterParams {
    pub fn new(level: u32) -> Self {
        Self {
            roughness: roughness(level),
            sample_count: FILTER_SAMPLES,
            _padding: Default::default(),
        }
    }
}
