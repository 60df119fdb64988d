use dynamic_cubemaps_gpu as gpu;
use glam::{Mat4, UVec2, Vec3};

/// Camera that rendered the frame being captured.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// Eye position, in world-space
    pub position: Vec3,

    /// Projection multiplied by the view's rotation, i.e. the regular
    /// view-projection matrix without the camera's translation
    pub clip_from_view: Mat4,

    /// Size of the frame's depth and color targets
    pub screen: UVec2,
}

impl Camera {
    pub fn new(position: Vec3, clip_from_view: Mat4, screen: UVec2) -> Self {
        Self {
            position,
            clip_from_view,
            screen,
        }
    }

    /// Creates a perspective camera at `position`, looking in `forward`.
    pub fn perspective(
        position: Vec3,
        forward: Vec3,
        up: Vec3,
        fov_y: f32,
        screen: UVec2,
    ) -> Self {
        let aspect = screen.x as f32 / screen.y.max(1) as f32;
        let projection = Mat4::perspective_rh(fov_y, aspect, 0.1, 10_000.0);
        let view = Mat4::look_to_rh(Vec3::ZERO, forward, up);

        Self::new(position, projection * view, screen)
    }

    /// Prepares the capture kernel's parameters; `previous` is where the
    /// camera stood during the previous capture of the same variant.
    pub fn serialize(&self, previous: Option<Vec3>) -> gpu::CaptureParams {
        let delta = previous.map_or(Vec3::ZERO, |previous| {
            self.position - previous
        });

        gpu::CaptureParams {
            clip_from_world: self.clip_from_view,
            world_from_clip: self.clip_from_view.inverse(),
            camera_delta: delta.extend(0.0),
            screen: self.screen.as_vec2().extend(0.0).extend(0.0),
        }
    }

    pub fn describe(&self) -> String {
        format!(
            "position={}, screen={}x{}",
            self.position, self.screen.x, self.screen.y
        )
    }
}
