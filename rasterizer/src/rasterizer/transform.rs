use crate::math_prelude::*;

pub const DEFAULT_FOV_DEGREES: f32 = 60.0;
pub const DEFAULT_NEAR: f32 = 1.0;
pub const DEFAULT_FAR: f32 = 1000.0;

/// Right-handed look-at matrix. `up` only needs to be roughly upwards; it is
/// re-orthogonalized against the view direction.
pub fn view_matrix(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let forward = (target - eye).normalize_or_zero();
    let up = forward.cross(up).cross(forward).normalize_or_zero();
    Mat4::look_at_rh(eye, target, up)
}

/// Perspective projection mapping view depth `[near, far]` onto `[0, 1]`.
pub fn projection_matrix(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh(fov_y_degrees.to_radians(), aspect, near, far)
}

/// Maps normalized device coordinates onto pixels: x from `[-1, 1]` to
/// `[0, width]`, y flipped so `+1` is the top row, depth kept as is.
pub fn viewport_matrix(width: u32, height: u32) -> Mat4 {
    let (w, h) = (width as f32, height as f32);
    Mat4::from_cols(
        Vec4::new(w / 2.0, 0.0, 0.0, 0.0),
        Vec4::new(0.0, -h / 2.0, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 1.0, 0.0),
        Vec4::new(w / 2.0, h / 2.0, 0.0, 1.0),
    )
}

/// Everything the pipeline needs to know about the camera for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransform {
    /// World space to clip space.
    pub view_projection: Mat4,
    /// Normalized device coordinates to pixel space.
    pub viewport: Mat4,
    pub eye: Vec3,
}

impl FrameTransform {
    pub fn new(view_projection: Mat4, viewport: Mat4, eye: Vec3) -> Self {
        Self {
            view_projection,
            viewport,
            eye,
        }
    }

    /// Camera at `eye` looking at `target` with `+Y` up and the default lens.
    pub fn look_at(eye: Vec3, target: Vec3, width: u32, height: u32) -> Self {
        let aspect = width as f32 / height.max(1) as f32;
        let projection = projection_matrix(DEFAULT_FOV_DEGREES, aspect, DEFAULT_NEAR, DEFAULT_FAR);
        let view = view_matrix(eye, target, Vec3::Y);
        Self::new(projection * view, viewport_matrix(width, height), eye)
    }
}
