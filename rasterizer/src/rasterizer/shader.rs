use crate::math_prelude::*;

/// Barycentric blending of per-vertex data.
///
/// `weights` holds one weight per vertex and sums to one for points inside
/// the triangle.
pub trait Interpolate {
    fn interpolate(v0: &Self, v1: &Self, v2: &Self, weights: Vec3) -> Self;
}

macro_rules! impl_interpolate {
    ($ty:ident) => {
        impl Interpolate for $ty {
            #[inline]
            fn interpolate(v0: &Self, v1: &Self, v2: &Self, weights: Vec3) -> Self {
                *v0 * weights.x + *v1 * weights.y + *v2 * weights.z
            }
        }
    };
}

impl_interpolate!(f32);
impl_interpolate!(Vec2);
impl_interpolate!(Vec3);
impl_interpolate!(Vec4);

/// World-space data carried by each triangle corner for lighting.
#[derive(Debug, Clone, Copy, Default, PartialEq, rasterizer_macros::Interpolate)]
pub struct SurfaceAttributes {
    pub position: Vec3,
    pub normal: Vec3,
    pub texcoord: Vec2,
}

/// A vertex after perspective divide and viewport mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenVertex {
    /// Pixel-space x and y, depth in z (smaller is nearer).
    pub position: Vec3,
    /// Reciprocal of the clip-space w, used for perspective correction.
    pub inv_w: f32,
}

impl ScreenVertex {
    pub fn new(position: Vec3, inv_w: f32) -> Self {
        Self { position, inv_w }
    }
}

/// A triangle ready for rasterization.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadedTriangle {
    pub vertices: [ScreenVertex; 3],
    pub attributes: [SurfaceAttributes; 3],
    /// Whether `attributes[..].texcoord` came from the model. Untextured
    /// triangles never sample maps.
    pub textured: bool,
}

/// The depth-test winner at a pixel with its interpolated surface data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub x: u32,
    pub y: u32,
    pub depth: f32,
    pub triangle: u32,
    pub position: Vec3,
    pub normal: Vec3,
    pub texcoord: Option<Vec2>,
}

pub trait FragmentShader: Send + Sync {
    /// Color of the fragment, channels in `[0, 255]`.
    fn shade(&self, fragment: &Fragment) -> Vec3;
}

impl<F> FragmentShader for F
where
    F: Fn(&Fragment) -> Vec3 + Send + Sync,
{
    fn shade(&self, fragment: &Fragment) -> Vec3 {
        self(fragment)
    }
}
