use std::ops::Sub;

/// A screen-space position snapped to the sub-pixel grid.
///
/// Coordinates are in units of `1 / SUBPIXEL_SCALE` pixels, so edge functions
/// evaluated on them are exact integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub const SUBPIXEL_BITS: u32 = 8;
    pub const SUBPIXEL_SCALE: i64 = 1 << Self::SUBPIXEL_BITS;
    /// Vertices further than this many pixels from the origin are rejected so
    /// that edge function products stay within `i64`.
    pub const GUARD_BAND: f32 = (1 << 20) as f32;

    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Snaps a pixel-space position, or returns `None` when it is not finite
    /// or lies outside the guard band.
    pub fn snap(x: f32, y: f32) -> Option<Self> {
        let inrange = |v: f32| v.is_finite() && v.abs() <= Self::GUARD_BAND;
        if !inrange(x) || !inrange(y) {
            return None;
        }
        let scale = Self::SUBPIXEL_SCALE as f32;
        Some(Self::new(
            (x * scale).round() as i64,
            (y * scale).round() as i64,
        ))
    }

    /// The sample position of pixel `(x, y)`: its center.
    pub fn pixel_center(x: i32, y: i32) -> Self {
        let half = Self::SUBPIXEL_SCALE / 2;
        Self::new(
            x as i64 * Self::SUBPIXEL_SCALE + half,
            y as i64 * Self::SUBPIXEL_SCALE + half,
        )
    }

    /// 2D cross product `a.x * b.y - a.y * b.x`.
    pub fn perp_dot(a: Point, b: Point) -> i64 {
        a.x * b.y - a.y * b.x
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}
