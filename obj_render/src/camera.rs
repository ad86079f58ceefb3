use std::f32::consts::{PI, TAU};

use rasterizer::math_prelude::*;
use rasterizer::FrameTransform;

/// Camera orbiting a target on the `z = 0` plane.
///
/// Setters reject values outside their range and report whether the camera
/// changed, so the caller knows when a new frame is needed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    polar: f32,
    azimuth: f32,
    radius: f32,
    offset_x: f32,
    offset_y: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            polar: Self::DEFAULT_POLAR,
            azimuth: 0.0,
            radius: Self::DEFAULT_RADIUS,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl OrbitCamera {
    pub const DEFAULT_POLAR: f32 = PI / 2.0;
    pub const DEFAULT_RADIUS: f32 = 150.0;
    pub const MIN_RADIUS: f32 = 55.0;
    pub const MAX_RADIUS: f32 = 1000.0;
    pub const MAX_OFFSET: f32 = 1000.0;

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn polar(&self) -> f32 {
        self.polar
    }

    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.offset_x, self.offset_y)
    }

    /// Polar angle in radians, measured from `+Y`. Must lie in `(0, π)`.
    pub fn set_polar(&mut self, polar: f32) -> bool {
        if polar > 0.0 && polar < PI {
            self.polar = polar;
            true
        } else {
            false
        }
    }

    /// Azimuth in radians, wrapped into `[0, 2π)`.
    pub fn set_azimuth(&mut self, azimuth: f32) -> bool {
        if !azimuth.is_finite() {
            return false;
        }
        // rem_euclid can round up to exactly TAU for tiny negative inputs.
        let wrapped = azimuth.rem_euclid(TAU);
        self.azimuth = if wrapped >= TAU { 0.0 } else { wrapped };
        true
    }

    pub fn set_radius(&mut self, radius: f32) -> bool {
        if (Self::MIN_RADIUS..Self::MAX_RADIUS).contains(&radius) {
            self.radius = radius;
            true
        } else {
            false
        }
    }

    pub fn set_offset_x(&mut self, x: f32) -> bool {
        if x.abs() < Self::MAX_OFFSET {
            self.offset_x = x;
            true
        } else {
            false
        }
    }

    pub fn set_offset_y(&mut self, y: f32) -> bool {
        if y.abs() < Self::MAX_OFFSET {
            self.offset_y = y;
            true
        } else {
            false
        }
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_azimuth, cos_azimuth) = self.azimuth.sin_cos();
        Vec3::new(
            self.radius * sin_polar * sin_azimuth + self.offset_x,
            self.radius * cos_polar + self.offset_y,
            self.radius * sin_polar * cos_azimuth,
        )
    }

    pub fn target(&self) -> Vec3 {
        Vec3::new(self.offset_x, self.offset_y, 0.0)
    }

    pub fn transform(&self, width: u32, height: u32) -> FrameTransform {
        FrameTransform::look_at(self.eye(), self.target(), width, height)
    }
}
