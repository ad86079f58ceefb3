use std::time::Duration;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameTime {
    time_geometry: Duration,
    time_rasterization: Duration,
    time_shading: Duration,
}

impl FrameTime {
    pub fn new(geometry: Duration, raster: Duration, shading: Duration) -> Self {
        Self {
            time_geometry: geometry,
            time_rasterization: raster,
            time_shading: shading,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn geometry_stage(&self) -> Duration {
        self.time_geometry
    }

    pub fn rasterization_stage(&self) -> Duration {
        self.time_rasterization
    }

    pub fn shading_stage(&self) -> Duration {
        self.time_shading
    }

    pub fn total(&self) -> Duration {
        self.geometry_stage() + self.rasterization_stage() + self.shading_stage()
    }
}

/// Work counters of the last rendered frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub faces_submitted: usize,
    /// Faces with a vertex on or behind the eye plane.
    pub faces_behind_eye: usize,
    /// Faces with a vertex closer than the near plane or beyond the far plane.
    pub faces_outside_depth_range: usize,
    pub triangles_back_facing: usize,
    pub triangles_degenerate: usize,
    /// Triangles with no pixel inside the viewport or beyond the guard band.
    pub triangles_offscreen: usize,
    pub fragments_tested: usize,
    pub fragments_won: usize,
    pub pixels_shaded: usize,
}
