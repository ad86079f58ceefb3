mod bounding_box;
mod cube_map;
mod depth_buffer;
mod error;
mod framebuffer;
mod frametime;
mod geometry;
mod map;
mod model;
mod point;
mod shader;
mod shading;
mod transform;
mod triangle;

use std::time::{Duration, Instant};

use rayon::prelude::*;

use bounding_box::BoundingBox;
use triangle::{Reject, TriangleSetup};

pub use cube_map::{CubeFace, CubeHit, CubeMap};
pub use depth_buffer::{DepthBuffer, DepthSample};
pub use error::RenderError;
pub use framebuffer::Framebuffer;
pub use frametime::{FrameStats, FrameTime};
pub use geometry::{assemble_triangles, Assembly, Culled};
pub use map::{ColorMap, Map, MapError, NormalMap, SpecularMap};
pub use model::{Dimensions, Face, FaceVertex, Model};
pub use shader::{
    Fragment, FragmentShader, Interpolate, ScreenVertex, ShadedTriangle, SurfaceAttributes,
};
pub use shading::{reflect, Materials, PhongShader, ShadingConfig};
pub use transform::{
    projection_matrix, view_matrix, viewport_matrix, FrameTransform, DEFAULT_FAR,
    DEFAULT_FOV_DEGREES, DEFAULT_NEAR,
};

use crate::math_prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Worker threads, `0` lets rayon decide.
    pub threads: usize,
    /// Color of pixels no triangle covers.
    pub background: Vec3,
    /// Interpolate surface attributes perspective-correctly. Depth is always
    /// interpolated linearly in screen space.
    pub perspective_correct: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            background: Vec3::ZERO,
            perspective_correct: true,
        }
    }
}

/// Software renderer owning the per-frame buffers and its worker pool.
///
/// A frame is rendered in three stages: geometry (transform and cull), a
/// rasterization pass where every covered pixel competes for the depth
/// buffer, and a shading pass that shades each pixel once from its winning
/// triangle. Only the shading pass writes colors, so the stored color always
/// belongs to the stored depth no matter how triangles were scheduled.
pub struct Rasterizer {
    framebuffer: Framebuffer,
    depth_buffer: DepthBuffer,
    pool: rayon::ThreadPool,
    config: RenderConfig,
    frame_time: FrameTime,
    stats: FrameStats,
}

impl Rasterizer {
    pub fn new(width: u32, height: u32, config: RenderConfig) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .thread_name(|index| format!("rasterizer-{index}"))
            .build()?;

        let mut framebuffer = Framebuffer::new(width, height);
        framebuffer.clear_color(config.background);

        Ok(Self {
            framebuffer,
            depth_buffer: DepthBuffer::new(width, height),
            pool,
            config,
            frame_time: FrameTime::zero(),
            stats: FrameStats::default(),
        })
    }

    /// Renders the model as seen through `transform`, shading with `shader`.
    pub fn render<S: FragmentShader>(
        &mut self,
        model: &Model,
        transform: &FrameTransform,
        shader: &S,
    ) -> Result<&Framebuffer, RenderError> {
        let start = Instant::now();
        let assembly = self
            .pool
            .install(|| geometry::assemble_triangles(model, transform));
        let geometry = start.elapsed();

        let stats = FrameStats {
            faces_submitted: model.faces.len(),
            faces_behind_eye: assembly.behind_eye,
            faces_outside_depth_range: assembly.outside_depth_range,
            ..Default::default()
        };
        if assembly.invalid > 0 {
            tracing::warn!(faces = assembly.invalid, "skipped faces with invalid indices");
        }
        self.rasterize(&assembly.triangles, shader, stats, geometry)?;
        Ok(&self.framebuffer)
    }

    /// Renders the model with the Phong lighting model, using the model's maps.
    pub fn render_phong(
        &mut self,
        model: &Model,
        transform: &FrameTransform,
        light_direction: Vec3,
        shading: &ShadingConfig,
    ) -> Result<&Framebuffer, RenderError> {
        let shader = PhongShader::new(
            shading.clone(),
            light_direction,
            transform.eye,
            model.materials(),
        );
        self.render(model, transform, &shader)
    }

    /// Rasterizes already assembled screen-space triangles.
    pub fn draw_triangles<S: FragmentShader>(
        &mut self,
        triangles: &[ShadedTriangle],
        shader: &S,
    ) -> Result<&Framebuffer, RenderError> {
        let stats = FrameStats {
            faces_submitted: triangles.len(),
            ..Default::default()
        };
        self.rasterize(triangles, shader, stats, Duration::ZERO)?;
        Ok(&self.framebuffer)
    }

    pub fn width(&self) -> u32 {
        self.framebuffer.width()
    }

    pub fn height(&self) -> u32 {
        self.framebuffer.height()
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn depth_buffer(&self) -> &DepthBuffer {
        &self.depth_buffer
    }

    pub fn frametime(&self) -> &FrameTime {
        &self.frame_time
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    fn rasterize<S: FragmentShader>(
        &mut self,
        triangles: &[ShadedTriangle],
        shader: &S,
        mut stats: FrameStats,
        geometry: Duration,
    ) -> Result<(), RenderError> {
        if u32::try_from(triangles.len()).is_err() {
            return Err(RenderError::TooManyTriangles(triangles.len()));
        }

        let start = Instant::now();
        self.depth_buffer.reset();
        let viewport = BoundingBox::screen(self.width(), self.height());
        let depth_buffer = &self.depth_buffer;

        let (setups, (tested, won)) = self.pool.install(|| {
            let setups: Vec<Result<TriangleSetup, Reject>> = triangles
                .par_iter()
                .map(|t| {
                    let [v0, v1, v2] = t.vertices;
                    TriangleSetup::new(v0.position, v1.position, v2.position, &viewport)
                })
                .collect();

            let counts = setups
                .par_iter()
                .enumerate()
                .filter_map(|(index, setup)| setup.as_ref().ok().map(|s| (index as u32, s)))
                .map(|(index, setup)| {
                    let (mut tested, mut won) = (0usize, 0usize);
                    setup.for_each_covered(|x, y, values| {
                        tested += 1;
                        let depth = setup.depth(setup.weights_from_values(values));
                        if depth_buffer.test_and_set(x as u32, y as u32, depth, index) {
                            won += 1;
                        }
                    });
                    (tested, won)
                })
                .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1));
            (setups, counts)
        });

        for (index, setup) in setups.iter().enumerate() {
            if let Err(reason) = setup {
                tracing::trace!(triangle = index, ?reason, "triangle rejected");
                match reason {
                    Reject::BackFacing => stats.triangles_back_facing += 1,
                    Reject::Degenerate => stats.triangles_degenerate += 1,
                    Reject::OutsideGuardBand | Reject::Offscreen => {
                        stats.triangles_offscreen += 1
                    }
                }
            }
        }
        stats.fragments_tested = tested;
        stats.fragments_won = won;
        let rasterization = start.elapsed();

        let start = Instant::now();
        let width = self.framebuffer.width() as usize;
        let background = self.config.background;
        let perspective_correct = self.config.perspective_correct;
        let color = &mut self.framebuffer.color;
        let depth_buffer = &self.depth_buffer;
        stats.pixels_shaded = self.pool.install(|| {
            color
                .par_chunks_mut(width)
                .enumerate()
                .map(|(y, row)| {
                    let mut shaded = 0usize;
                    for (x, pixel) in row.iter_mut().enumerate() {
                        let winner = depth_buffer.sample_at(x + y * width).and_then(|sample| {
                            let index = sample.triangle as usize;
                            let setup = setups.get(index)?.as_ref().ok()?;
                            Some(fragment(
                                &triangles[index],
                                setup,
                                x as u32,
                                y as u32,
                                sample,
                                perspective_correct,
                            ))
                        });
                        *pixel = match winner {
                            Some(fragment) => {
                                shaded += 1;
                                shader.shade(&fragment)
                            }
                            None => background,
                        };
                    }
                    shaded
                })
                .sum()
        });
        let shading = start.elapsed();

        self.frame_time = FrameTime::new(geometry, rasterization, shading);
        self.stats = stats;
        tracing::debug!(
            triangles = triangles.len(),
            fragments = stats.fragments_tested,
            pixels = stats.pixels_shaded,
            geometry = ?geometry,
            rasterization = ?rasterization,
            shading = ?shading,
            "frame rendered"
        );
        Ok(())
    }
}

fn fragment(
    triangle: &ShadedTriangle,
    setup: &TriangleSetup,
    x: u32,
    y: u32,
    sample: DepthSample,
    perspective_correct: bool,
) -> Fragment {
    let mut weights = setup.weights(x as i32, y as i32);
    if perspective_correct {
        weights = perspective_weights(weights, &triangle.vertices);
    }
    let [a0, a1, a2] = &triangle.attributes;
    let attributes = SurfaceAttributes::interpolate(a0, a1, a2, weights);
    Fragment {
        x,
        y,
        depth: sample.depth,
        triangle: sample.triangle,
        position: attributes.position,
        normal: attributes.normal,
        texcoord: triangle.textured.then_some(attributes.texcoord),
    }
}

// Screen-space weights reweighted by 1/w so attributes interpolate linearly
// in world space.
fn perspective_weights(weights: Vec3, vertices: &[ScreenVertex; 3]) -> Vec3 {
    let corrected = weights * Vec3::new(vertices[0].inv_w, vertices[1].inv_w, vertices[2].inv_w);
    let sum = corrected.x + corrected.y + corrected.z;
    if sum.is_finite() && sum.abs() > f32::EPSILON {
        corrected / sum
    } else {
        weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_targets() {
        assert!(matches!(
            Rasterizer::new(0, 10, RenderConfig::default()),
            Err(RenderError::InvalidDimensions {
                width: 0,
                height: 10
            })
        ));
    }

    #[test]
    fn perspective_weights_favor_the_nearer_vertex() {
        let vertices = [
            ScreenVertex::new(Vec3::ZERO, 1.0),
            ScreenVertex::new(Vec3::ZERO, 0.25),
            ScreenVertex::new(Vec3::ZERO, 0.25),
        ];
        let weights = perspective_weights(Vec3::new(0.5, 0.25, 0.25), &vertices);
        assert!((weights - Vec3::new(0.8, 0.1, 0.1)).abs().max_element() < 1e-6);

        let flat = [ScreenVertex::new(Vec3::ZERO, 0.0); 3];
        let weights = perspective_weights(Vec3::new(0.5, 0.25, 0.25), &flat);
        assert_eq!(weights, Vec3::new(0.5, 0.25, 0.25));
    }

    #[test]
    fn empty_frame_is_all_background() {
        let config = RenderConfig {
            threads: 2,
            background: Vec3::new(1.0, 2.0, 3.0),
            ..Default::default()
        };
        let mut rasterizer = Rasterizer::new(4, 3, config).unwrap();
        let shader = |_: &Fragment| Vec3::splat(255.0);
        let framebuffer = rasterizer.draw_triangles(&[], &shader).unwrap();
        assert!(framebuffer
            .color()
            .all(|(_, _, c)| *c == Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(rasterizer.stats().pixels_shaded, 0);
    }
}
