use crate::math_prelude::*;

use super::bounding_box::BoundingBox;
use super::point::Point;

/// Why a triangle never reaches the pixel loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reject {
    BackFacing,
    Degenerate,
    OutsideGuardBand,
    Offscreen,
}

/// One edge function `w(P) = perp_dot(A - P, B - P)`, tabulated for a pixel grid.
#[derive(Debug, Clone, Copy)]
struct Edge {
    a: Point,
    b: Point,
    step_x: i64,
    step_y: i64,
    /// Pixels lying exactly on this edge belong to the triangle.
    owner: bool,
}

impl Edge {
    fn new(a: Point, b: Point) -> Self {
        let e = a - b;
        Self {
            a,
            b,
            step_x: (a.y - b.y) * Point::SUBPIXEL_SCALE,
            step_y: (b.x - a.x) * Point::SUBPIXEL_SCALE,
            owner: e.y > 0 || (e.y == 0 && e.x < 0),
        }
    }

    fn at(&self, p: Point) -> i64 {
        Point::perp_dot(self.a - p, self.b - p)
    }

    #[inline]
    fn includes(&self, value: i64) -> bool {
        value > 0 || (value == 0 && self.owner)
    }
}

/// Screen-space triangle prepared for coverage tests.
///
/// Edge `i` is the edge opposite vertex `i`; its value divided by the doubled
/// area is the barycentric weight of vertex `i`. Front-facing triangles have
/// a positive doubled area.
#[derive(Debug, Clone)]
pub struct TriangleSetup {
    edges: [Edge; 3],
    area: i64,
    depths: Vec3,
    bounds: BoundingBox,
}

impl TriangleSetup {
    pub fn new(
        v0: Vec3,
        v1: Vec3,
        v2: Vec3,
        viewport: &BoundingBox,
    ) -> Result<Self, Reject> {
        let snap = |v: Vec3| Point::snap(v.x, v.y).ok_or(Reject::OutsideGuardBand);
        let points = [snap(v0)?, snap(v1)?, snap(v2)?];

        let area = Point::perp_dot(points[2] - points[0], points[1] - points[0]);
        if area == 0 {
            return Err(Reject::Degenerate);
        }
        if area < 0 {
            return Err(Reject::BackFacing);
        }

        let (min_x, max_x) = (v0.x.min(v1.x).min(v2.x), v0.x.max(v1.x).max(v2.x));
        let (min_y, max_y) = (v0.y.min(v1.y).min(v2.y), v0.y.max(v1.y).max(v2.y));
        let bounds = BoundingBox::from_extent(min_x, min_y, max_x, max_y)
            .overlap(viewport)
            .ok_or(Reject::Offscreen)?;

        let edge = |i: usize| Edge::new(points[(i + 2) % 3], points[(i + 1) % 3]);
        Ok(Self {
            edges: [edge(0), edge(1), edge(2)],
            area,
            depths: Vec3::new(v0.z, v1.z, v2.z),
            bounds,
        })
    }

    pub fn edge_values(&self, x: i32, y: i32) -> [i64; 3] {
        let p = Point::pixel_center(x, y);
        [
            self.edges[0].at(p),
            self.edges[1].at(p),
            self.edges[2].at(p),
        ]
    }

    pub fn covers_values(&self, values: &[i64; 3]) -> bool {
        self.edges
            .iter()
            .zip(values)
            .all(|(edge, &value)| edge.includes(value))
    }

    /// Screen-space barycentric weights for the given edge values.
    pub fn weights_from_values(&self, values: &[i64; 3]) -> Vec3 {
        let area = self.area as f64;
        Vec3::new(
            (values[0] as f64 / area) as f32,
            (values[1] as f64 / area) as f32,
            (values[2] as f64 / area) as f32,
        )
    }

    pub fn weights(&self, x: i32, y: i32) -> Vec3 {
        self.weights_from_values(&self.edge_values(x, y))
    }

    /// Depth linearly interpolated in screen space.
    pub fn depth(&self, weights: Vec3) -> f32 {
        self.depths.dot(weights)
    }

    /// Visits every covered pixel of the bounding box with its edge values.
    ///
    /// Edge values are stepped incrementally; integer arithmetic keeps them
    /// identical to evaluating each pixel from scratch.
    pub fn for_each_covered<F>(&self, mut f: F)
    where
        F: FnMut(i32, i32, &[i64; 3]),
    {
        let bounds = &self.bounds;
        let mut row = self.edge_values(bounds.x(), bounds.y());
        for y in bounds.rows() {
            let mut values = row;
            for x in bounds.columns() {
                if self.covers_values(&values) {
                    f(x, y, &values);
                }
                for (value, edge) in values.iter_mut().zip(&self.edges) {
                    *value += edge.step_x;
                }
            }
            for (value, edge) in row.iter_mut().zip(&self.edges) {
                *value += edge.step_y;
            }
        }
    }
}
