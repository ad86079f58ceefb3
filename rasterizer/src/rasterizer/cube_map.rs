use crate::math_prelude::*;

use super::map::ColorMap;
use super::shading::reflect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    /// All faces, in the order used to break ties between equally distant hits.
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn axis(self) -> usize {
        match self {
            CubeFace::PositiveX | CubeFace::NegativeX => 0,
            CubeFace::PositiveY | CubeFace::NegativeY => 1,
            CubeFace::PositiveZ | CubeFace::NegativeZ => 2,
        }
    }

    fn sign(self) -> f32 {
        match self {
            CubeFace::PositiveX | CubeFace::PositiveY | CubeFace::PositiveZ => 1.0,
            _ => -1.0,
        }
    }

    // Face orientation: maps a point on the face plane (already divided by
    // the cube edge length) into the face texture's [0,1]x[0,1] domain.
    fn texture_coords(self, p: Vec3) -> Vec2 {
        match self {
            CubeFace::PositiveX => Vec2::new(0.5 - p.z, 0.5 + p.y),
            CubeFace::NegativeX => Vec2::new(0.5 + p.z, 0.5 + p.y),
            CubeFace::PositiveY => Vec2::new(0.5 - p.x, 0.5 + p.z),
            CubeFace::NegativeY => Vec2::new(0.5 - p.x, 0.5 - p.z),
            CubeFace::PositiveZ => Vec2::new(0.5 + p.x, 0.5 + p.y),
            CubeFace::NegativeZ => Vec2::new(0.5 - p.x, 0.5 + p.y),
        }
    }
}

/// Where a ray leaves the environment cube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeHit {
    pub face: CubeFace,
    pub distance: f32,
    pub texture_coords: Vec2,
}

/// Six-sided environment used for reflection lookups.
#[derive(Debug, Clone)]
pub struct CubeMap {
    faces: [ColorMap; 6],
    half_extent: f32,
}

impl CubeMap {
    pub const DEFAULT_HALF_EXTENT: f32 = 1000.0;
    /// Ray components smaller than this never intersect the planes of their axis.
    pub const AXIS_EPSILON: f32 = 1e-6;

    pub fn new(
        positive_x: ColorMap,
        negative_x: ColorMap,
        positive_y: ColorMap,
        negative_y: ColorMap,
        positive_z: ColorMap,
        negative_z: ColorMap,
    ) -> Self {
        Self {
            faces: [
                positive_x, negative_x, positive_y, negative_y, positive_z, negative_z,
            ],
            half_extent: Self::DEFAULT_HALF_EXTENT,
        }
    }

    pub fn with_half_extent(mut self, half_extent: f32) -> Self {
        self.half_extent = half_extent;
        self
    }

    pub fn face(&self, face: CubeFace) -> &ColorMap {
        &self.faces[face.index()]
    }

    /// Color of the environment seen from `eye` mirrored at `point` about `normal`.
    ///
    /// Returns `None` when the reflection direction is degenerate or the ray
    /// never reaches the cube.
    pub fn reflected_color(&self, point: Vec3, normal: Vec3, eye: Vec3) -> Option<Vec3> {
        let to_eye = (eye - point).normalize_or_zero();
        let normal = normal.normalize_or_zero();
        let direction = reflect(to_eye, normal).normalize_or_zero();
        self.sample_ray(point, direction)
    }

    pub fn sample_ray(&self, origin: Vec3, direction: Vec3) -> Option<Vec3> {
        let hit = self.intersect(origin, direction)?;
        Some(
            self.face(hit.face)
                .sample(hit.texture_coords.x, hit.texture_coords.y),
        )
    }

    /// Nearest positive-distance intersection of the ray with the cube planes.
    pub fn intersect(&self, origin: Vec3, direction: Vec3) -> Option<CubeHit> {
        let mut nearest: Option<(CubeFace, f32)> = None;
        for face in CubeFace::ALL {
            let distance = self.plane_distance(face, origin, direction);
            if !distance.is_finite() {
                continue;
            }
            match nearest {
                Some((_, best)) if best <= distance => {}
                _ => nearest = Some((face, distance)),
            }
        }

        let (face, distance) = nearest?;
        let hit = origin + direction * distance;
        Some(CubeHit {
            face,
            distance,
            texture_coords: face.texture_coords(hit / (2.0 * self.half_extent)),
        })
    }

    // +inf when the ray runs parallel to the plane or the plane lies behind it.
    fn plane_distance(&self, face: CubeFace, origin: Vec3, direction: Vec3) -> f32 {
        let axis = face.axis();
        let d = direction[axis];
        if d.abs() < Self::AXIS_EPSILON {
            return f32::INFINITY;
        }
        let t = (face.sign() * self.half_extent - origin[axis]) / d;
        if t < 0.0 {
            f32::INFINITY
        } else {
            t
        }
    }
}
