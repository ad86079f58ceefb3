use crate::math_prelude::*;

use super::cube_map::CubeMap;
use super::map::{ColorMap, NormalMap, SpecularMap};
use super::shading::Materials;

/// Indices of one face corner into the model's attribute lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaceVertex {
    pub position: usize,
    pub texcoord: Option<usize>,
    pub normal: Option<usize>,
}

impl FaceVertex {
    pub fn new(position: usize, texcoord: Option<usize>, normal: Option<usize>) -> Self {
        Self {
            position,
            texcoord,
            normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub vertices: [FaceVertex; 3],
}

/// Axis-aligned bounds of a set of positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub min: Vec3,
    pub max: Vec3,
}

impl Dimensions {
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// A triangle mesh with its optional surface maps.
#[derive(Debug, Clone, Default)]
pub struct Model {
    /// Homogeneous positions; `w` is 1 unless the source said otherwise.
    pub positions: Vec<Vec4>,
    /// Texture coordinates, only `x` and `y` address maps.
    pub texcoords: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub faces: Vec<Face>,
    pub normal_map: Option<NormalMap>,
    pub diffuse_map: Option<ColorMap>,
    pub specular_map: Option<SpecularMap>,
    pub cube_map: Option<CubeMap>,
}

impl Model {
    pub fn materials(&self) -> Materials<'_> {
        Materials {
            normal_map: self.normal_map.as_ref(),
            diffuse_map: self.diffuse_map.as_ref(),
            specular_map: self.specular_map.as_ref(),
            cube_map: self.cube_map.as_ref(),
        }
    }

    /// Bounds of the positions, `None` for a model without vertices.
    pub fn dimensions(&self) -> Option<Dimensions> {
        let mut positions = self.positions.iter().map(|p| p.truncate());
        let first = positions.next()?;
        let (min, max) = positions.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Dimensions { min, max })
    }

    /// Moves the model's center to the origin and scales it uniformly so its
    /// largest extent equals `base_scale`.
    pub fn normalize(&mut self, base_scale: f32) {
        let Some(dimensions) = self.dimensions() else {
            return;
        };
        let center = dimensions.center();
        let extent = dimensions.size().max_element();
        let scale = if extent > f32::EPSILON {
            base_scale / extent
        } else {
            1.0
        };

        tracing::debug!(?center, extent, scale, "normalizing model");
        for position in self.positions.iter_mut() {
            let xyz = (position.truncate() - center) * scale;
            *position = xyz.extend(position.w);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(positions: &[[f32; 3]]) -> Model {
        Model {
            positions: positions
                .iter()
                .map(|p| Vec3::from_array(*p).extend(1.0))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn dimensions_cover_all_positions() {
        let m = model(&[[1.0, -2.0, 3.0], [-1.0, 4.0, 0.0], [0.0, 0.0, 5.0]]);
        let d = m.dimensions().unwrap();
        assert_eq!(d.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(d.max, Vec3::new(1.0, 4.0, 5.0));
        assert_eq!(d.size(), Vec3::new(2.0, 6.0, 5.0));
        assert_eq!(d.center(), Vec3::new(0.0, 1.0, 2.5));
        assert!(Model::default().dimensions().is_none());
    }

    #[test]
    fn normalize_centers_and_scales() {
        let mut m = model(&[[10.0, 10.0, 10.0], [12.0, 11.0, 10.0]]);
        m.normalize(100.0);
        assert_eq!(m.positions[0], Vec4::new(-50.0, -25.0, 0.0, 1.0));
        assert_eq!(m.positions[1], Vec4::new(50.0, 25.0, 0.0, 1.0));
    }

    #[test]
    fn normalize_single_point_only_recenters() {
        let mut m = model(&[[3.0, 4.0, 5.0]]);
        m.normalize(100.0);
        assert_eq!(m.positions[0], Vec4::new(0.0, 0.0, 0.0, 1.0));
    }
}
