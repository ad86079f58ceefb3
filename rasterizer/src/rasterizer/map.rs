use crate::math_prelude::*;

/// Map storing colors with channels in `[0, 255]`.
pub type ColorMap = Map<Vec3>;
/// Map storing surface normals, each component decoded into `[-1, 1]`.
pub type NormalMap = Map<Vec3>;
/// Map storing specular reflectance in `[0, 1]`.
pub type SpecularMap = Map<f32>;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MapError {
    #[error("map dimensions must be non zero, got {width}x{height}")]
    Empty { width: usize, height: usize },
    #[error("expected {expected} texels for the map dimensions, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// A rectangular grid of samples addressed by normalized coordinates.
///
/// Row `0` corresponds to `v = 0`. Sampling truncates `coordinate * dimension`
/// and clamps the resulting index to the edge texel, so coordinates outside
/// `[0, 1)` never index out of bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Map<T> {
    width: usize,
    height: usize,
    texels: Vec<T>,
}

impl<T: Copy> Map<T> {
    pub fn new(width: usize, height: usize, texels: Vec<T>) -> Result<Self, MapError> {
        if width == 0 || height == 0 {
            return Err(MapError::Empty { width, height });
        }
        let expected = width * height;
        if texels.len() != expected {
            return Err(MapError::SizeMismatch {
                expected,
                actual: texels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            texels,
        })
    }

    pub fn filled(width: usize, height: usize, value: T) -> Result<Self, MapError> {
        Self::new(width, height, vec![value; width * height])
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.texels[x + y * self.width])
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        if x < self.width && y < self.height {
            self.texels[x + y * self.width] = value;
        }
    }

    #[inline]
    pub fn sample(&self, u: f32, v: f32) -> T {
        let x = texel_index(u, self.width);
        let y = texel_index(v, self.height);
        self.texels[x + y * self.width]
    }

    #[inline]
    pub fn sample_uv(&self, uv: Vec2) -> T {
        self.sample(uv.x, uv.y)
    }
}

// `as` saturates and maps NaN to 0, the clamp handles the rest.
#[inline]
fn texel_index(coordinate: f32, dimension: usize) -> usize {
    let index = (coordinate * dimension as f32) as i64;
    index.clamp(0, dimension as i64 - 1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> Map<f32> {
        let texels = (0..16).map(|i| i as f32).collect();
        Map::new(4, 4, texels).unwrap()
    }

    #[test]
    fn sample_truncates_coordinates() {
        let map = gradient();
        assert_eq!(map.sample(0.0, 0.0), 0.0);
        assert_eq!(map.sample(0.26, 0.0), 1.0);
        assert_eq!(map.sample(0.5, 0.5), 10.0);
        assert_eq!(map.sample(0.99, 0.99), 15.0);
    }

    #[test]
    fn sample_clamps_out_of_range_coordinates() {
        let map = gradient();
        assert_eq!(map.sample(1.0, 1.0), 15.0);
        assert_eq!(map.sample(7.5, -3.0), 3.0);
        assert_eq!(map.sample(-0.2, 0.5), 8.0);
        assert_eq!(map.sample(f32::NAN, f32::INFINITY), 12.0);
        assert_eq!(map.sample(f32::NEG_INFINITY, 0.0), 0.0);
    }

    #[test]
    fn rejects_mismatched_texels() {
        assert_eq!(
            Map::new(2, 2, vec![0u8; 3]),
            Err(MapError::SizeMismatch {
                expected: 4,
                actual: 3
            })
        );
        assert_eq!(
            Map::<u8>::new(0, 2, vec![]),
            Err(MapError::Empty {
                width: 0,
                height: 2
            })
        );
    }

    #[test]
    fn set_ignores_out_of_bounds() {
        let mut map = Map::filled(2, 2, 0u8).unwrap();
        map.set(1, 1, 9);
        map.set(2, 0, 7);
        assert_eq!(map.get(1, 1), Some(9));
        assert_eq!(map.get(2, 0), None);
    }
}
