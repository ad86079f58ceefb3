use std::sync::atomic::{AtomicU64, Ordering};

/// The winning fragment recorded for a pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthSample {
    pub depth: f32,
    pub triangle: u32,
}

/// Per-pixel nearest-fragment record shared by all rasterization workers.
///
/// Each cell packs an order-preserving encoding of the depth in the high 32
/// bits and the triangle index in the low 32 bits, so a single atomic
/// `fetch_min` both tests and stores. Smaller depths are nearer; at equal
/// depth the lower triangle index wins, which keeps the outcome independent
/// of the order workers reach a pixel.
pub struct DepthBuffer {
    width: u32,
    height: u32,
    cells: Vec<AtomicU64>,
}

impl DepthBuffer {
    const EMPTY: u64 = u64::MAX;

    pub fn new(width: u32, height: u32) -> Self {
        let size = (width as usize) * (height as usize);
        let cells = (0..size).map(|_| AtomicU64::new(Self::EMPTY)).collect();
        Self {
            width,
            height,
            cells,
        }
    }

    /// Marks every pixel as "nothing drawn yet".
    pub fn reset(&mut self) {
        self.cells
            .iter_mut()
            .for_each(|cell| *cell.get_mut() = Self::EMPTY);
    }

    /// Records the fragment if it is strictly nearer than what the pixel holds.
    ///
    /// Returns `true` if the fragment won. NaN depths and coordinates outside
    /// the buffer never win.
    #[inline]
    pub fn test_and_set(&self, x: u32, y: u32, depth: f32, triangle: u32) -> bool {
        if depth.is_nan() || x >= self.width || y >= self.height {
            return false;
        }
        let key = pack(depth, triangle);
        let cell = &self.cells[self.coords_to_index(x, y)];
        cell.fetch_min(key, Ordering::AcqRel) > key
    }

    pub fn get(&self, x: u32, y: u32) -> Option<DepthSample> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.sample_at(self.coords_to_index(x, y))
    }

    pub fn depth(&self, x: u32, y: u32) -> Option<f32> {
        self.get(x, y).map(|sample| sample.depth)
    }

    pub(crate) fn sample_at(&self, index: usize) -> Option<DepthSample> {
        let key = self.cells[index].load(Ordering::Acquire);
        if key == Self::EMPTY {
            None
        } else {
            Some(unpack(key))
        }
    }

    fn coords_to_index(&self, x: u32, y: u32) -> usize {
        x as usize + y as usize * self.width as usize
    }
}

// Maps f32 bit patterns onto u32 so that integer order matches float order.
fn ordered_bits(depth: f32) -> u32 {
    let bits = depth.to_bits();
    if bits & 0x8000_0000 != 0 {
        !bits
    } else {
        bits | 0x8000_0000
    }
}

fn from_ordered_bits(bits: u32) -> f32 {
    if bits & 0x8000_0000 != 0 {
        f32::from_bits(bits & 0x7fff_ffff)
    } else {
        f32::from_bits(!bits)
    }
}

fn pack(depth: f32, triangle: u32) -> u64 {
    (u64::from(ordered_bits(depth)) << 32) | u64::from(triangle)
}

fn unpack(key: u64) -> DepthSample {
    DepthSample {
        depth: from_ordered_bits((key >> 32) as u32),
        triangle: key as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn ordered_bits_preserve_float_order() {
        let values = [
            f32::NEG_INFINITY,
            -1e30,
            -2.5,
            -0.0,
            0.0,
            1e-30,
            0.25,
            0.5,
            1.0,
            1e30,
            f32::INFINITY,
        ];
        for pair in values.windows(2) {
            assert!(ordered_bits(pair[0]) <= ordered_bits(pair[1]), "{pair:?}");
        }
        for value in values {
            assert_eq!(from_ordered_bits(ordered_bits(value)), value);
        }
    }

    #[test]
    fn nearer_fragments_win() {
        let buffer = DepthBuffer::new(2, 2);
        assert_eq!(buffer.get(1, 1), None);
        assert!(buffer.test_and_set(1, 1, 0.5, 3));
        assert!(!buffer.test_and_set(1, 1, 0.7, 4));
        assert!(buffer.test_and_set(1, 1, 0.2, 5));
        assert_eq!(
            buffer.get(1, 1),
            Some(DepthSample {
                depth: 0.2,
                triangle: 5
            })
        );
        assert_eq!(buffer.get(0, 0), None);
    }

    #[test]
    fn equal_depth_is_not_strictly_better() {
        let buffer = DepthBuffer::new(1, 1);
        assert!(buffer.test_and_set(0, 0, 0.5, 1));
        assert!(!buffer.test_and_set(0, 0, 0.5, 1));
        assert!(!buffer.test_and_set(0, 0, 0.5, 2));
        // Lower triangle index breaks depth ties.
        assert!(buffer.test_and_set(0, 0, 0.5, 0));
        assert_eq!(buffer.get(0, 0).map(|s| s.triangle), Some(0));
    }

    #[test]
    fn rejects_nan_and_out_of_bounds() {
        let buffer = DepthBuffer::new(2, 1);
        assert!(!buffer.test_and_set(0, 0, f32::NAN, 0));
        assert!(!buffer.test_and_set(2, 0, 0.1, 0));
        assert!(!buffer.test_and_set(0, 1, 0.1, 0));
        assert!(buffer.test_and_set(0, 0, f32::INFINITY, 0));
    }

    #[test]
    fn reset_clears_every_cell() {
        let mut buffer = DepthBuffer::new(3, 2);
        buffer.test_and_set(2, 1, 0.1, 0);
        buffer.test_and_set(0, 0, 0.1, 0);
        buffer.reset();
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(buffer.get(x, y), None);
            }
        }
    }

    #[test]
    fn concurrent_writers_keep_the_minimum() {
        let buffer = DepthBuffer::new(4, 4);
        let wins: usize = (0..1000u32)
            .into_par_iter()
            .map(|i| {
                let depth = ((i * 7919) % 1000) as f32 / 1000.0;
                (0..16u32)
                    .filter(|pixel| buffer.test_and_set(pixel % 4, pixel / 4, depth, i))
                    .count()
            })
            .sum();
        assert!(wins >= 16);
        for pixel in 0..16 {
            let sample = buffer.get(pixel % 4, pixel / 4).unwrap();
            assert_eq!(sample.depth, 0.0);
            assert_eq!(sample.triangle, 0);
        }
    }
}
