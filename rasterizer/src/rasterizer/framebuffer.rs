use itertools::Itertools;

use crate::math_prelude::*;

/// Final colors of a frame, row-major with `(0, 0)` at the top left.
///
/// Channels are stored as floats in `[0, 255]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    pub(super) width: u32,
    pub(super) height: u32,
    pub(super) color: Vec<Vec3>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width as usize) * (height as usize);
        Self {
            width,
            height,
            color: vec![Vec3::ZERO; size],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear_color(&mut self, color: Vec3) {
        self.color.fill(color);
    }

    pub fn get_color(&self, x: u32, y: u32) -> Option<Vec3> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.color[self.coords_to_index(x, y)])
    }

    pub fn color(&self) -> impl Iterator<Item = (u32, u32, &Vec3)> {
        (0..self.height)
            .cartesian_product(0..self.width)
            .zip(&self.color)
            .map(|((y, x), c)| (x, y, c))
    }

    pub fn rows(&self) -> std::slice::Chunks<'_, Vec3> {
        self.color.chunks(self.width.max(1) as usize)
    }

    /// Packs the frame as 8-bit RGB, rounding and clamping each channel.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.color
            .iter()
            .flat_map(|c| c.to_array())
            .map(|channel| channel.round().clamp(0.0, 255.0) as u8)
            .collect()
    }

    fn coords_to_index(&self, x: u32, y: u32) -> usize {
        x as usize + y as usize * self.width as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_are_row_major() {
        let mut fb = Framebuffer::new(3, 2);
        fb.color[4] = Vec3::ONE;
        assert_eq!(fb.get_color(1, 1), Some(Vec3::ONE));
        assert_eq!(fb.get_color(3, 0), None);
        let lit: Vec<_> = fb.color().filter(|(_, _, c)| **c == Vec3::ONE).collect();
        assert_eq!(lit, vec![(1, 1, &Vec3::ONE)]);
        assert_eq!(fb.rows().count(), 2);
    }

    #[test]
    fn rgb8_rounds_and_clamps() {
        let mut fb = Framebuffer::new(2, 1);
        fb.clear_color(Vec3::new(127.6, -3.0, 300.0));
        fb.color[1] = Vec3::new(f32::NAN, 0.4, 254.5);
        assert_eq!(fb.to_rgb8(), vec![128, 0, 255, 0, 0, 255]);
    }
}
