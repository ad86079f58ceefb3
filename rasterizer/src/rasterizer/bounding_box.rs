/// An inclusive-exclusive rectangle of pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BoundingBox {
    x: i32,
    y: i32,
    w: i32,
    h: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            x,
            y,
            w: w.max(0),
            h: h.max(0),
        }
    }

    /// The whole image.
    pub fn screen(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    /// Smallest box containing every pixel whose center may lie inside the
    /// given pixel-space extent.
    pub fn from_extent(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        let left = min_x.floor() as i32;
        let top = min_y.floor() as i32;
        let right = max_x.ceil() as i32;
        let bottom = max_y.ceil() as i32;
        Self::new(left, top, right - left + 1, bottom - top + 1)
    }

    pub fn x(&self) -> i32 {
        self.x
    }
    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn overlap(&self, other: &BoundingBox) -> Option<BoundingBox> {
        let maxl = self.x.max(other.x);
        let minr = (self.x + self.w).min(other.x + other.w);
        if minr <= maxl {
            return None;
        }

        let maxt = self.y.max(other.y);
        let minb = (self.y + self.h).min(other.y + other.h);
        if minb <= maxt {
            return None;
        }

        Some(BoundingBox::new(maxl, maxt, minr - maxl, minb - maxt))
    }

    pub fn rows(&self) -> std::ops::Range<i32> {
        self.y..(self.y + self.h)
    }

    pub fn columns(&self) -> std::ops::Range<i32> {
        self.x..(self.x + self.w)
    }
}
