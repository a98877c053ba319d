use serde::{Deserialize, Serialize};

/// Row-major binary image, `width` columns by `height` rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<bool>,
}

impl MaskImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![false; width * height],
        }
    }

    pub fn from_pixels(width: usize, height: usize, pixels: Vec<bool>) -> Option<Self> {
        (pixels.len() == width * height).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// `[height, width]`, the order used in size errors.
    pub fn size(&self) -> [usize; 2] {
        [self.height, self.width]
    }

    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.pixels[self.index(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.pixels[idx] = value;
        }
    }

    pub fn count(&self) -> usize {
        self.pixels.iter().filter(|p| **p).count()
    }

    pub fn union_with(&mut self, other: &MaskImage) {
        for (dst, src) in self.pixels.iter_mut().zip(&other.pixels) {
            *dst |= *src;
        }
    }
}
