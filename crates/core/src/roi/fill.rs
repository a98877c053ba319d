use super::mask::MaskImage;

/// Closes enclosed background regions of a mask before projection.
pub trait HoleFiller {
    fn fill_holes(&self, mask: &MaskImage) -> MaskImage;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoFill;

impl HoleFiller for NoFill {
    fn fill_holes(&self, mask: &MaskImage) -> MaskImage {
        mask.clone()
    }
}

/// Background pixels not 4-connected to the image border become foreground.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloodFillHoles;

impl HoleFiller for FloodFillHoles {
    fn fill_holes(&self, mask: &MaskImage) -> MaskImage {
        let width = mask.width;
        let height = mask.height;
        let mut outside = vec![false; mask.pixels.len()];
        let mut stack = Vec::new();

        let push_if_background = |idx: usize, outside: &mut [bool], stack: &mut Vec<usize>| {
            if outside[idx] || mask.pixels[idx] {
                return;
            }
            outside[idx] = true;
            stack.push(idx);
        };

        for y in 0..height {
            for x in 0..width {
                if x != 0 && x + 1 != width && y != 0 && y + 1 != height {
                    continue;
                }
                push_if_background(mask.index(x, y), &mut outside, &mut stack);
            }
        }

        while let Some(idx) = stack.pop() {
            let y = idx / width;
            let x = idx - y * width;
            if x > 0 {
                push_if_background(idx - 1, &mut outside, &mut stack);
            }
            if x + 1 < width {
                push_if_background(idx + 1, &mut outside, &mut stack);
            }
            if y > 0 {
                push_if_background(idx - width, &mut outside, &mut stack);
            }
            if y + 1 < height {
                push_if_background(idx + width, &mut outside, &mut stack);
            }
        }

        MaskImage {
            width,
            height,
            pixels: outside.iter().map(|v| !*v).collect(),
        }
    }
}
