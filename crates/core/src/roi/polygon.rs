use super::mask::MaskImage;

/// Even-odd fill of a closed polygon given in pixel coordinates.
///
/// Pixel `(x, y)` is centered on `(x, y)` and is set when its center lies
/// inside the polygon. Fewer than three vertices produce an empty mask.
pub fn rasterize_polygon(vertices: &[[f64; 2]], width: usize, height: usize) -> MaskImage {
    let mut mask = MaskImage::new(width, height);
    if vertices.len() < 3 {
        return mask;
    }

    let mut crossings = Vec::new();
    for y in 0..height {
        let py = y as f64;
        crossings.clear();
        let mut prev = vertices[vertices.len() - 1];
        for &cur in vertices {
            let (a, b) = (prev, cur);
            prev = cur;
            if (a[1] > py) == (b[1] > py) {
                continue;
            }
            let t = (py - a[1]) / (b[1] - a[1]);
            crossings.push(a[0] + t * (b[0] - a[0]));
        }
        crossings.sort_by(|a, b| a.total_cmp(b));
        for span in crossings.chunks_exact(2) {
            let start = span[0].ceil().max(0.0);
            let end = span[1];
            if end < start {
                continue;
            }
            let first = start as usize;
            let last = (end.floor() as usize).min(width.saturating_sub(1));
            for x in first..=last {
                if (x as f64) < end {
                    mask.set(x, y, true);
                }
            }
        }
    }
    mask
}
