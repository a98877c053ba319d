use std::path::Path;

use serde::{Deserialize, Serialize};
use surfvol_core::roi::{
    DrawingSession, FloodFillHoles, HemisphereLayout, HoleFiller, InputEvent, LookupTable,
    MaskImage, NoFill, RoiDisplay,
};

use crate::headless::HeadlessArgs;

#[derive(Debug, Deserialize)]
struct RoiJob {
    tables: Vec<LookupTable>,
    /// Polygons replayed through a drawing session, in composite pixel coordinates.
    #[serde(default)]
    polygons: Vec<Vec<[f64; 2]>>,
    /// Vertices selected before any polygon is drawn.
    #[serde(default)]
    initial_vertices: Vec<usize>,
    #[serde(default = "default_fill_holes")]
    fill_holes: bool,
}

#[derive(Debug, Serialize)]
struct RoiResult {
    num_vertices: usize,
    selected: Vec<usize>,
}

/// Keeps the most recent composite so it can be written once the session ends.
#[derive(Default)]
struct LastFrame {
    composite: Option<MaskImage>,
}

impl RoiDisplay for LastFrame {
    fn show(&mut self, composite: &MaskImage, vertex_mask: &[bool]) {
        tracing::debug!(
            "roi redraw: {} pixels, {} vertices",
            composite.count(),
            vertex_mask.iter().filter(|v| **v).count()
        );
        self.composite = Some(composite.clone());
    }
}

pub(crate) fn run(job_path: &Path, args: &HeadlessArgs) -> Result<(), String> {
    let bytes = std::fs::read(job_path).map_err(|err| err.to_string())?;
    let job: RoiJob = serde_json::from_slice(&bytes).map_err(|err| err.to_string())?;
    let layout = HemisphereLayout::new(job.tables).map_err(|err| err.to_string())?;
    let filler: &dyn HoleFiller = if job.fill_holes {
        &FloodFillHoles
    } else {
        &NoFill
    };

    let initial = indices_to_mask(&job.initial_vertices, layout.num_vertices())?;
    let (vertex_mask, last_frame) = match &args.mask_path {
        Some(path) => {
            let mask = load_mask_png(path)?;
            let mut projected = layout
                .image_to_vertices(&mask, filler)
                .map_err(|err| err.to_string())?;
            for (dst, src) in projected.iter_mut().zip(&initial) {
                *dst |= *src;
            }
            (projected, None)
        }
        None => {
            let mut events = job
                .polygons
                .iter()
                .flat_map(|polygon| {
                    polygon
                        .iter()
                        .map(|p| InputEvent::Vertex(*p))
                        .chain(std::iter::once(InputEvent::Complete))
                })
                .chain(std::iter::once(InputEvent::Close));
            let mut frame = LastFrame::default();
            let vertex_mask = DrawingSession::new(&layout, filler)
                .with_vertex_mask(initial)
                .and_then(|session| session.run(&mut events, &mut frame))
                .map_err(|err| err.to_string())?;
            (vertex_mask, frame.composite)
        }
    };

    if let Some(path) = &args.preview_path {
        let composite = match last_frame {
            Some(composite) => composite,
            None => layout
                .vertices_to_image(&vertex_mask)
                .map_err(|err| err.to_string())?,
        };
        save_mask_png(&composite, path)?;
        tracing::info!("roi: wrote preview to {:?}", path);
    }

    let result = RoiResult {
        num_vertices: vertex_mask.len(),
        selected: (0..vertex_mask.len()).filter(|v| vertex_mask[*v]).collect(),
    };
    tracing::info!(
        "roi: {} of {} vertices selected",
        result.selected.len(),
        result.num_vertices
    );
    let json = serde_json::to_string_pretty(&result).map_err(|err| err.to_string())?;
    match &args.out_path {
        Some(path) => std::fs::write(path, json).map_err(|err| err.to_string()),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

fn default_fill_holes() -> bool {
    true
}

fn indices_to_mask(indices: &[usize], len: usize) -> Result<Vec<bool>, String> {
    let mut mask = vec![false; len];
    for &index in indices {
        let slot = mask
            .get_mut(index)
            .ok_or_else(|| format!("initial vertex {index} outside 0..{len}"))?;
        *slot = true;
    }
    Ok(mask)
}

/// Any non-zero luma counts as inside.
fn load_mask_png(path: &Path) -> Result<MaskImage, String> {
    let image = image::open(path).map_err(|err| err.to_string())?.to_luma8();
    let width = image.width() as usize;
    let height = image.height() as usize;
    let pixels = image.pixels().map(|p| p.0[0] > 0).collect();
    MaskImage::from_pixels(width, height, pixels)
        .ok_or_else(|| format!("mask {:?} has inconsistent dimensions", path))
}

fn save_mask_png(mask: &MaskImage, path: &Path) -> Result<(), String> {
    let image = image::GrayImage::from_fn(mask.width as u32, mask.height as u32, |x, y| {
        image::Luma([if mask.get(x as usize, y as usize) { 255 } else { 0 }])
    });
    image.save(path).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_roi_job_with_defaults() {
        let job: RoiJob = serde_json::from_str(
            r#"{
                "tables": [{
                    "hemisphere": "left",
                    "image_size": [1, 2],
                    "num_vertices": 2,
                    "pixel_to_vertex": [0, 1],
                    "vertex_to_pixel": [0, 1]
                }]
            }"#,
        )
        .expect("parse roi job");
        assert!(job.fill_holes);
        assert!(job.polygons.is_empty());
        assert!(job.tables[0].extrapolated.is_empty());
    }

    #[test]
    fn initial_vertices_are_bounds_checked() {
        assert_eq!(indices_to_mask(&[1], 3).unwrap(), vec![false, true, false]);
        assert!(indices_to_mask(&[3], 3).is_err());
    }
}
