use serde::{Deserialize, Serialize};

use super::fill::HoleFiller;
use super::mask::MaskImage;
use super::RoiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hemisphere {
    Left,
    Right,
}

/// Correspondence between one hemisphere's flattened image and its vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupTable {
    pub hemisphere: Hemisphere,
    /// `[height, width]` of the projected image.
    pub image_size: [usize; 2],
    pub num_vertices: usize,
    /// Row-major, one vertex index per pixel.
    pub pixel_to_vertex: Vec<usize>,
    /// One row-major pixel index per vertex.
    pub vertex_to_pixel: Vec<usize>,
    /// Pixels that lie outside the projected surface and only carry an
    /// extrapolated vertex. Empty means none.
    #[serde(default)]
    pub extrapolated: Vec<bool>,
}

impl LookupTable {
    pub fn height(&self) -> usize {
        self.image_size[0]
    }

    pub fn width(&self) -> usize {
        self.image_size[1]
    }

    pub fn pixel_count(&self) -> usize {
        self.height() * self.width()
    }

    fn is_extrapolated(&self, pixel: usize) -> bool {
        self.extrapolated.get(pixel).copied().unwrap_or(false)
    }

    pub fn validate(&self) -> Result<(), RoiError> {
        let pixels = self.pixel_count();
        if self.pixel_to_vertex.len() != pixels {
            return Err(RoiError::ImageSizeMismatch {
                expected: self.image_size,
                actual: [self.pixel_to_vertex.len() / self.width().max(1), self.width()],
            });
        }
        if !self.extrapolated.is_empty() && self.extrapolated.len() != pixels {
            return Err(RoiError::ImageSizeMismatch {
                expected: self.image_size,
                actual: [self.extrapolated.len() / self.width().max(1), self.width()],
            });
        }
        if self.vertex_to_pixel.len() != self.num_vertices {
            return Err(RoiError::VertexCountMismatch {
                expected: self.num_vertices,
                actual: self.vertex_to_pixel.len(),
            });
        }
        if let Some(&index) = self.pixel_to_vertex.iter().find(|v| **v >= self.num_vertices) {
            return Err(RoiError::LookupOutOfRange {
                hemisphere: self.hemisphere,
                index,
                len: self.num_vertices,
            });
        }
        if let Some(&index) = self.vertex_to_pixel.iter().find(|p| **p >= pixels) {
            return Err(RoiError::LookupOutOfRange {
                hemisphere: self.hemisphere,
                index,
                len: pixels,
            });
        }
        Ok(())
    }
}

/// Validated lookup tables placed side by side, left hemisphere first.
///
/// Vertex masks concatenate hemispheres in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct HemisphereLayout {
    tables: Vec<LookupTable>,
}

impl HemisphereLayout {
    pub fn new(mut tables: Vec<LookupTable>) -> Result<Self, RoiError> {
        if tables.is_empty() {
            return Err(RoiError::NoHemispheres);
        }
        tables.sort_by_key(|table| table.hemisphere);
        for pair in tables.windows(2) {
            if pair[0].hemisphere == pair[1].hemisphere {
                return Err(RoiError::DuplicateHemisphere(pair[0].hemisphere));
            }
            if pair[0].height() != pair[1].height() {
                return Err(RoiError::ImageSizeMismatch {
                    expected: pair[0].image_size,
                    actual: pair[1].image_size,
                });
            }
        }
        for table in &tables {
            table.validate()?;
        }
        Ok(Self { tables })
    }

    pub fn tables(&self) -> &[LookupTable] {
        &self.tables
    }

    /// `[height, width]` of the composite image.
    pub fn image_size(&self) -> [usize; 2] {
        let height = self.tables[0].height();
        let width = self.tables.iter().map(|t| t.width()).sum();
        [height, width]
    }

    pub fn num_vertices(&self) -> usize {
        self.tables.iter().map(|t| t.num_vertices).sum()
    }

    pub fn blank_image(&self) -> MaskImage {
        let [height, width] = self.image_size();
        MaskImage::new(width, height)
    }

    /// Column offset and vertex offset of each table in the composite.
    fn placements(&self) -> impl Iterator<Item = (&LookupTable, usize, usize)> + '_ {
        let mut column = 0;
        let mut vertex = 0;
        self.tables.iter().map(move |table| {
            let placed = (table, column, vertex);
            column += table.width();
            vertex += table.num_vertices;
            placed
        })
    }

    /// Vertex `v` is set iff its pixel in the hole-filled mask is set.
    pub fn image_to_vertices(
        &self,
        mask: &MaskImage,
        filler: &dyn HoleFiller,
    ) -> Result<Vec<bool>, RoiError> {
        if mask.size() != self.image_size() {
            return Err(RoiError::ImageSizeMismatch {
                expected: self.image_size(),
                actual: mask.size(),
            });
        }
        let filled = filler.fill_holes(mask);
        let mut vertices = Vec::with_capacity(self.num_vertices());
        for (table, column, _) in self.placements() {
            let width = table.width();
            for &pixel in &table.vertex_to_pixel {
                let y = pixel / width;
                let x = pixel - y * width;
                vertices.push(filled.get(column + x, y));
            }
        }
        tracing::debug!(
            "projected {} mask pixels onto {} of {} vertices",
            filled.count(),
            vertices.iter().filter(|v| **v).count(),
            vertices.len()
        );
        Ok(vertices)
    }

    /// Composite image where each surface pixel shows its vertex's mask value.
    pub fn vertices_to_image(&self, vertex_mask: &[bool]) -> Result<MaskImage, RoiError> {
        if vertex_mask.len() != self.num_vertices() {
            return Err(RoiError::VertexCountMismatch {
                expected: self.num_vertices(),
                actual: vertex_mask.len(),
            });
        }
        let mut image = self.blank_image();
        for (table, column, vertex_offset) in self.placements() {
            let width = table.width();
            for (pixel, &vertex) in table.pixel_to_vertex.iter().enumerate() {
                if table.is_extrapolated(pixel) || !vertex_mask[vertex_offset + vertex] {
                    continue;
                }
                let y = pixel / width;
                let x = pixel - y * width;
                image.set(column + x, y, true);
            }
        }
        Ok(image)
    }
}
