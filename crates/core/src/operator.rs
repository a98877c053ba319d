use glam::DVec3;

use crate::volume::{lattice_voxels, GridError};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSign {
    /// Ceiling corner.
    Plus,
    /// Floor corner.
    Minus,
}

impl AxisSign {
    /// Rounded lattice coordinate and the linear proximity `1 - residual`.
    pub fn corner(self, coord: f64) -> (f64, f64) {
        let (rounded, residual) = match self {
            AxisSign::Plus => {
                let rounded = coord.ceil();
                (rounded, rounded - coord)
            }
            AxisSign::Minus => {
                let rounded = coord.floor();
                (rounded, coord - rounded)
            }
        };
        (rounded, 1.0 - residual)
    }
}

/// The eight (x, y, z) sign combinations enumerated per point.
pub const CORNER_SIGNS: [[AxisSign; 3]; 8] = {
    use AxisSign::{Minus, Plus};
    [
        [Plus, Plus, Plus],
        [Plus, Plus, Minus],
        [Plus, Minus, Plus],
        [Plus, Minus, Minus],
        [Minus, Plus, Plus],
        [Minus, Plus, Minus],
        [Minus, Minus, Plus],
        [Minus, Minus, Minus],
    ]
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplatTriple {
    pub point: usize,
    pub voxel: usize,
    pub weight: f64,
}

/// One batch of triples for a single sign combination. Corners outside
/// `[1, side]` on any axis are skipped; the count of skipped corners is returned.
pub fn corner_batch(
    points: &[DVec3],
    side: u32,
    signs: [AxisSign; 3],
    out: &mut Vec<SplatTriple>,
) -> usize {
    let n = side as usize;
    let upper = side as f64;
    let mut dropped = 0;
    for (point, p) in points.iter().enumerate() {
        let (rx, wx) = signs[0].corner(p.x);
        let (ry, wy) = signs[1].corner(p.y);
        let (rz, wz) = signs[2].corner(p.z);
        let in_range = |r: f64| r >= 1.0 && r <= upper;
        if !(in_range(rx) && in_range(ry) && in_range(rz)) {
            dropped += 1;
            continue;
        }
        let x = rx as usize - 1;
        let y = ry as usize - 1;
        let z = rz as usize - 1;
        out.push(SplatTriple {
            point,
            voxel: z * n * n + y * n + x,
            weight: wx + wy + wz,
        });
    }
    dropped
}

/// Sparse `points x voxels` splatting operator in compressed-row form.
///
/// Row `m` holds the merged corner weights of point `m`, sorted by voxel index.
#[derive(Debug, Clone, PartialEq)]
pub struct SplatOperator {
    side: u32,
    voxels: usize,
    row_offsets: Vec<usize>,
    columns: Vec<usize>,
    weights: Vec<f64>,
}

impl SplatOperator {
    /// Merges triples, summing weights of repeated `(point, voxel)` pairs.
    pub fn from_triples(
        num_points: usize,
        side: u32,
        triples: &[SplatTriple],
    ) -> Result<Self, GridError> {
        let voxels = lattice_voxels(side)?;

        let mut counts = vec![0usize; num_points + 1];
        for triple in triples {
            counts[triple.point + 1] += 1;
        }
        for idx in 1..counts.len() {
            counts[idx] += counts[idx - 1];
        }
        let mut cursor = counts.clone();
        let mut bucketed = vec![(0usize, 0.0f64); triples.len()];
        for triple in triples {
            let slot = &mut cursor[triple.point];
            bucketed[*slot] = (triple.voxel, triple.weight);
            *slot += 1;
        }

        let mut row_offsets = Vec::with_capacity(num_points + 1);
        let mut columns = Vec::with_capacity(triples.len());
        let mut weights = Vec::with_capacity(triples.len());
        row_offsets.push(0);
        for point in 0..num_points {
            let row = &mut bucketed[counts[point]..counts[point + 1]];
            row.sort_by_key(|(voxel, _)| *voxel);
            for &(voxel, weight) in row.iter() {
                if columns.len() > row_offsets[point] && columns.last() == Some(&voxel) {
                    if let Some(last) = weights.last_mut() {
                        *last += weight;
                    }
                } else {
                    columns.push(voxel);
                    weights.push(weight);
                }
            }
            row_offsets.push(columns.len());
        }

        Ok(Self {
            side,
            voxels,
            row_offsets,
            columns,
            weights,
        })
    }

    pub fn side(&self) -> u32 {
        self.side
    }

    pub fn num_points(&self) -> usize {
        self.row_offsets.len() - 1
    }

    pub fn num_voxels(&self) -> usize {
        self.voxels
    }

    pub fn nnz(&self) -> usize {
        self.columns.len()
    }

    /// `(voxel, weight)` entries of one point.
    pub fn row(&self, point: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.row_offsets[point]..self.row_offsets[point + 1];
        self.columns[range.clone()]
            .iter()
            .copied()
            .zip(self.weights[range].iter().copied())
    }

    pub fn entries(&self) -> impl Iterator<Item = SplatTriple> + '_ {
        (0..self.num_points()).flat_map(move |point| {
            self.row(point).map(move |(voxel, weight)| SplatTriple {
                point,
                voxel,
                weight,
            })
        })
    }

    /// Accumulates `row_values x operator` into `out` (length `num_voxels`).
    pub fn scatter_into(&self, row_values: &[f64], out: &mut [f64]) {
        for (point, value) in row_values.iter().enumerate().take(self.num_points()) {
            if *value == 0.0 {
                continue;
            }
            for (voxel, weight) in self.row(point) {
                out[voxel] += value * weight;
            }
        }
    }

    /// `ones(1, M) x operator`: total incoming weight per voxel.
    pub fn weight_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.voxels];
        for (voxel, weight) in self.columns.iter().zip(&self.weights) {
            sums[*voxel] += weight;
        }
        sums
    }
}

/// Builds the splatting operator for points already in one-based voxel space.
pub fn build_operator(points: &[DVec3], side: u32) -> Result<SplatOperator, GridError> {
    lattice_voxels(side)?;
    let mut triples = Vec::with_capacity(points.len() * CORNER_SIGNS.len());
    let mut dropped = 0;
    for signs in CORNER_SIGNS {
        dropped += corner_batch(points, side, signs, &mut triples);
    }
    let operator = SplatOperator::from_triples(points.len(), side, &triples)?;
    tracing::debug!(
        "splat operator: {} points, {} triples, {} entries, {} corners outside grid",
        points.len(),
        triples.len(),
        operator.nnz(),
        dropped
    );
    Ok(operator)
}
