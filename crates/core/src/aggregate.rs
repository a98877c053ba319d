use std::fmt;

use glam::DVec3;

use crate::operator::{build_operator, SplatOperator};
use crate::parallel;
use crate::volume::{try_alloc_f64, GridError, VoxelGrid};
use crate::voxel_space::TransformError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateMode {
    /// Per-voxel weighted average of every dataset.
    Continuous,
    /// Winner-take-all over labels `1..=channels` of a single dataset.
    Categorical { channels: u32 },
}

impl AggregateMode {
    /// `0` selects continuous mode, `N > 0` selects `N` categorical channels.
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => AggregateMode::Continuous,
            channels => AggregateMode::Categorical { channels },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AggregateError {
    CategoricalNeedsSingleDataset { datasets: usize },
    PointCountMismatch { expected: usize, actual: usize },
    ZeroChannels,
    Grid(GridError),
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateError::CategoricalNeedsSingleDataset { datasets } => write!(
                f,
                "categorical aggregation needs exactly one dataset, got {datasets}"
            ),
            AggregateError::PointCountMismatch { expected, actual } => write!(
                f,
                "data has {actual} values per dataset but the operator has {expected} points"
            ),
            AggregateError::ZeroChannels => {
                write!(f, "categorical aggregation needs at least one channel")
            }
            AggregateError::Grid(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for AggregateError {}

impl From<GridError> for AggregateError {
    fn from(err: GridError) -> Self {
        AggregateError::Grid(err)
    }
}

/// `datasets x points` matrix stored one dataset row after another.
#[derive(Debug, Clone, PartialEq)]
pub struct PointData {
    datasets: usize,
    points: usize,
    values: Vec<f64>,
}

impl PointData {
    pub fn single(values: Vec<f64>) -> Self {
        Self {
            datasets: 1,
            points: values.len(),
            values,
        }
    }

    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, AggregateError> {
        let points = rows.first().map(|row| row.len()).unwrap_or(0);
        let mut values = Vec::with_capacity(points * rows.len());
        for row in rows {
            if row.len() != points {
                return Err(AggregateError::PointCountMismatch {
                    expected: points,
                    actual: row.len(),
                });
            }
            values.extend_from_slice(row);
        }
        Ok(Self {
            datasets: rows.len(),
            points,
            values,
        })
    }

    pub fn datasets(&self) -> usize {
        self.datasets
    }

    pub fn points(&self) -> usize {
        self.points
    }

    pub fn row(&self, dataset: usize) -> &[f64] {
        &self.values[dataset * self.points..(dataset + 1) * self.points]
    }
}

impl SplatOperator {
    /// `data x operator`: one `num_voxels` block per dataset.
    pub fn apply(&self, data: &PointData) -> Result<Vec<f64>, AggregateError> {
        let voxels = self.num_voxels();
        let mut raw = try_alloc_f64(data.datasets() * voxels, 0.0)?;
        parallel::for_each_chunk_mut(&mut raw, voxels, |dataset, block| {
            self.scatter_into(data.row(dataset), block);
        });
        Ok(raw)
    }
}

/// Resamples per-point data onto the operator's lattice.
///
/// Voxels whose accumulated weight is exactly zero receive `empty_value`.
pub fn aggregate(
    data: &PointData,
    operator: &SplatOperator,
    empty_value: f64,
    mode: AggregateMode,
) -> Result<VoxelGrid, AggregateError> {
    if let AggregateMode::Categorical { channels } = mode {
        if data.datasets() != 1 {
            return Err(AggregateError::CategoricalNeedsSingleDataset {
                datasets: data.datasets(),
            });
        }
        if channels == 0 {
            return Err(AggregateError::ZeroChannels);
        }
    }
    if data.datasets() > 0 && data.points() != operator.num_points() {
        return Err(AggregateError::PointCountMismatch {
            expected: operator.num_points(),
            actual: data.points(),
        });
    }

    let grid = match mode {
        AggregateMode::Continuous => weighted_average(data, operator, empty_value)?,
        AggregateMode::Categorical { channels } => {
            winner_take_all(data.row(0), channels, operator, empty_value)?
        }
    };
    let occupied: Vec<usize> = (0..grid.datasets).map(|d| grid.occupied_count(d)).collect();
    tracing::debug!(
        "aggregate {:?}: {} datasets, occupied voxels per dataset {:?} of {}",
        mode,
        grid.datasets,
        occupied,
        grid.voxel_count()
    );
    Ok(grid)
}

fn weighted_average(
    data: &PointData,
    operator: &SplatOperator,
    empty_value: f64,
) -> Result<VoxelGrid, AggregateError> {
    let voxels = operator.num_voxels();
    let weight_sums = operator.weight_sums();
    let mut grid = VoxelGrid::filled(operator.side(), data.datasets(), empty_value)?;
    let raw = operator.apply(data)?;
    parallel::for_each_indexed_mut(&mut grid.values, |idx, slot| {
        let weight = weight_sums[idx % voxels];
        if weight != 0.0 {
            *slot = raw[idx] / weight;
        }
    });
    Ok(grid)
}

fn winner_take_all(
    labels: &[f64],
    channels: u32,
    operator: &SplatOperator,
    empty_value: f64,
) -> Result<VoxelGrid, AggregateError> {
    let voxels = operator.num_voxels();
    let mut labeled: Vec<(u32, usize)> = labels
        .iter()
        .enumerate()
        .filter(|(_, label)| label.fract() == 0.0 && **label >= 1.0 && **label <= channels as f64)
        .map(|(point, label)| (*label as u32, point))
        .collect();
    let ignored = labels.len() - labeled.len();
    if ignored > 0 {
        tracing::debug!(
            "winner-take-all: {} points carry no label in 1..={}",
            ignored,
            channels
        );
    }
    labeled.sort_by_key(|(channel, _)| *channel);

    // Running arg-max: channels are scattered one at a time, in ascending
    // order, into `scratch`; a voxel only changes winner on a strictly larger
    // weight, so the lowest channel wins ties.
    let mut scratch = try_alloc_f64(voxels, 0.0)?;
    let mut leader: Vec<(f64, u32)> = Vec::new();
    leader
        .try_reserve_exact(voxels)
        .map_err(|_| GridError::Allocation { len: voxels })?;
    leader.resize(voxels, (0.0, 0));
    for group in labeled.chunk_by(|a, b| a.0 == b.0) {
        let channel = group[0].0;
        for &(_, point) in group {
            for (voxel, weight) in operator.row(point) {
                scratch[voxel] += weight;
            }
        }
        let channel_weights = &scratch;
        parallel::for_each_indexed_mut(&mut leader, |voxel, (best, winner)| {
            let weight = channel_weights[voxel];
            if weight > *best {
                *best = weight;
                *winner = channel;
            }
        });
        scratch.fill(0.0);
    }

    let mut grid = VoxelGrid::filled(operator.side(), 1, empty_value)?;
    parallel::for_each_indexed_mut(&mut grid.values, |voxel, slot| {
        let winner = leader[voxel].1;
        if winner > 0 {
            *slot = winner as f64;
        }
    });
    Ok(grid)
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResampleError {
    Grid(GridError),
    Aggregate(AggregateError),
    Transform(TransformError),
}

impl fmt::Display for ResampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResampleError::Grid(err) => write!(f, "{err}"),
            ResampleError::Aggregate(err) => write!(f, "{err}"),
            ResampleError::Transform(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ResampleError {}

impl From<GridError> for ResampleError {
    fn from(err: GridError) -> Self {
        ResampleError::Grid(err)
    }
}

impl From<TransformError> for ResampleError {
    fn from(err: TransformError) -> Self {
        ResampleError::Transform(err)
    }
}

impl From<AggregateError> for ResampleError {
    fn from(err: AggregateError) -> Self {
        ResampleError::Aggregate(err)
    }
}

/// Builds a fresh operator for `points` and aggregates `data` through it.
pub fn resample(
    points: &[DVec3],
    data: &PointData,
    side: u32,
    empty_value: f64,
    mode: AggregateMode,
) -> Result<VoxelGrid, ResampleError> {
    if let AggregateMode::Categorical { .. } = mode {
        if data.datasets() != 1 {
            return Err(AggregateError::CategoricalNeedsSingleDataset {
                datasets: data.datasets(),
            }
            .into());
        }
    }
    let operator = build_operator(points, side)?;
    Ok(aggregate(data, &operator, empty_value, mode)?)
}
