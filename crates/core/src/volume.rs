use std::fmt;
use std::io;

/// Hard cap on `side^3` for a single lattice.
pub const MAX_GRID_VOXELS: u64 = 1 << 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    ZeroSide,
    TooLarge { voxels: u64, max: u64 },
    Allocation { len: usize },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::ZeroSide => write!(f, "grid side must be at least 1"),
            GridError::TooLarge { voxels, max } => {
                write!(f, "voxel grid too large ({voxels} voxels, max {max})")
            }
            GridError::Allocation { len } => {
                write!(f, "failed to allocate {len} voxel values")
            }
        }
    }
}

impl std::error::Error for GridError {}

/// Number of voxels in a cubic lattice of the given side, after range checks.
pub fn lattice_voxels(side: u32) -> Result<usize, GridError> {
    if side == 0 {
        return Err(GridError::ZeroSide);
    }
    let total = side as u64 * side as u64 * side as u64;
    if total > MAX_GRID_VOXELS {
        return Err(GridError::TooLarge {
            voxels: total,
            max: MAX_GRID_VOXELS,
        });
    }
    Ok(total as usize)
}

pub fn try_alloc_f64(len: usize, fill: f64) -> Result<Vec<f64>, GridError> {
    let mut values = Vec::new();
    values
        .try_reserve_exact(len)
        .map_err(|_| GridError::Allocation { len })?;
    values.resize(len, fill);
    Ok(values)
}

/// Dense `side x side x side x datasets` grid.
///
/// Each dataset occupies one contiguous slice of `side^3` values with x
/// varying fastest, then y, then z. Indices taken by [`VoxelGrid::get`] are
/// zero-based; lattice coordinates used by the splat operator are one-based
/// and go through [`VoxelGrid::lattice_index`].
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelGrid {
    pub side: u32,
    pub datasets: usize,
    pub empty_value: f64,
    pub values: Vec<f64>,
}

impl VoxelGrid {
    pub fn filled(side: u32, datasets: usize, empty_value: f64) -> Result<Self, GridError> {
        let voxels = lattice_voxels(side)?;
        let len = voxels
            .checked_mul(datasets)
            .ok_or(GridError::Allocation { len: usize::MAX })?;
        let values = try_alloc_f64(len, empty_value)?;
        Ok(Self {
            side,
            datasets,
            empty_value,
            values,
        })
    }

    pub fn voxel_count(&self) -> usize {
        let side = self.side as usize;
        side * side * side
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value_index(&self, x: u32, y: u32, z: u32) -> usize {
        let n = self.side.max(1) as usize;
        z as usize * n * n + y as usize * n + x as usize
    }

    /// Flat index of a one-based lattice coordinate, or `None` outside `[1, side]`.
    pub fn lattice_index(&self, coord: [u32; 3]) -> Option<usize> {
        if coord.iter().any(|&c| c == 0 || c > self.side) {
            return None;
        }
        Some(self.value_index(coord[0] - 1, coord[1] - 1, coord[2] - 1))
    }

    pub fn slice(&self, dataset: usize) -> &[f64] {
        let voxels = self.voxel_count();
        &self.values[dataset * voxels..(dataset + 1) * voxels]
    }

    pub fn get(&self, dataset: usize, xyz: [u32; 3]) -> Option<f64> {
        if dataset >= self.datasets || xyz.iter().any(|&c| c >= self.side) {
            return None;
        }
        let idx = self.value_index(xyz[0], xyz[1], xyz[2]);
        self.slice(dataset).get(idx).copied()
    }

    pub fn is_empty_value(&self, value: f64) -> bool {
        value == self.empty_value || (value.is_nan() && self.empty_value.is_nan())
    }

    /// Winner-take-all channel at a voxel of a categorical grid.
    pub fn label_at(&self, dataset: usize, xyz: [u32; 3]) -> Option<u32> {
        let value = self.get(dataset, xyz)?;
        if self.is_empty_value(value) || value.is_nan() || value < 1.0 {
            return None;
        }
        Some(value as u32)
    }

    pub fn occupied_count(&self, dataset: usize) -> usize {
        self.slice(dataset)
            .iter()
            .filter(|value| !self.is_empty_value(**value))
            .count()
    }

    /// Writes one dataset slice as native-endian `f32` values.
    pub fn write_raw_f32<W: io::Write>(&self, dataset: usize, writer: &mut W) -> io::Result<()> {
        if dataset >= self.datasets {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("dataset {dataset} out of range ({} datasets)", self.datasets),
            ));
        }
        let converted: Vec<f32> = self.slice(dataset).iter().map(|v| *v as f32).collect();
        writer.write_all(bytemuck::cast_slice(&converted))
    }
}
