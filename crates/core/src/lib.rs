mod aggregate;
mod job;
mod operator;
mod parallel;
pub mod roi;
mod volume;
mod voxel_space;

pub use aggregate::{
    aggregate, resample, AggregateError, AggregateMode, PointData, ResampleError,
};
pub use job::{JobMode, ResampleJob, ResampleSettings, DEFAULT_GRID_SIDE};
pub use operator::{
    build_operator, corner_batch, AxisSign, SplatOperator, SplatTriple, CORNER_SIGNS,
};
pub use volume::{lattice_voxels, GridError, VoxelGrid, MAX_GRID_VOXELS};
pub use voxel_space::{TransformError, VoxelTransform};
