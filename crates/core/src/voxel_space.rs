use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformError {
    InvalidResolution {
        source_resolution: f64,
        target_resolution: f64,
    },
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformError::InvalidResolution {
                source_resolution,
                target_resolution,
            } => write!(
                f,
                "resolutions must be finite and positive (source {source_resolution}, target {target_resolution})"
            ),
        }
    }
}

impl std::error::Error for TransformError {}

/// Maps surface coordinates into the one-based voxel-index space of a target
/// lattice: translate by `translation`, rescale by
/// `source_resolution / target_resolution` about the half-voxel origin, then
/// shift back by half a voxel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoxelTransform {
    pub translation: [f64; 3],
    pub source_resolution: f64,
    pub target_resolution: f64,
}

impl Default for VoxelTransform {
    fn default() -> Self {
        Self {
            translation: [128.0, 128.0, 128.0],
            source_resolution: 1.0,
            target_resolution: 1.0,
        }
    }
}

impl VoxelTransform {
    pub fn validate(&self) -> Result<(), TransformError> {
        let valid = |res: f64| res.is_finite() && res > 0.0;
        if valid(self.source_resolution) && valid(self.target_resolution) {
            Ok(())
        } else {
            Err(TransformError::InvalidResolution {
                source_resolution: self.source_resolution,
                target_resolution: self.target_resolution,
            })
        }
    }

    /// Only meaningful after [`VoxelTransform::validate`] succeeds.
    pub fn scale(&self) -> f64 {
        self.source_resolution / self.target_resolution
    }

    pub fn to_voxel(&self, point: DVec3) -> DVec3 {
        let shifted = point + DVec3::from(self.translation);
        (shifted - DVec3::splat(0.5)) * self.scale() + DVec3::splat(0.5)
    }

    pub fn apply(&self, points: &[DVec3]) -> Vec<DVec3> {
        points.iter().map(|p| self.to_voxel(*p)).collect()
    }
}
