use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::aggregate::{resample, AggregateMode, PointData, ResampleError};
use crate::voxel_space::VoxelTransform;
use crate::volume::VoxelGrid;

pub const DEFAULT_GRID_SIDE: u32 = 320;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobMode {
    #[default]
    Continuous,
    Categorical(u32),
}

impl From<JobMode> for AggregateMode {
    fn from(mode: JobMode) -> Self {
        match mode {
            JobMode::Continuous => AggregateMode::Continuous,
            JobMode::Categorical(channels) => AggregateMode::from_code(channels),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResampleSettings {
    pub grid_side: u32,
    pub empty_value: f64,
    pub mode: JobMode,
    /// Applied to `points` first when present; otherwise points are already
    /// in one-based voxel space.
    pub transform: Option<VoxelTransform>,
}

impl Default for ResampleSettings {
    fn default() -> Self {
        Self {
            grid_side: DEFAULT_GRID_SIDE,
            empty_value: 0.0,
            mode: JobMode::Continuous,
            transform: None,
        }
    }
}

/// A complete resampling request as read from JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResampleJob {
    #[serde(default)]
    pub settings: ResampleSettings,
    pub points: Vec<[f64; 3]>,
    /// One row per dataset, one value per point.
    pub data: Vec<Vec<f64>>,
}

impl ResampleJob {
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, String> {
        serde_json::from_slice(bytes).map_err(|err| err.to_string())
    }

    pub fn voxel_points(&self) -> Vec<DVec3> {
        let points: Vec<DVec3> = self.points.iter().map(|p| DVec3::from(*p)).collect();
        match &self.settings.transform {
            Some(transform) => transform.apply(&points),
            None => points,
        }
    }

    pub fn run(&self) -> Result<VoxelGrid, ResampleError> {
        if let Some(transform) = &self.settings.transform {
            transform.validate()?;
        }
        let data = PointData::from_rows(&self.data)?;
        let points = self.voxel_points();
        tracing::info!(
            "resampling {} points x {} datasets onto a {}^3 grid",
            points.len(),
            data.datasets(),
            self.settings.grid_side
        );
        resample(
            &points,
            &data,
            self.settings.grid_side,
            self.settings.empty_value,
            self.settings.mode.into(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel_space::TransformError;

    #[test]
    fn parses_minimal_job_with_defaults() {
        let job = ResampleJob::from_json_slice(
            br#"{ "points": [[2.0, 2.0, 2.0]], "data": [[7.0]] }"#,
        )
        .expect("parse job");
        assert_eq!(job.settings.grid_side, DEFAULT_GRID_SIDE);
        assert_eq!(job.settings.mode, JobMode::Continuous);
        assert!(job.settings.transform.is_none());
    }

    #[test]
    fn runs_categorical_job_with_transform() {
        let json = br#"{
            "settings": {
                "grid_side": 4,
                "empty_value": -1.0,
                "mode": { "categorical": 2 },
                "transform": { "translation": [1.0, 1.0, 1.0] }
            },
            "points": [[1.0, 1.0, 1.0], [1.0, 1.0, 1.0]],
            "data": [[2.0, 2.0]]
        }"#;
        let job = ResampleJob::from_json_slice(json).expect("parse job");
        assert_eq!(job.settings.mode, JobMode::Categorical(2));
        let transform = job.settings.transform.expect("transform");
        assert_eq!(transform.source_resolution, 1.0);

        let grid = job.run().expect("run job");
        assert_eq!(grid.label_at(0, [1, 1, 1]), Some(2));
        assert_eq!(grid.occupied_count(0), 1);
    }

    #[test]
    fn zero_target_resolution_is_rejected() {
        let json = br#"{
            "settings": {
                "grid_side": 4,
                "transform": { "target_resolution": 0.0 }
            },
            "points": [[1.0, 1.0, 1.0]],
            "data": [[1.0]]
        }"#;
        let job = ResampleJob::from_json_slice(json).expect("parse job");
        let err = job.run().unwrap_err();
        assert!(matches!(
            err,
            ResampleError::Transform(TransformError::InvalidResolution {
                target_resolution,
                ..
            }) if target_resolution == 0.0
        ));
    }

    #[test]
    fn settings_round_trip() {
        let job = ResampleJob {
            settings: ResampleSettings {
                grid_side: 8,
                empty_value: -3.0,
                mode: JobMode::Categorical(4),
                transform: Some(VoxelTransform::default()),
            },
            points: vec![[1.0, 2.0, 3.0]],
            data: vec![vec![1.0]],
        };
        let bytes = serde_json::to_vec(&job).expect("serialize job");
        let loaded = ResampleJob::from_json_slice(&bytes).expect("deserialize job");
        assert_eq!(loaded.settings.mode, JobMode::Categorical(4));
        assert_eq!(loaded.settings.transform, Some(VoxelTransform::default()));
        assert_eq!(loaded.points, job.points);
    }
}
