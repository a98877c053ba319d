use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use surfvol_core::{ResampleJob, VoxelGrid};

use crate::headless::HeadlessArgs;

#[derive(Debug, Serialize)]
struct GridSummary {
    grid_side: u32,
    datasets: usize,
    voxels: usize,
    empty_value: f64,
    occupied: Vec<usize>,
}

impl GridSummary {
    fn from_grid(grid: &VoxelGrid) -> Self {
        Self {
            grid_side: grid.side,
            datasets: grid.datasets,
            voxels: grid.voxel_count(),
            empty_value: grid.empty_value,
            occupied: (0..grid.datasets).map(|d| grid.occupied_count(d)).collect(),
        }
    }
}

pub(crate) fn run(job_path: &Path, args: &HeadlessArgs) -> Result<(), String> {
    let bytes = std::fs::read(job_path).map_err(|err| err.to_string())?;
    let job = ResampleJob::from_json_slice(&bytes)?;
    let grid = job.run().map_err(|err| err.to_string())?;

    if let Some(path) = &args.out_path {
        write_grid(&grid, path)?;
        tracing::info!("resample: wrote {} dataset(s) to {:?}", grid.datasets, path);
    }

    if args.summary || args.out_path.is_none() {
        let summary = GridSummary::from_grid(&grid);
        let json = serde_json::to_string_pretty(&summary).map_err(|err| err.to_string())?;
        println!("{json}");
    }
    Ok(())
}

/// Dataset slices back to back, each `side^3` native-endian `f32` values.
fn write_grid(grid: &VoxelGrid, path: &Path) -> Result<(), String> {
    let file = File::create(path).map_err(|err| err.to_string())?;
    let mut writer = BufWriter::new(file);
    for dataset in 0..grid.datasets {
        grid.write_raw_f32(dataset, &mut writer)
            .map_err(|err| err.to_string())?;
    }
    writer.flush().map_err(|err| err.to_string())
}
