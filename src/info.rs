//! # Dataset Information Module
//!
//! This module decodes a single GRIB2 or NetCDF container and summarises the
//! resulting grid: its coordinate extents, resolution, time steps and value
//! statistics. It backs the `climviz info` subcommand.

use crate::decode::{ContainerFormat, DecodedGrid, GridDecoder};
use anyhow::{Context, Result};
use log::debug;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Extent and spacing of one coordinate axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisInfo {
    pub length: usize,
    pub first: f64,
    pub last: f64,
    pub step: Option<f64>,
}

/// Value statistics over every finite cell of the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueStats {
    pub min: f32,
    pub max: f32,
    pub mean: f64,
    pub missing: usize,
}

/// Summary of a decoded dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub path: String,
    pub format: String,
    pub variable: String,
    pub time_steps: usize,
    pub latitude: AxisInfo,
    pub longitude: AxisInfo,
    pub values: Option<ValueStats>,
    pub file_size: Option<u64>,
}

/// Decodes `path` and summarises the grid of `variable`.
///
/// # Arguments
///
/// * `path` - GRIB2 or NetCDF container
/// * `variable` - Field name inside the container
/// * `decoder` - Decoder used to read the container
///
/// # Errors
///
/// Returns an error if the container format is unknown or decoding fails.
pub fn get_dataset_info(path: &Path, variable: &str, decoder: &dyn GridDecoder) -> Result<DatasetInfo> {
    let format = ContainerFormat::from_path(path)?;
    debug!("Inspecting {} as {:?}", path.display(), format);

    let grid = decoder
        .decode(path, variable)
        .with_context(|| format!("Failed to decode '{}' from {}", variable, path.display()))?;

    Ok(DatasetInfo {
        path: path.display().to_string(),
        format: format!("{:?}", format),
        variable: variable.to_string(),
        time_steps: grid.time_len(),
        latitude: axis_info(&grid.latitude),
        longitude: axis_info(&grid.longitude),
        values: value_stats(&grid),
        file_size: fs::metadata(path).ok().map(|m| m.len()),
    })
}

fn axis_info(axis: &Array1<f64>) -> AxisInfo {
    let n = axis.len();
    AxisInfo {
        length: n,
        first: axis.first().copied().unwrap_or(f64::NAN),
        last: axis.last().copied().unwrap_or(f64::NAN),
        step: (n > 1).then(|| (axis[n - 1] - axis[0]) / (n - 1) as f64),
    }
}

fn value_stats(grid: &DecodedGrid) -> Option<ValueStats> {
    let mut missing = 0usize;
    let mut count = 0usize;
    let mut sum = 0.0f64;
    let mut range: Option<(f32, f32)> = None;

    for &v in grid.values.iter() {
        if !v.is_finite() {
            missing += 1;
            continue;
        }
        count += 1;
        sum += v as f64;
        range = Some(match range {
            None => (v, v),
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
        });
    }

    range.map(|(min, max)| ValueStats {
        min,
        max,
        mean: sum / count as f64,
        missing,
    })
}

/// Print dataset info in human-readable format
pub fn print_dataset_info_human(info: &DatasetInfo) {
    println!("Dataset Information:");
    println!("  Path: {}", info.path);
    println!("  Format: {}", info.format);
    if let Some(size) = info.file_size {
        println!("  File Size: {:.2} MB", size as f64 / 1_048_576.0);
    }
    println!("  Variable: {}", info.variable);
    println!("  Time steps: {}", info.time_steps);
    for (name, axis) in [("Latitude", &info.latitude), ("Longitude", &info.longitude)] {
        print!(
            "  {}: {} points, {} .. {}",
            name, axis.length, axis.first, axis.last
        );
        match axis.step {
            Some(step) => println!(" (step {:.4})", step),
            None => println!(),
        }
    }
    match &info.values {
        Some(stats) => {
            println!(
                "  Values: min {} / max {} / mean {:.4}",
                stats.min, stats.max, stats.mean
            );
            if stats.missing > 0 {
                println!("  Missing cells: {}", stats.missing);
            }
        }
        None => println!("  Values: all missing"),
    }
}

/// Print dataset info in JSON format
pub fn print_dataset_info_json(info: &DatasetInfo) -> Result<()> {
    let json = serde_json::to_string_pretty(info).context("Failed to serialize dataset info to JSON")?;
    println!("{}", json);
    Ok(())
}

/// Print dataset info in YAML format
pub fn print_dataset_info_yaml(info: &DatasetInfo) -> Result<()> {
    let yaml = serde_yaml::to_string(info).context("Failed to serialize dataset info to YAML")?;
    println!("{}", yaml);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::MemoryDecoder;
    use ndarray::Array3;

    fn sample_decoder() -> MemoryDecoder {
        let mut values = Array3::<f32>::zeros((2, 3, 4));
        values[[0, 0, 0]] = -5.0;
        values[[1, 2, 3]] = 7.0;
        values[[1, 1, 1]] = f32::NAN;
        let grid = DecodedGrid::new(
            Array1::from(vec![10.0, 0.0, -10.0]),
            Array1::from(vec![0.0, 10.0, 20.0, 30.0]),
            values,
        )
        .unwrap();
        MemoryDecoder::new().with_grid("sample.nc", grid)
    }

    #[test]
    fn test_dataset_info_summary() {
        let decoder = sample_decoder();
        let info = get_dataset_info(Path::new("sample.nc"), "t2m", &decoder).unwrap();

        assert_eq!(info.format, "Netcdf");
        assert_eq!(info.time_steps, 2);
        assert_eq!(info.latitude.length, 3);
        assert_eq!(info.latitude.first, 10.0);
        assert_eq!(info.latitude.step, Some(-10.0));
        assert_eq!(info.longitude.last, 30.0);
        assert_eq!(info.file_size, None);

        let stats = info.values.unwrap();
        assert_eq!(stats.min, -5.0);
        assert_eq!(stats.max, 7.0);
        assert_eq!(stats.missing, 1);
    }

    #[test]
    fn test_dataset_info_rejects_unknown_extension() {
        let decoder = sample_decoder();
        assert!(get_dataset_info(Path::new("sample.csv"), "t2m", &decoder).is_err());
    }

    #[test]
    fn test_dataset_info_serializes() {
        let decoder = sample_decoder();
        let info = get_dataset_info(Path::new("sample.nc"), "t2m", &decoder).unwrap();
        let json = serde_json::to_string(&info).unwrap();
        let back: DatasetInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back.variable, "t2m");
    }
}
