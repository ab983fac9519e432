//! # climviz
//!
//! A Rust library for rendering gridded climate datasets (GRIB2 or NetCDF) into
//! per-timestep map frames and animated GIFs.
//!
//! ## Features
//!
//! - **Container decoding**: GRIB2 and NetCDF grids normalised to north-first rows
//!   and longitudes in [-180, 180)
//! - **Region queries**: centre plus half extents in degrees, mapped onto a regular
//!   lat/lon grid and clamped to its edges
//! - **Scalar and vector frames**: colour-mapped fields, or magnitude plus arrows
//!   built from three wind components
//! - **Animations**: frames stitched into a looping GIF
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use climviz::{decode::AutoDecoder, input::TaskConfig, run_task};
//!
//! let config = TaskConfig::from_file("wind.yaml")?;
//! let animation = run_task(&config, &AutoDecoder::new(), false)?;
//! println!("{:?}", animation);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Configuration Example
//!
//! ```yaml
//! task_name: plot_wind_vector_field
//! outputs_dir: outputs
//! mode: vector
//! data_paths:
//!   u: data/u_component_of_wind.grib
//!   v: data/v_component_of_wind.grib
//!   w: data/vertical_velocity.grib
//! time_steps: { u: 24, v: 24, w: 24 }
//! components: { u_component: u, v_component: v, w_component: w }
//! region: { lat: 40.0, lon: -90.0, dlat: 10.0, dlon: 10.0 }
//! ```

pub mod animate;
pub mod catalog;
pub mod cli;
pub mod decode;
pub mod grid;
pub mod info;
pub mod input;
pub mod log;
pub mod render;
pub mod visualize;


#[cfg(test)]
mod cli_tests;

use crate::decode::GridDecoder;
use crate::input::TaskConfig;
use crate::log::show_catalog_info;
use crate::visualize::Visualizer;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Runs a visualisation task according to the provided configuration.
///
/// This function orchestrates the whole pipeline:
/// 1. Resolves the region of interest
/// 2. Prepares output directories and loads every dataset
/// 3. Renders one frame per time step
/// 4. Stitches the frames into an animation, unless `frames_only` is set
///
/// # Arguments
///
/// * `config` - The task configuration
/// * `decoder` - Decoder used to read every dataset
/// * `frames_only` - Skip the animation step
///
/// # Returns
///
/// The animation path, or `None` when only frames were rendered.
///
/// # Errors
///
/// This function will return an error if:
/// - The region parameters are ambiguous or invalid
/// - The mode is unsupported or the dataset count does not fit it
/// - A dataset cannot be decoded
/// - A frame or the animation cannot be written
pub fn run_task(config: &TaskConfig, decoder: &dyn GridDecoder, frames_only: bool) -> Result<Option<PathBuf>> {
    let region = config.region_query().context("Invalid region")?;
    let visualizer = Visualizer::new(config, decoder)
        .with_context(|| format!("Failed to prepare task '{}'", config.task_name))?;
    show_catalog_info(visualizer.catalog());

    visualizer.populate_frames(&region, config.title.as_deref())?;
    if frames_only {
        return Ok(None);
    }
    Ok(Some(visualizer.animate_from_frames()?))
}

/// Re-encodes the animation of a task from its existing frames.
pub fn animate_task(config: &TaskConfig, decoder: &dyn GridDecoder) -> Result<PathBuf> {
    let visualizer = Visualizer::new(config, decoder)
        .with_context(|| format!("Failed to prepare task '{}'", config.task_name))?;
    Ok(visualizer.animate_from_frames()?)
}
