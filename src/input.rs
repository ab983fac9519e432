//! # Task Configuration Module
//!
//! This module provides configuration parsing for climviz tasks. A task names
//! the datasets to load, the rendering mode, an optional region of interest and
//! where the frames and the animation are written.
//!
//! ## Configuration Structure
//!
//! - **task_name**: Name of the task; outputs go to `<outputs_dir>/<task_name>`
//! - **outputs_dir**: Root directory for task outputs
//! - **mode**: `"scalar"` (one dataset) or `"vector"` (three components)
//! - **data_paths**: Dataset name to GRIB2/NetCDF path
//! - **time_steps**: Optional dataset name to number of time steps
//! - **variables**: Optional dataset name to field name inside the container
//! - **components**: Vector mode role assignment (`u_component`, `v_component`, `w_component`)
//! - **region**: Optional `lat`, `lon`, `dlat`, `dlon` box; all four or none
//!
//! ## Example Usage
//!
//! ```rust
//! use climviz::input::TaskConfig;
//!
//! let yaml = r#"
//! task_name: wind_u100
//! outputs_dir: outputs
//! data_paths:
//!   u100: data/100m_u_component_of_wind.grib
//! time_steps:
//!   u100: 24
//! "#;
//! let config = TaskConfig::from_yaml(yaml)?;
//! assert_eq!(config.mode, "scalar");
//! assert_eq!(config.fps, 5);
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::animate::DEFAULT_FPS;
use crate::grid::{DEFAULT_CELLS_PER_DEGREE, RegionError, RegionQuery};
use crate::render::RenderOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Complete configuration of one visualisation task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Name of the task, e.g. `plot_wind_vector_field`
    pub task_name: String,
    /// Root directory under which the task directory is created
    pub outputs_dir: PathBuf,
    /// Rendering mode, `"scalar"` or `"vector"`
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Dataset name to container path
    pub data_paths: BTreeMap<String, PathBuf>,
    /// Dataset name to declared number of time steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_steps: Option<BTreeMap<String, usize>>,
    /// Dataset name to the field name inside the container
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<BTreeMap<String, String>>,
    /// Role assignment for vector mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<VectorComponents>,
    /// Region of interest; the whole grid when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<RegionConfig>,
    /// Title logged with every rendered frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Animation frame rate
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Grid resolution in cells per degree
    #[serde(default = "default_cells_per_degree")]
    pub cells_per_degree: f64,
    /// Frame geometry
    #[serde(default)]
    pub render: RenderOptions,
}

/// Explicit role assignment of the three vector components to dataset names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorComponents {
    pub u_component: String,
    pub v_component: String,
    pub w_component: String,
}

/// Region parameters as written in a config file or given as flags.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RegionConfig {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub dlat: Option<f64>,
    pub dlon: Option<f64>,
}

impl RegionConfig {
    pub fn to_query(&self) -> Result<RegionQuery, RegionError> {
        RegionQuery::from_parts(self.lat, self.lon, self.dlat, self.dlon)
    }
}

fn default_mode() -> String {
    "scalar".to_string()
}

fn default_fps() -> u32 {
    DEFAULT_FPS
}

fn default_cells_per_degree() -> f64 {
    DEFAULT_CELLS_PER_DEGREE
}

impl TaskConfig {
    /// Creates a scalar-mode configuration with defaults for everything else.
    pub fn new<S: Into<String>, P: Into<PathBuf>>(task_name: S, outputs_dir: P) -> Self {
        TaskConfig {
            task_name: task_name.into(),
            outputs_dir: outputs_dir.into(),
            mode: default_mode(),
            data_paths: BTreeMap::new(),
            time_steps: None,
            variables: None,
            components: None,
            region: None,
            title: None,
            fps: DEFAULT_FPS,
            cells_per_degree: DEFAULT_CELLS_PER_DEGREE,
            render: RenderOptions::default(),
        }
    }

    /// Loads a configuration file; `.yaml`/`.yml` files are parsed as YAML,
    /// everything else as JSON.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use climviz::input::TaskConfig;
    ///
    /// let config = TaskConfig::from_file("wind_task.yaml")?;
    /// println!("Task: {}", config.task_name);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let config = if is_yaml {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        };
        config.with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    pub fn from_json(json_str: &str) -> Result<Self> {
        Ok(serde_json::from_str(json_str)?)
    }

    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml_str)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// The region query described by this configuration.
    pub fn region_query(&self) -> Result<RegionQuery, RegionError> {
        self.region.unwrap_or_default().to_query()
    }

    /// `<outputs_dir>/<task_name>`
    pub fn task_dir(&self) -> PathBuf {
        self.outputs_dir.join(&self.task_name)
    }

    /// Example scalar task: 24 hourly steps of the 100 m u-wind component.
    pub fn scalar_template() -> Self {
        let mut config = TaskConfig::new("wind_u100", "outputs");
        config
            .data_paths
            .insert("u100".to_string(), PathBuf::from("data/100m_u_component_of_wind.grib"));
        config.time_steps = Some(BTreeMap::from([("u100".to_string(), 24)]));
        config.title = Some("u-component of wind at 100m".to_string());
        config.region = Some(RegionConfig {
            lat: Some(40.0),
            lon: Some(-90.0),
            dlat: Some(10.0),
            dlon: Some(10.0),
        });
        config
    }

    /// Example vector task over three wind components.
    pub fn vector_template() -> Self {
        let mut config = TaskConfig::new("wind_vector_field", "outputs");
        config.mode = "vector".to_string();
        let names = [("u", "u_component"), ("v", "v_component"), ("w", "vertical_velocity")];
        let mut steps = BTreeMap::new();
        for (short, file) in names {
            config
                .data_paths
                .insert(short.to_string(), PathBuf::from(format!("data/{}.grib", file)));
            steps.insert(short.to_string(), 24);
        }
        config.time_steps = Some(steps);
        config.components = Some(VectorComponents {
            u_component: "u".to_string(),
            v_component: "v".to_string(),
            w_component: "w".to_string(),
        });
        config.title = Some("wind vector field".to_string());
        config
    }
}
