//! # CLI Module
//!
//! This module provides the command-line interface for climviz, including:
//! - Argument parsing with clap
//! - Configuration file loading (JSON/YAML)
//! - Environment variable support with the CLIMVIZ_ prefix
//! - Merging of command-line overrides into a configuration file
//! - Subcommands for rendering, inspection, templates and completions

use crate::input::{RegionConfig, TaskConfig, VectorComponents};
use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Render gridded climate datasets into map frames and animations
#[derive(Parser, Debug)]
#[command(name = "climviz")]
#[command(about = "Render GRIB2/NetCDF climate grids into map frames and animated GIFs")]
#[command(version)]
#[command(long_about = "
climviz turns gridded climate datasets (GRIB2 or NetCDF) into one map frame per
time step and stitches the frames into an animated GIF.

FEATURES:
  • Scalar mode: colour-mapped field of one dataset
  • Vector mode: magnitude plus (u, v) arrows from three component datasets
  • Region selection: centre latitude/longitude with half extents in degrees
  • Configuration files: JSON and YAML format support with templates
  • Shell completions: Auto-completion for bash, zsh, fish, and PowerShell

EXAMPLES:
  # Render a scalar field over North America
  climviz render --task u100 --dataset u100=data/u100.grib --steps u100=24 \\
    --lat 40 --lon -90 --dlat 10 --dlon 10

  # Using config file
  climviz render --config wind.yaml

  # Generate templates
  climviz template vector --format yaml > wind.yaml

  # Dataset inspection
  climviz info data/t2m.nc -n t2m
")]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode - suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render frames and the animation of a task
    #[command(long_about = "
Render one frame per time step and stitch them into an animated GIF.

The task can come from a configuration file, from flags, or from both; flags
override the file. Outputs go to <outputs>/<task>/frames and
<outputs>/<task>/animation/<task>.gif.

EXAMPLES:
  # Scalar task from flags
  climviz render --task t2m --dataset t2m=data/t2m.nc --steps t2m=12

  # Vector task from a config file, rendered at 10 fps
  climviz render --config wind.yaml --fps 10

  # Frames only, no animation
  climviz render --config wind.yaml --frames-only
")]
    Render(RenderArgs),

    /// Re-encode the animation from previously rendered frames
    #[command(long_about = "
Stitch frames/0.png .. frames/{n-1}.png of a task into its animation without
re-rendering. The datasets are still loaded to know the frame count.

EXAMPLES:
  climviz animate --config wind.yaml
")]
    Animate {
        /// Task configuration file (JSON or YAML)
        #[arg(short, long, env = "CLIMVIZ_CONFIG")]
        config: PathBuf,

        /// Override the frame rate
        #[arg(long, env = "CLIMVIZ_FPS")]
        fps: Option<u32>,
    },

    /// Show information about a GRIB2 or NetCDF dataset
    #[command(long_about = "
Decode a dataset and display its grid: coordinate extents, resolution, time
steps and value statistics.

EXAMPLES:
  # Basic info; the variable defaults to the file stem
  climviz info data/t2m.nc

  # Info about a specific variable as JSON
  climviz info data/era5.nc -n u100 --format json
")]
    Info {
        /// Dataset file path
        file: PathBuf,

        /// Variable to decode (default: file stem)
        #[arg(short = 'n', long)]
        variable: Option<String>,

        /// Output format for dataset information
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
    },

    /// Generate configuration templates
    #[command(long_about = "
Generate task configuration templates.

Available templates:
• scalar: Single dataset over a bounded region
• vector: Three wind components in vector mode

EXAMPLES:
  climviz template scalar
  climviz template vector --format yaml -o wind.yaml
")]
    Template {
        /// Template type to generate
        #[arg(value_enum)]
        template_type: TemplateType,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration format
        #[arg(long, value_enum, default_value_t = ConfigFormat::Json)]
        format: ConfigFormat,
    },

    /// Generate shell completions
    #[command(long_about = "
Generate shell completion scripts for bash, zsh, fish, and PowerShell.

EXAMPLES:
  climviz completions bash > ~/.bash_completion.d/climviz
  climviz completions zsh -o _climviz
")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Arguments of the `render` subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct RenderArgs {
    /// Task configuration file (JSON or YAML)
    #[arg(short, long, env = "CLIMVIZ_CONFIG")]
    pub config: Option<PathBuf>,

    /// Task name
    #[arg(short, long, env = "CLIMVIZ_TASK")]
    pub task: Option<String>,

    /// Root output directory
    #[arg(short, long, env = "CLIMVIZ_OUTPUTS")]
    pub outputs: Option<PathBuf>,

    /// Rendering mode: scalar or vector
    #[arg(short, long, env = "CLIMVIZ_MODE")]
    pub mode: Option<String>,

    /// Dataset: name=path (repeatable)
    #[arg(long = "dataset", value_parser = parse_dataset)]
    pub datasets: Vec<DatasetArg>,

    /// Time step count: name=N (repeatable)
    #[arg(long = "steps", value_parser = parse_steps)]
    pub steps: Vec<StepsArg>,

    /// Field name inside the container: name=field (repeatable)
    #[arg(long = "variable", value_parser = parse_variable)]
    pub variables: Vec<VariableArg>,

    /// Vector roles: u_name,v_name,w_name
    #[arg(long, value_parser = parse_components)]
    pub components: Option<VectorComponents>,

    /// Region centre latitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Region centre longitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Region half height in degrees
    #[arg(long)]
    pub dlat: Option<f64>,

    /// Region half width in degrees
    #[arg(long)]
    pub dlon: Option<f64>,

    /// Frame title
    #[arg(long, env = "CLIMVIZ_TITLE")]
    pub title: Option<String>,

    /// Animation frame rate
    #[arg(long, env = "CLIMVIZ_FPS")]
    pub fps: Option<u32>,

    /// Grid resolution in cells per degree
    #[arg(long)]
    pub cells_per_degree: Option<f64>,

    /// Render frames without encoding the animation
    #[arg(long)]
    pub frames_only: bool,
}

#[derive(ValueEnum, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON structured output
    Json,
    /// YAML structured output
    Yaml,
}

#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum TemplateType {
    /// Scalar task template
    Scalar,
    /// Vector task template
    Vector,
}

#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON configuration format
    Json,
    /// YAML configuration format
    Yaml,
}

/// Dataset argument from command line
#[derive(Clone, Debug, PartialEq)]
pub struct DatasetArg {
    pub name: String,
    pub path: PathBuf,
}

/// Time step count argument from command line
#[derive(Clone, Debug, PartialEq)]
pub struct StepsArg {
    pub name: String,
    pub count: usize,
}

/// Variable name argument from command line
#[derive(Clone, Debug, PartialEq)]
pub struct VariableArg {
    pub name: String,
    pub variable: String,
}

fn split_pair<'a>(s: &'a str, what: &str) -> Result<(&'a str, &'a str), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() && !value.trim().is_empty() => {
            Ok((name.trim(), value.trim()))
        }
        _ => Err(format!("{} must be in format 'name=value'", what)),
    }
}

/// Parse dataset from command line argument
/// Format: name=path
fn parse_dataset(s: &str) -> Result<DatasetArg, String> {
    let (name, path) = split_pair(s, "Dataset")?;
    Ok(DatasetArg {
        name: name.to_string(),
        path: PathBuf::from(path),
    })
}

/// Parse time step count from command line argument
/// Format: name=N
fn parse_steps(s: &str) -> Result<StepsArg, String> {
    let (name, count) = split_pair(s, "Time steps")?;
    let count = count
        .parse::<usize>()
        .map_err(|_| format!("Invalid time step count '{}'", count))?;
    if count == 0 {
        return Err("Time step count must be positive".to_string());
    }
    Ok(StepsArg {
        name: name.to_string(),
        count,
    })
}

/// Parse variable name from command line argument
/// Format: name=field
fn parse_variable(s: &str) -> Result<VariableArg, String> {
    let (name, variable) = split_pair(s, "Variable")?;
    Ok(VariableArg {
        name: name.to_string(),
        variable: variable.to_string(),
    })
}

/// Parse vector roles from command line argument
/// Format: u_name,v_name,w_name
fn parse_components(s: &str) -> Result<VectorComponents, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
        return Err("Components must be in format 'u_name,v_name,w_name'".to_string());
    }
    Ok(VectorComponents {
        u_component: parts[0].to_string(),
        v_component: parts[1].to_string(),
        w_component: parts[2].to_string(),
    })
}

impl RenderArgs {
    /// Builds the task configuration: the config file (if any) with every
    /// command-line option applied on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded, if no task name
    /// is available, or if no dataset is configured.
    pub fn to_task_config(&self) -> Result<TaskConfig> {
        let mut config = match (&self.config, &self.task) {
            (Some(path), _) => TaskConfig::from_file(path)?,
            (None, Some(task)) => TaskConfig::new(task.clone(), "outputs"),
            (None, None) => bail!("Either --config or --task must be provided"),
        };
        self.apply_overrides(&mut config);

        if config.data_paths.is_empty() {
            bail!(
                "Task '{}' has no datasets; add --dataset name=path or a data_paths block",
                config.task_name
            );
        }
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut TaskConfig) {
        if let Some(task) = &self.task {
            config.task_name = task.clone();
        }
        if let Some(outputs) = &self.outputs {
            config.outputs_dir = outputs.clone();
        }
        if let Some(mode) = &self.mode {
            config.mode = mode.clone();
        }
        for dataset in &self.datasets {
            config
                .data_paths
                .insert(dataset.name.clone(), dataset.path.clone());
        }
        if !self.steps.is_empty() {
            let steps = config.time_steps.get_or_insert_with(BTreeMap::new);
            for arg in &self.steps {
                steps.insert(arg.name.clone(), arg.count);
            }
        }
        if !self.variables.is_empty() {
            let variables = config.variables.get_or_insert_with(BTreeMap::new);
            for arg in &self.variables {
                variables.insert(arg.name.clone(), arg.variable.clone());
            }
        }
        if let Some(components) = &self.components {
            config.components = Some(components.clone());
        }
        let region_flags = [self.lat, self.lon, self.dlat, self.dlon];
        if region_flags.iter().any(Option::is_some) {
            config.region = Some(RegionConfig {
                lat: self.lat,
                lon: self.lon,
                dlat: self.dlat,
                dlon: self.dlon,
            });
        }
        if let Some(title) = &self.title {
            config.title = Some(title.clone());
        }
        if let Some(fps) = self.fps {
            config.fps = fps;
        }
        if let Some(cells) = self.cells_per_degree {
            config.cells_per_degree = cells;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dataset() {
        let result = parse_dataset("u100=data/u100.grib").unwrap();
        assert_eq!(result.name, "u100");
        assert_eq!(result.path, PathBuf::from("data/u100.grib"));

        assert!(parse_dataset("u100").is_err());
        assert!(parse_dataset("=data/u100.grib").is_err());
        assert!(parse_dataset("u100=").is_err());
    }

    #[test]
    fn test_parse_steps() {
        let result = parse_steps("u100=24").unwrap();
        assert_eq!(result.count, 24);

        assert!(parse_steps("u100=abc").is_err());
        assert!(parse_steps("u100=-1").is_err());
        assert!(parse_steps("u100=0").is_err());
    }

    #[test]
    fn test_parse_components() {
        let result = parse_components("u, v ,w").unwrap();
        assert_eq!(result.u_component, "u");
        assert_eq!(result.v_component, "v");
        assert_eq!(result.w_component, "w");

        assert!(parse_components("u,v").is_err());
        assert!(parse_components("u,,w").is_err());
    }

    #[test]
    fn test_to_task_config_from_flags() {
        let args = RenderArgs {
            task: Some("t2m".to_string()),
            datasets: vec![parse_dataset("t2m=data/t2m.nc").unwrap()],
            steps: vec![parse_steps("t2m=12").unwrap()],
            lat: Some(40.0),
            lon: Some(-90.0),
            dlat: Some(10.0),
            dlon: Some(10.0),
            fps: Some(8),
            ..Default::default()
        };

        let config = args.to_task_config().unwrap();
        assert_eq!(config.task_name, "t2m");
        assert_eq!(config.outputs_dir, PathBuf::from("outputs"));
        assert_eq!(config.time_steps.unwrap()["t2m"], 12);
        assert_eq!(config.fps, 8);
        assert!(config.region.unwrap().to_query().is_ok());
    }

    #[test]
    fn test_to_task_config_requires_task_and_datasets() {
        assert!(RenderArgs::default().to_task_config().is_err());

        let args = RenderArgs {
            task: Some("empty".to_string()),
            ..Default::default()
        };
        assert!(args.to_task_config().is_err());
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task.json");
        std::fs::write(&path, TaskConfig::scalar_template().to_json().unwrap()).unwrap();

        let args = RenderArgs {
            config: Some(path),
            outputs: Some(PathBuf::from("/tmp/out")),
            steps: vec![parse_steps("u100=6").unwrap()],
            ..Default::default()
        };
        let config = args.to_task_config().unwrap();
        assert_eq!(config.task_name, "wind_u100");
        assert_eq!(config.outputs_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.time_steps.unwrap()["u100"], 6);
        assert!(config.region.is_some());
    }
}
