//! # Visualisation Orchestration
//!
//! [`Visualizer`] ties the pieces together for one task: it prepares the
//! output directories, builds the [`Catalog`], renders one frame per time
//! step and stitches the frames into an animation.
//!
//! ## Output layout
//!
//! ```text
//! <outputs_dir>/<task_name>/
//! ├── frames/
//! │   ├── 0.png
//! │   └── ...
//! └── animation/
//!     └── <task_name>.gif
//! ```

use crate::animate::{AnimateError, animate_frames};
use crate::catalog::{Catalog, CatalogError};
use crate::decode::GridDecoder;
use crate::grid::{GridIndexer, RegionQuery};
use crate::input::{TaskConfig, VectorComponents};
use crate::render::{FrameRenderer, RenderError, frame_path};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Name of the per-task frame directory.
pub const FRAME_DIR: &str = "frames";
/// Name of the per-task animation directory.
pub const ANIMATION_DIR: &str = "animation";

/// Errors that can occur while running a visualisation task
#[derive(Error, Debug)]
pub enum VisualizeError {
    #[error("Mode not supported: '{0}' (expected 'scalar' or 'vector')")]
    UnsupportedMode(String),

    #[error("grid resolution must be a positive number of cells per degree, got {0}")]
    InvalidResolution(f64),

    #[error("{mode} mode expects {expected} dataset(s), got {found}")]
    DatasetCountMismatch {
        mode: RenderMode,
        expected: usize,
        found: usize,
    },

    #[error("vector mode requires a components block naming u_component, v_component and w_component")]
    MissingComponents,

    #[error("{role} refers to unknown dataset '{name}'")]
    UnknownComponent { role: &'static str, name: String },

    #[error("frame {} is missing; populate frames before animating", .0.display())]
    MissingFrame(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Animate(#[from] AnimateError),
}

pub type VisualizeResult<T> = Result<T, VisualizeError>;

/// How the registered datasets are turned into frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// One dataset rendered as a colour-mapped field
    Scalar,
    /// Three datasets rendered as magnitude plus (u, v) arrows
    Vector,
}

impl RenderMode {
    /// Number of datasets the mode operates on.
    pub fn required_datasets(&self) -> usize {
        match self {
            RenderMode::Scalar => 1,
            RenderMode::Vector => 3,
        }
    }
}

impl FromStr for RenderMode {
    type Err = VisualizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scalar" => Ok(RenderMode::Scalar),
            "vector" => Ok(RenderMode::Vector),
            _ => Err(VisualizeError::UnsupportedMode(s.to_string())),
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Scalar => write!(f, "scalar"),
            RenderMode::Vector => write!(f, "vector"),
        }
    }
}

/// Dataset names bound to the roles a mode renders.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Layers {
    Scalar(String),
    Vector { u: String, v: String, w: String },
}

/// Runs one visualisation task end to end.
#[derive(Debug)]
pub struct Visualizer {
    task_name: String,
    mode: RenderMode,
    frame_dir: PathBuf,
    animation_dir: PathBuf,
    catalog: Catalog,
    layers: Layers,
    renderer: FrameRenderer,
    fps: u32,
}

impl Visualizer {
    /// Prepares a task: parses the mode, creates the output directories,
    /// builds the catalog and binds datasets to their roles.
    ///
    /// Directory creation is idempotent; existing directories are reused.
    ///
    /// # Errors
    ///
    /// - [`VisualizeError::UnsupportedMode`] for a mode other than scalar/vector
    /// - [`VisualizeError::InvalidResolution`] unless `cells_per_degree` is finite and positive
    /// - [`VisualizeError::Io`] if a directory cannot be created
    /// - [`VisualizeError::Catalog`] if a dataset cannot be loaded
    /// - [`VisualizeError::DatasetCountMismatch`] if the dataset count does not fit the mode
    /// - [`VisualizeError::MissingComponents`] / [`VisualizeError::UnknownComponent`]
    ///   if vector roles are absent or name unregistered datasets
    pub fn new(config: &TaskConfig, decoder: &dyn GridDecoder) -> VisualizeResult<Self> {
        let mode: RenderMode = config.mode.parse()?;
        info!("Task '{}' in {} mode", config.task_name, mode);
        if !(config.cells_per_degree.is_finite() && config.cells_per_degree > 0.0) {
            return Err(VisualizeError::InvalidResolution(config.cells_per_degree));
        }

        let task_dir = config.task_dir();
        let frame_dir = task_dir.join(FRAME_DIR);
        let animation_dir = task_dir.join(ANIMATION_DIR);
        for dir in [&task_dir, &frame_dir, &animation_dir] {
            create_dir(dir)?;
        }

        let catalog = Catalog::build(
            &config.data_paths,
            config.time_steps.as_ref(),
            config.variables.as_ref(),
            GridIndexer::new(config.cells_per_degree),
            decoder,
        )?;

        let expected = mode.required_datasets();
        if catalog.len() != expected {
            return Err(VisualizeError::DatasetCountMismatch {
                mode,
                expected,
                found: catalog.len(),
            });
        }

        let layers = resolve_layers(mode, &catalog, config.components.as_ref())?;
        debug!("Layer assignment: {:?}", layers);

        Ok(Visualizer {
            task_name: config.task_name.clone(),
            mode,
            frame_dir,
            animation_dir,
            catalog,
            layers,
            renderer: FrameRenderer::new(config.render.clone()),
            fps: config.fps,
        })
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn frame_dir(&self) -> &Path {
        &self.frame_dir
    }

    pub fn animation_dir(&self) -> &Path {
        &self.animation_dir
    }

    /// `<animation_dir>/<task_name>.gif`
    pub fn animation_path(&self) -> PathBuf {
        self.animation_dir.join(format!("{}.gif", self.task_name))
    }

    /// Number of frames the task produces. In vector mode this is the
    /// smallest step count among the three components.
    pub fn frame_count(&self) -> VisualizeResult<usize> {
        let count = match &self.layers {
            Layers::Scalar(name) => self.catalog.time_step_count(name)?,
            Layers::Vector { u, v, w } => {
                let counts = [
                    self.catalog.time_step_count(u)?,
                    self.catalog.time_step_count(v)?,
                    self.catalog.time_step_count(w)?,
                ];
                if counts.iter().any(|&c| c != counts[0]) {
                    warn!(
                        "Vector components declare different step counts {:?}; rendering the common prefix",
                        counts
                    );
                }
                counts.into_iter().min().unwrap_or(0)
            }
        };
        Ok(count)
    }

    /// Renders every time step into `<frame_dir>/<t>.png`.
    ///
    /// # Arguments
    ///
    /// * `region` - Region applied to every mesh
    /// * `title` - Optional caption; frames are reported as `"<title> at timestep <t>"`
    ///
    /// # Returns
    ///
    /// The frame paths in time order.
    pub fn populate_frames(&self, region: &RegionQuery, title: Option<&str>) -> VisualizeResult<Vec<PathBuf>> {
        let count = self.frame_count()?;
        let options = self.renderer.options();
        info!(
            "Rendering {} frame(s) of {}x{} into {}",
            count,
            options.width,
            options.height,
            self.frame_dir.display()
        );

        let progress = ProgressBar::new(count as u64);
        progress.set_style(ProgressStyle::default_bar());

        let mut frames = Vec::with_capacity(count);
        for time_step in 0..count {
            let img = match &self.layers {
                Layers::Scalar(name) => {
                    let mesh = self.catalog.get_mesh(name, time_step, region)?;
                    self.renderer.render_scalar(&mesh)?
                }
                Layers::Vector { u, v, w } => {
                    let u = self.catalog.get_mesh(u, time_step, region)?;
                    let v = self.catalog.get_mesh(v, time_step, region)?;
                    let w = self.catalog.get_mesh(w, time_step, region)?;
                    self.renderer.render_vector(&u, &v, &w)?
                }
            };
            let path = self.renderer.save_frame(&img, &self.frame_dir, time_step)?;
            match title {
                Some(title) => debug!("{} at timestep {} -> {}", title, time_step, path.display()),
                None => debug!("timestep {} -> {}", time_step, path.display()),
            }
            frames.push(path);
            progress.inc(1);
        }
        progress.finish_and_clear();

        info!("{} frame(s) written", frames.len());
        Ok(frames)
    }

    /// Stitches `frames/0.png .. frames/{n-1}.png` into the task animation.
    ///
    /// # Errors
    ///
    /// [`VisualizeError::MissingFrame`] if any expected frame does not exist.
    pub fn animate_from_frames(&self) -> VisualizeResult<PathBuf> {
        let count = self.frame_count()?;
        let frames: Vec<PathBuf> = (0..count)
            .map(|t| frame_path(&self.frame_dir, t))
            .collect();
        if let Some(missing) = frames.iter().find(|p| !p.is_file()) {
            return Err(VisualizeError::MissingFrame(missing.clone()));
        }

        let output = self.animation_path();
        animate_frames(&frames, &output, self.fps)?;
        Ok(output)
    }

    /// Renders all frames, then the animation. Returns the animation path.
    pub fn run(&self, region: &RegionQuery, title: Option<&str>) -> VisualizeResult<PathBuf> {
        self.populate_frames(region, title)?;
        self.animate_from_frames()
    }
}

fn create_dir(path: &Path) -> VisualizeResult<()> {
    if path.is_dir() {
        info!("Directory {} already exists", path.display());
    } else {
        fs::create_dir_all(path)?;
        info!("Created directory {}", path.display());
    }
    Ok(())
}

fn resolve_layers(
    mode: RenderMode,
    catalog: &Catalog,
    components: Option<&VectorComponents>,
) -> VisualizeResult<Layers> {
    match mode {
        RenderMode::Scalar => {
            if components.is_some() {
                warn!("Ignoring vector components in scalar mode");
            }
            let name = catalog
                .names()
                .next()
                .ok_or(VisualizeError::DatasetCountMismatch {
                    mode,
                    expected: 1,
                    found: 0,
                })?;
            Ok(Layers::Scalar(name.to_string()))
        }
        RenderMode::Vector => {
            let components = components.ok_or(VisualizeError::MissingComponents)?;
            let role = |role: &'static str, name: &String| {
                if catalog.contains(name) {
                    Ok(name.clone())
                } else {
                    Err(VisualizeError::UnknownComponent {
                        role,
                        name: name.clone(),
                    })
                }
            };
            Ok(Layers::Vector {
                u: role("u_component", &components.u_component)?,
                v: role("v_component", &components.v_component)?,
                w: role("w_component", &components.w_component)?,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_mode_parsing() {
        assert_eq!("scalar".parse::<RenderMode>().unwrap(), RenderMode::Scalar);
        assert_eq!("Vector".parse::<RenderMode>().unwrap(), RenderMode::Vector);
        assert!(matches!(
            "contour".parse::<RenderMode>(),
            Err(VisualizeError::UnsupportedMode(m)) if m == "contour"
        ));
    }

    #[test]
    fn test_required_datasets() {
        assert_eq!(RenderMode::Scalar.required_datasets(), 1);
        assert_eq!(RenderMode::Vector.required_datasets(), 3);
    }

    #[test]
    fn test_create_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("task").join(FRAME_DIR);
        create_dir(&target).unwrap();
        create_dir(&target).unwrap();
        assert!(target.is_dir());
    }
}
