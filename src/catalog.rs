//! # Dataset Catalog
//!
//! A write-once registry mapping dataset names to decoded grids, with a single
//! query operation, [`Catalog::get_mesh`], that extracts the (optionally
//! region-restricted) latitude/longitude/field triple for one time step.
//!
//! A [`Catalog`] can only be obtained through [`Catalog::build`], so every
//! catalog value is fully built; there is no way to add or remove datasets
//! afterwards.

use crate::decode::{DecodeError, DecodedGrid, GridDecoder};
use crate::grid::{GridIndexer, RegionError, RegionQuery, RegionSlice};
use log::{debug, info, warn};
use ndarray::{Array1, Array2, Axis, s};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building or querying a catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("time step {time_step} out of bound for dataset '{name}' ({time_step_count} steps declared)")]
    OutOfRange {
        name: String,
        time_step: usize,
        time_step_count: usize,
    },

    #[error("dataset '{0}' is not registered in the catalog")]
    UnknownDataset(String),

    #[error("no time step count declared for dataset '{0}'")]
    MissingTimeSteps(String),

    #[error("dataset '{name}' declares {declared} time steps but its data holds only {available}")]
    TimeStepsExceedData {
        name: String,
        declared: usize,
        available: usize,
    },

    #[error("dataset '{name}' does not fit the configured grid: {detail}")]
    GridMismatch { name: String, detail: String },

    #[error("failed to decode dataset '{name}': {source}")]
    Decode {
        name: String,
        #[source]
        source: DecodeError,
    },

    #[error(transparent)]
    Region(#[from] RegionError),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// One registered climate variable: its decoded grid plus metadata.
#[derive(Debug, Clone)]
pub struct NamedGrid {
    grid_data: DecodedGrid,
    time_step_count: usize,
    variable_name: String,
}

impl NamedGrid {
    pub fn grid_data(&self) -> &DecodedGrid {
        &self.grid_data
    }

    pub fn time_step_count(&self) -> usize {
        self.time_step_count
    }

    pub fn variable_name(&self) -> &str {
        &self.variable_name
    }
}

/// The `(latitude, longitude, field)` triple handed to a renderer.
///
/// `latitude.len() == field.nrows()` and `longitude.len() == field.ncols()`
/// always hold.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub latitude: Array1<f64>,
    pub longitude: Array1<f64>,
    pub field: Array2<f32>,
}

impl Mesh {
    pub fn shape(&self) -> (usize, usize) {
        self.field.dim()
    }

    pub fn is_empty(&self) -> bool {
        self.field.is_empty()
    }

    /// Finite `(min, max)` of the field, ignoring NaN cells.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        finite_range(&self.field)
    }
}

pub(crate) fn finite_range(field: &Array2<f32>) -> Option<(f32, f32)> {
    field
        .iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Registry of named datasets, immutable once built.
#[derive(Debug, Clone)]
pub struct Catalog {
    datasets: BTreeMap<String, NamedGrid>,
    indexer: GridIndexer,
}

impl Catalog {
    /// Decodes every dataset and registers it under its name.
    ///
    /// The build fails fast: the first dataset that cannot be decoded or
    /// validated aborts the whole catalog.
    ///
    /// # Arguments
    ///
    /// * `data_paths` - Dataset name to source container path
    /// * `time_steps` - Optional dataset name to declared step count; when
    ///   absent every dataset gets a single step
    /// * `variables` - Optional dataset name to the field name inside the
    ///   container; defaults to the dataset name itself
    /// * `indexer` - Grid indexer used for region queries
    /// * `decoder` - Decoder collaborator used to read every container
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Decode`] if a container cannot be decoded
    /// - [`CatalogError::MissingTimeSteps`] if `time_steps` is given but lacks a name
    /// - [`CatalogError::TimeStepsExceedData`] if a declared count exceeds the data
    /// - [`CatalogError::GridMismatch`] if a grid does not start at 90°N/180°W
    ///   with the spacing of `indexer`
    pub fn build(
        data_paths: &BTreeMap<String, PathBuf>,
        time_steps: Option<&BTreeMap<String, usize>>,
        variables: Option<&BTreeMap<String, String>>,
        indexer: GridIndexer,
        decoder: &dyn GridDecoder,
    ) -> CatalogResult<Catalog> {
        let mut datasets = BTreeMap::new();

        for (name, path) in data_paths {
            info!("Preparing dataset '{}' from {}", name, path.display());

            let variable_name = variables
                .and_then(|v| v.get(name))
                .cloned()
                .unwrap_or_else(|| name.clone());

            let time_step_count = match time_steps {
                None => 1,
                Some(steps) => *steps
                    .get(name)
                    .ok_or_else(|| CatalogError::MissingTimeSteps(name.clone()))?,
            };

            let grid_data =
                decoder
                    .decode(path, &variable_name)
                    .map_err(|source| CatalogError::Decode {
                        name: name.clone(),
                        source,
                    })?;

            let available = grid_data.time_len();
            if time_step_count > available {
                return Err(CatalogError::TimeStepsExceedData {
                    name: name.clone(),
                    declared: time_step_count,
                    available,
                });
            }
            check_alignment(name, &grid_data, &indexer)?;

            let (n_lat, n_lon) = grid_data.spatial_shape();
            debug!(
                "Dataset '{}' ({}): {} of {} steps on a {}x{} grid",
                name, variable_name, time_step_count, available, n_lat, n_lon
            );

            datasets.insert(
                name.clone(),
                NamedGrid {
                    grid_data,
                    time_step_count,
                    variable_name,
                },
            );
        }

        Ok(Catalog { datasets, indexer })
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// Registered dataset names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&NamedGrid> {
        self.datasets.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.datasets.contains_key(name)
    }

    pub fn time_step_count(&self, name: &str) -> CatalogResult<usize> {
        self.lookup(name).map(NamedGrid::time_step_count)
    }

    pub fn indexer(&self) -> &GridIndexer {
        &self.indexer
    }

    fn lookup(&self, name: &str) -> CatalogResult<&NamedGrid> {
        self.datasets
            .get(name)
            .ok_or_else(|| CatalogError::UnknownDataset(name.to_string()))
    }

    /// Extracts the mesh of dataset `name` at `time_step`, restricted to `region`.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::UnknownDataset`] if `name` is not registered
    /// - [`CatalogError::OutOfRange`] if `time_step >= time_step_count`
    /// - [`CatalogError::Region`] if a bounded region fails validation
    ///
    /// # Examples
    ///
    /// ```rust
    /// use climviz::catalog::Catalog;
    /// use climviz::decode::{DecodedGrid, MemoryDecoder};
    /// use climviz::grid::{GridIndexer, RegionQuery};
    /// use ndarray::{Array1, Array3};
    /// use std::collections::BTreeMap;
    ///
    /// let grid = DecodedGrid::new(
    ///     Array1::linspace(90.0, -90.0, 181),
    ///     Array1::linspace(-180.0, 179.0, 360),
    ///     Array3::zeros((2, 181, 360)),
    /// )?;
    /// let decoder = MemoryDecoder::new().with_grid("t2m.nc", grid);
    /// let paths = BTreeMap::from([("t2m".to_string(), "t2m.nc".into())]);
    /// let steps = BTreeMap::from([("t2m".to_string(), 2)]);
    /// let catalog = Catalog::build(&paths, Some(&steps), None, GridIndexer::new(1.0), &decoder)?;
    ///
    /// let mesh = catalog.get_mesh("t2m", 1, &RegionQuery::bounded(0.0, 0.0, 10.0, 20.0)?)?;
    /// assert_eq!(mesh.shape(), (20, 40));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn get_mesh(&self, name: &str, time_step: usize, region: &RegionQuery) -> CatalogResult<Mesh> {
        let dataset = self.lookup(name)?;
        if time_step >= dataset.time_step_count {
            return Err(CatalogError::OutOfRange {
                name: name.to_string(),
                time_step,
                time_step_count: dataset.time_step_count,
            });
        }
        region.validate()?;

        let grid = &dataset.grid_data;
        let layer = grid.values.index_axis(Axis(0), time_step);

        let mesh = match *region {
            RegionQuery::Whole => Mesh {
                latitude: grid.latitude.clone(),
                longitude: grid.longitude.clone(),
                field: layer.to_owned(),
            },
            RegionQuery::Bounded {
                center_lat,
                center_lon,
                half_height,
                half_width,
            } => {
                let (n_lat, n_lon) = grid.spatial_shape();
                let slice = self
                    .indexer
                    .region_slice(center_lat, center_lon, half_height, half_width)
                    .clamp_to(n_lat, n_lon);
                if slice.is_empty() {
                    warn!(
                        "Region around ({}, {}) selects no cells of '{}'",
                        center_lat, center_lon, name
                    );
                } else {
                    debug!(
                        "Region around ({}, {}) selects {:?} cells",
                        center_lat,
                        center_lon,
                        slice.shape()
                    );
                }
                let RegionSlice { rows, cols } = slice;

                Mesh {
                    latitude: grid.latitude.slice(s![rows.clone()]).to_owned(),
                    longitude: grid.longitude.slice(s![cols.clone()]).to_owned(),
                    field: layer.slice(s![rows, cols]).to_owned(),
                }
            }
        };

        debug!(
            "Mesh for '{}' at step {}: {:?}",
            name,
            time_step,
            mesh.shape()
        );
        Ok(mesh)
    }
}

/// Checks that `grid` lies on the implicit global grid of `indexer`: row 0 at
/// 90°N, column 0 at 180°W and both axes spaced `1 / cells_per_degree` apart.
fn check_alignment(name: &str, grid: &DecodedGrid, indexer: &GridIndexer) -> CatalogResult<()> {
    let spacing = 1.0 / indexer.cells_per_degree();
    let tolerance = spacing * 0.01;
    let mismatch = |detail: String| CatalogError::GridMismatch {
        name: name.to_string(),
        detail,
    };

    let lat = &grid.latitude;
    let lon = &grid.longitude;
    if let Some(&first) = lat.first()
        && (first - 90.0).abs() > tolerance
    {
        return Err(mismatch(format!("first latitude is {}, expected 90", first)));
    }
    if let Some(&first) = lon.first()
        && (first + 180.0).abs() > tolerance
    {
        return Err(mismatch(format!("first longitude is {}, expected -180", first)));
    }
    if lat.len() > 1 && (lat[0] - lat[1] - spacing).abs() > tolerance {
        return Err(mismatch(format!(
            "latitude spacing is {}°, expected {}°",
            lat[0] - lat[1],
            spacing
        )));
    }
    if lon.len() > 1 && (lon[1] - lon[0] - spacing).abs() > tolerance {
        return Err(mismatch(format!(
            "longitude spacing is {}°, expected {}°",
            lon[1] - lon[0],
            spacing
        )));
    }
    Ok(())
}
