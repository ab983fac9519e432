//! # Grid Decoding
//!
//! Decoders turn a gridded meteorological container into a [`DecodedGrid`]:
//! 1-D latitude and longitude coordinates plus a `[time, lat, lon]` value cube.
//!
//! ## Supported Containers
//!
//! - **GRIB2** via the `grib` crate ([`GribDecoder`]). Submessages carrying the
//!   requested parameter are read as time steps, in file order.
//! - **NetCDF** via the `netcdf` crate ([`NetcdfDecoder`]). The named variable is
//!   read as `[lat, lon]` or `[time, lat, lon]`, with CF packing applied.
//!
//! [`AutoDecoder`] picks one of the two from the file extension.
//!
//! All decoders normalise orientation so that the implicit global grid used by
//! [`crate::grid::GridIndexer`] holds: latitude runs north to south and
//! longitude runs west to east starting at -180°.

use grib::codetables::{CodeTable4_2, Lookup};
use log::{debug, warn};
use ndarray::{Array1, Array3, Axis, s};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while decoding a container
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("NetCDF error: {0}")]
    Netcdf(#[from] netcdf::Error),

    #[error("GRIB error: {0}")]
    Grib(String),

    #[error("Unsupported container format: {0}")]
    UnsupportedFormat(String),

    #[error("Variable '{variable}' not found in {path}")]
    MissingVariable { variable: String, path: String },

    #[error("Variable '{variable}' in {path} is ambiguous: {detail}")]
    AmbiguousVariable {
        variable: String,
        path: String,
        detail: String,
    },

    #[error("No {axis} coordinate found in {path}")]
    MissingCoordinate { axis: &'static str, path: String },

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("No grid data in {0}")]
    EmptyGrid(String),
}

pub type DecodeResult<T> = Result<T, DecodeError>;

/// An in-memory grid indexed `[time, lat, lon]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedGrid {
    pub latitude: Array1<f64>,
    pub longitude: Array1<f64>,
    pub values: Array3<f32>,
}

impl DecodedGrid {
    /// Validates the coordinate lengths against the value cube and normalises
    /// the orientation (north-first rows, columns starting at -180°).
    pub fn new(
        latitude: Array1<f64>,
        longitude: Array1<f64>,
        values: Array3<f32>,
    ) -> DecodeResult<Self> {
        let (_, n_lat, n_lon) = values.dim();
        if latitude.len() != n_lat || longitude.len() != n_lon {
            return Err(DecodeError::ShapeMismatch(format!(
                "coordinates are {}x{} but values are {:?}",
                latitude.len(),
                longitude.len(),
                values.shape()
            )));
        }

        let mut grid = DecodedGrid {
            latitude,
            longitude,
            values,
        };
        grid.normalize_latitude();
        grid.normalize_longitude();
        Ok(grid)
    }

    pub fn time_len(&self) -> usize {
        self.values.len_of(Axis(0))
    }

    /// `(lat, lon)` dimensions of a single time step.
    pub fn spatial_shape(&self) -> (usize, usize) {
        (self.latitude.len(), self.longitude.len())
    }

    fn normalize_latitude(&mut self) {
        let n = self.latitude.len();
        if n > 1 && self.latitude[0] < self.latitude[n - 1] {
            debug!("Latitude ascends, flipping rows to north-first order");
            self.latitude.invert_axis(Axis(0));
            self.values.invert_axis(Axis(1));
        }
    }

    fn normalize_longitude(&mut self) {
        let n = self.longitude.len();
        if n < 2 {
            return;
        }
        if (self.longitude[n - 1] - self.longitude[0] - 360.0).abs() < 1e-6 {
            debug!("Dropping closing longitude column that repeats the first");
            self.longitude = self.longitude.slice(s![..n - 1]).to_owned();
            self.values = self.values.slice(s![.., .., ..n - 1]).to_owned();
        }

        if self.longitude[0] < 0.0 || !self.longitude.iter().any(|&lon| lon > 180.0) {
            return;
        }
        debug!("Longitudes given in [0, 360), rolling columns to start at -180");

        let wrapped: Vec<f64> = self
            .longitude
            .iter()
            .map(|&lon| if lon >= 180.0 { lon - 360.0 } else { lon })
            .collect();
        let mut order: Vec<usize> = (0..wrapped.len()).collect();
        order.sort_by(|&a, &b| wrapped[a].total_cmp(&wrapped[b]));

        self.longitude = order.iter().map(|&i| wrapped[i]).collect();
        self.values = self.values.select(Axis(2), &order);
    }
}

/// Trait implemented by every container decoder.
pub trait GridDecoder {
    /// Decodes `variable` from the container at `path`.
    fn decode(&self, path: &Path, variable: &str) -> DecodeResult<DecodedGrid>;
}

/// GRIB2 decoder backed by the `grib` crate.
#[derive(Debug, Clone, Default)]
pub struct GribDecoder;

impl GridDecoder for GribDecoder {
    fn decode(&self, path: &Path, variable: &str) -> DecodeResult<DecodedGrid> {
        debug!("Opening GRIB2 file {} for '{}'", path.display(), variable);
        let reader = BufReader::new(File::open(path)?);
        let grib2 = grib::from_reader(reader).map_err(|e| DecodeError::Grib(e.to_string()))?;

        let submessages: Vec<_> = grib2.iter().collect();
        let fields: Vec<GribField> = submessages
            .iter()
            .map(|(_, submessage)| {
                let prod_def = submessage.prod_def();
                GribField::new(
                    submessage.indicator().discipline,
                    prod_def.parameter_category().unwrap_or(u8::MAX),
                    prod_def.parameter_number().unwrap_or(u8::MAX),
                    prod_def.fixed_surfaces().map(|(first, _)| first.value()),
                )
            })
            .collect();
        let selected = select_fields(&fields, variable, path)?;

        let mut coordinates: Option<(Vec<f64>, Vec<f64>)> = None;
        let mut layers: Vec<f32> = Vec::new();
        let mut n_steps = 0;

        let chosen = submessages
            .into_iter()
            .enumerate()
            .filter(|(idx, _)| selected.contains(idx));
        for (_, ((message_idx, submessage_idx), submessage)) in chosen {
            if coordinates.is_none() {
                let points: Vec<(f32, f32)> = submessage
                    .latlons()
                    .map_err(|e| DecodeError::Grib(e.to_string()))?
                    .collect();
                coordinates = Some(split_regular_latlons(&points)?);
            }

            let decoder = grib::Grib2SubmessageDecoder::from(submessage)
                .map_err(|e| DecodeError::Grib(e.to_string()))?;
            let values: Vec<f32> = decoder
                .dispatch()
                .map_err(|e| DecodeError::Grib(e.to_string()))?
                .collect();

            if let Some((lat, lon)) = &coordinates
                && values.len() != lat.len() * lon.len()
            {
                return Err(DecodeError::ShapeMismatch(format!(
                    "submessage ({}, {}) has {} values, grid has {}x{}",
                    message_idx,
                    submessage_idx,
                    values.len(),
                    lat.len(),
                    lon.len()
                )));
            }
            layers.extend(values);
            n_steps += 1;
        }

        let (lat, lon) =
            coordinates.ok_or_else(|| DecodeError::EmptyGrid(path.display().to_string()))?;
        debug!(
            "Decoded {} GRIB2 steps of '{}' on a {}x{} grid",
            n_steps,
            fields[selected[0]].name,
            lat.len(),
            lon.len()
        );

        let values = Array3::from_shape_vec((n_steps, lat.len(), lon.len()), layers)
            .map_err(|e| DecodeError::ShapeMismatch(e.to_string()))?;
        DecodedGrid::new(Array1::from(lat), Array1::from(lon), values)
    }
}

/// Parameter and level carried by one GRIB2 submessage.
#[derive(Debug, Clone, PartialEq)]
struct GribField {
    discipline: u8,
    category: u8,
    number: u8,
    level: Option<f64>,
    name: String,
}

impl GribField {
    fn new(discipline: u8, category: u8, number: u8, level: Option<f64>) -> Self {
        let name = CodeTable4_2::new(discipline, category)
            .lookup(usize::from(number))
            .to_string();
        GribField {
            discipline,
            category,
            number,
            level,
            name,
        }
    }

    /// `<discipline>_<category>_<number>`, e.g. `0_2_2` for the u wind.
    fn code(&self) -> String {
        format!("{}_{}_{}", self.discipline, self.category, self.number)
    }

    /// A variable matches by parameter code or by code table name, ignoring case.
    fn matches(&self, variable: &str) -> bool {
        let variable = variable.trim();
        variable == self.code() || variable.eq_ignore_ascii_case(&self.name)
    }

    fn same_parameter(&self, other: &GribField) -> bool {
        (self.discipline, self.category, self.number)
            == (other.discipline, other.category, other.number)
    }

    fn same_level(&self, other: &GribField) -> bool {
        match (self.level, other.level) {
            (Some(a), Some(b)) => a == b || (a.is_nan() && b.is_nan()),
            (None, None) => true,
            _ => false,
        }
    }
}

/// Picks the submessages that make up `variable`, as indices into `fields`.
///
/// Submessages whose parameter matches `variable` are selected. A file
/// holding a single parameter on a single level is taken whole, so a dataset
/// name like `u100` still reads a file of 100 m u wind. The selection must sit
/// on one level; otherwise levels would be read as time steps.
fn select_fields(fields: &[GribField], variable: &str, path: &Path) -> DecodeResult<Vec<usize>> {
    let Some(first) = fields.first() else {
        return Err(DecodeError::EmptyGrid(path.display().to_string()));
    };

    let mut selected: Vec<usize> = fields
        .iter()
        .enumerate()
        .filter(|(_, field)| field.matches(variable))
        .map(|(idx, _)| idx)
        .collect();

    if selected.is_empty() {
        let uniform = fields
            .iter()
            .all(|field| field.same_parameter(first) && field.same_level(first));
        if !uniform {
            let mut available: Vec<String> = fields
                .iter()
                .map(|field| format!("{} ({})", field.code(), field.name))
                .collect();
            available.sort();
            available.dedup();
            warn!(
                "'{}' matches no parameter in {}; available: {}",
                variable,
                path.display(),
                available.join(", ")
            );
            return Err(DecodeError::MissingVariable {
                variable: variable.to_string(),
                path: path.display().to_string(),
            });
        }
        debug!(
            "'{}' names no parameter; {} holds only {} ({})",
            variable,
            path.display(),
            first.code(),
            first.name
        );
        selected = (0..fields.len()).collect();
    }

    let head = &fields[selected[0]];
    if let Some(&other) = selected
        .iter()
        .find(|&&idx| !fields[idx].same_parameter(head) || !fields[idx].same_level(head))
    {
        return Err(DecodeError::AmbiguousVariable {
            variable: variable.to_string(),
            path: path.display().to_string(),
            detail: format!(
                "{} at level {:?} and {} at level {:?}",
                head.code(),
                head.level,
                fields[other].code(),
                fields[other].level
            ),
        });
    }
    Ok(selected)
}

/// Splits scan-ordered grid points of a regular lat/lon grid into the row
/// latitudes and the column longitudes.
fn split_regular_latlons(points: &[(f32, f32)]) -> DecodeResult<(Vec<f64>, Vec<f64>)> {
    let Some(&(first_lat, _)) = points.first() else {
        return Err(DecodeError::EmptyGrid("GRIB2 submessage without grid points".to_string()));
    };

    let n_lon = points.iter().take_while(|(lat, _)| *lat == first_lat).count();
    if points.len() % n_lon != 0 {
        return Err(DecodeError::ShapeMismatch(format!(
            "{} grid points do not form rows of {}; only regular lat/lon grids are supported",
            points.len(),
            n_lon
        )));
    }

    let latitude = points
        .iter()
        .step_by(n_lon)
        .map(|&(lat, _)| lat as f64)
        .collect();
    let longitude = points[..n_lon].iter().map(|&(_, lon)| lon as f64).collect();
    Ok((latitude, longitude))
}

const LATITUDE_NAMES: &[&str] = &["latitude", "lat"];
const LONGITUDE_NAMES: &[&str] = &["longitude", "lon"];

/// NetCDF decoder backed by the `netcdf` crate.
#[derive(Debug, Clone, Default)]
pub struct NetcdfDecoder;

impl GridDecoder for NetcdfDecoder {
    fn decode(&self, path: &Path, variable: &str) -> DecodeResult<DecodedGrid> {
        debug!("Opening NetCDF file {} for '{}'", path.display(), variable);
        let file = netcdf::open(path)?;
        let path_str = path.display().to_string();

        let latitude = read_coordinate(&file, LATITUDE_NAMES, "latitude", &path_str)?;
        let longitude = read_coordinate(&file, LONGITUDE_NAMES, "longitude", &path_str)?;

        let var = file
            .variable(variable)
            .ok_or_else(|| DecodeError::MissingVariable {
                variable: variable.to_string(),
                path: path_str.clone(),
            })?;

        let dims: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        let shape = match dims.as_slice() {
            [n_lat, n_lon] => (1, *n_lat, *n_lon),
            [n_time, n_lat, n_lon] => (*n_time, *n_lat, *n_lon),
            other => {
                return Err(DecodeError::ShapeMismatch(format!(
                    "variable '{}' has dimensions {:?}, expected [lat, lon] or [time, lat, lon]",
                    variable, other
                )));
            }
        };

        let mut raw: Vec<f32> = var.get_values::<f32, _>(..)?;
        apply_cf_packing(&var, &mut raw);

        let values = Array3::from_shape_vec(shape, raw)
            .map_err(|e| DecodeError::ShapeMismatch(e.to_string()))?;
        drop(var);
        file.close()?;

        DecodedGrid::new(Array1::from(latitude), Array1::from(longitude), values)
    }
}

fn read_coordinate(
    file: &netcdf::File,
    candidates: &[&str],
    axis: &'static str,
    path: &str,
) -> DecodeResult<Vec<f64>> {
    for name in candidates {
        if let Some(var) = file.variable(name) {
            return Ok(var.get_values::<f64, _>(..)?);
        }
    }
    Err(DecodeError::MissingCoordinate {
        axis,
        path: path.to_string(),
    })
}

fn numeric_attribute(var: &netcdf::Variable, name: &str) -> Option<f64> {
    match var.attribute(name)?.value().ok()? {
        netcdf::AttributeValue::Double(v) => Some(v),
        netcdf::AttributeValue::Float(v) => Some(v as f64),
        netcdf::AttributeValue::Int(v) => Some(v as f64),
        netcdf::AttributeValue::Short(v) => Some(v as f64),
        _ => None,
    }
}

/// Masks `_FillValue` cells to NaN and unpacks `scale_factor`/`add_offset`.
fn apply_cf_packing(var: &netcdf::Variable, values: &mut [f32]) {
    let fill = numeric_attribute(var, "_FillValue");
    let scale = numeric_attribute(var, "scale_factor").unwrap_or(1.0);
    let offset = numeric_attribute(var, "add_offset").unwrap_or(0.0);

    if fill.is_none() && scale == 1.0 && offset == 0.0 {
        return;
    }
    for v in values.iter_mut() {
        if fill.is_some_and(|f| (*v as f64) == f) {
            *v = f32::NAN;
        } else {
            *v = (*v as f64 * scale + offset) as f32;
        }
    }
}

/// Dispatches to [`GribDecoder`] or [`NetcdfDecoder`] by file extension.
#[derive(Debug, Clone, Default)]
pub struct AutoDecoder {
    grib: GribDecoder,
    netcdf: NetcdfDecoder,
}

impl AutoDecoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GridDecoder for AutoDecoder {
    fn decode(&self, path: &Path, variable: &str) -> DecodeResult<DecodedGrid> {
        match ContainerFormat::from_path(path)? {
            ContainerFormat::Grib => self.grib.decode(path, variable),
            ContainerFormat::Netcdf => self.netcdf.decode(path, variable),
        }
    }
}

/// Container formats recognised by [`AutoDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    Grib,
    Netcdf,
}

impl ContainerFormat {
    pub fn from_path(path: &Path) -> DecodeResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "grib" | "grib2" | "grb" | "grb2" => Ok(ContainerFormat::Grib),
            "nc" | "nc4" | "cdf" | "netcdf" => Ok(ContainerFormat::Netcdf),
            _ => Err(DecodeError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Decoder serving grids that are already in memory, keyed by path.
///
/// Useful when the grids come from another pipeline stage, and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryDecoder {
    grids: HashMap<PathBuf, DecodedGrid>,
}

impl MemoryDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<P: Into<PathBuf>>(&mut self, path: P, grid: DecodedGrid) {
        self.grids.insert(path.into(), grid);
    }

    pub fn with_grid<P: Into<PathBuf>>(mut self, path: P, grid: DecodedGrid) -> Self {
        self.insert(path, grid);
        self
    }
}

impl GridDecoder for MemoryDecoder {
    fn decode(&self, path: &Path, variable: &str) -> DecodeResult<DecodedGrid> {
        match self.grids.get(path) {
            Some(grid) => Ok(grid.clone()),
            None => {
                warn!("No in-memory grid registered for {}", path.display());
                Err(DecodeError::MissingVariable {
                    variable: variable.to_string(),
                    path: path.display().to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_container_format_from_extension() {
        assert_eq!(
            ContainerFormat::from_path(Path::new("data/u100.grib")).unwrap(),
            ContainerFormat::Grib
        );
        assert_eq!(
            ContainerFormat::from_path(Path::new("data/U100.GRB2")).unwrap(),
            ContainerFormat::Grib
        );
        assert_eq!(
            ContainerFormat::from_path(Path::new("t2m.nc")).unwrap(),
            ContainerFormat::Netcdf
        );
        assert!(ContainerFormat::from_path(Path::new("notes.txt")).is_err());
        assert!(ContainerFormat::from_path(Path::new("no_extension")).is_err());
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let result = DecodedGrid::new(
            array![10.0, 0.0],
            array![0.0, 1.0, 2.0],
            Array3::zeros((1, 2, 2)),
        );
        assert!(matches!(result, Err(DecodeError::ShapeMismatch(_))));
    }

    #[test]
    fn test_ascending_latitude_is_flipped() {
        let values = Array3::from_shape_vec((1, 3, 1), vec![1.0, 2.0, 3.0]).unwrap();
        let grid = DecodedGrid::new(array![-10.0, 0.0, 10.0], array![0.0], values).unwrap();

        assert_eq!(grid.latitude.to_vec(), vec![10.0, 0.0, -10.0]);
        assert_eq!(grid.values[[0, 0, 0]], 3.0);
        assert_eq!(grid.values[[0, 2, 0]], 1.0);
    }

    #[test]
    fn test_0_360_longitudes_are_rolled() {
        let values = Array3::from_shape_vec((1, 1, 4), vec![0.0, 90.0, 180.0, 270.0]).unwrap();
        let grid = DecodedGrid::new(array![0.0], array![0.0, 90.0, 180.0, 270.0], values).unwrap();

        assert_eq!(grid.longitude.to_vec(), vec![-180.0, -90.0, 0.0, 90.0]);
        // values follow their longitudes
        assert_eq!(
            grid.values.index_axis(Axis(0), 0).row(0).to_vec(),
            vec![180.0, 270.0, 0.0, 90.0]
        );
    }

    #[test]
    fn test_closing_180_column_is_dropped() {
        let values =
            Array3::from_shape_vec((1, 1, 5), vec![1.0, 2.0, 3.0, 4.0, 1.0]).unwrap();
        let grid = DecodedGrid::new(
            array![0.0],
            array![-180.0, -90.0, 0.0, 90.0, 180.0],
            values,
        )
        .unwrap();

        assert_eq!(grid.longitude.to_vec(), vec![-180.0, -90.0, 0.0, 90.0]);
        assert_eq!(
            grid.values.index_axis(Axis(0), 0).row(0).to_vec(),
            vec![1.0, 2.0, 3.0, 4.0]
        );
    }

    #[test]
    fn test_closing_360_column_is_dropped_before_rolling() {
        let values =
            Array3::from_shape_vec((1, 1, 5), vec![0.0, 90.0, 180.0, 270.0, 360.0]).unwrap();
        let grid = DecodedGrid::new(
            array![0.0],
            array![0.0, 90.0, 180.0, 270.0, 360.0],
            values,
        )
        .unwrap();

        assert_eq!(grid.longitude.to_vec(), vec![-180.0, -90.0, 0.0, 90.0]);
        assert_eq!(
            grid.values.index_axis(Axis(0), 0).row(0).to_vec(),
            vec![180.0, 270.0, 0.0, 90.0]
        );
    }

    #[test]
    fn test_longitudes_west_of_greenwich_are_not_rolled() {
        let values = Array3::from_shape_vec((1, 1, 3), vec![1.0, 2.0, 3.0]).unwrap();
        let grid =
            DecodedGrid::new(array![0.0], array![-170.0, 0.0, 170.0], values).unwrap();
        assert_eq!(grid.longitude.to_vec(), vec![-170.0, 0.0, 170.0]);
    }

    fn wind_fields() -> Vec<GribField> {
        // two steps of u and v at 100 m, interleaved as ERA5 writes them
        (0..2)
            .flat_map(|_| {
                [
                    GribField::new(0, 2, 2, Some(100.0)),
                    GribField::new(0, 2, 3, Some(100.0)),
                ]
            })
            .collect()
    }

    #[test]
    fn test_grib_fields_selected_by_code() {
        let fields = wind_fields();
        let path = Path::new("wind.grib");
        assert_eq!(select_fields(&fields, "0_2_2", path).unwrap(), vec![0, 2]);
        assert_eq!(select_fields(&fields, "0_2_3", path).unwrap(), vec![1, 3]);
    }

    #[test]
    fn test_grib_fields_selected_by_name_ignoring_case() {
        let fields = wind_fields();
        let shouted = fields[1].name.to_uppercase();
        assert_eq!(
            select_fields(&fields, &shouted, Path::new("wind.grib")).unwrap(),
            vec![1, 3]
        );
    }

    #[test]
    fn test_grib_unknown_variable_in_mixed_file() {
        let result = select_fields(&wind_fields(), "u100", Path::new("wind.grib"));
        assert!(matches!(
            result,
            Err(DecodeError::MissingVariable { variable, .. }) if variable == "u100"
        ));
    }

    #[test]
    fn test_grib_single_parameter_file_accepts_any_label() {
        let fields = vec![GribField::new(0, 2, 2, Some(100.0)); 3];
        assert_eq!(
            select_fields(&fields, "u100", Path::new("u100.grib")).unwrap(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_grib_levels_are_not_read_as_steps() {
        let fields = vec![
            GribField::new(0, 2, 2, Some(10.0)),
            GribField::new(0, 2, 2, Some(100.0)),
        ];
        assert!(matches!(
            select_fields(&fields, "0_2_2", Path::new("u.grib")),
            Err(DecodeError::AmbiguousVariable { .. })
        ));
        assert!(matches!(
            select_fields(&[], "0_2_2", Path::new("empty.grib")),
            Err(DecodeError::EmptyGrid(_))
        ));
    }

    #[test]
    fn test_split_regular_latlons() {
        let points = vec![(10.0, 0.0), (10.0, 1.0), (10.0, 2.0), (9.0, 0.0), (9.0, 1.0), (9.0, 2.0)];
        let (lat, lon) = split_regular_latlons(&points).unwrap();
        assert_eq!(lat, vec![10.0, 9.0]);
        assert_eq!(lon, vec![0.0, 1.0, 2.0]);

        let ragged = vec![(10.0, 0.0), (10.0, 1.0), (9.0, 0.0)];
        assert!(split_regular_latlons(&ragged).is_err());
        assert!(split_regular_latlons(&[]).is_err());
    }

    #[test]
    fn test_memory_decoder() {
        let grid = DecodedGrid::new(array![0.0], array![0.0], Array3::zeros((2, 1, 1))).unwrap();
        let decoder = MemoryDecoder::new().with_grid("mem://u100", grid.clone());

        assert_eq!(decoder.decode(Path::new("mem://u100"), "u100").unwrap(), grid);
        assert!(decoder.decode(Path::new("mem://v100"), "v100").is_err());
    }
}
