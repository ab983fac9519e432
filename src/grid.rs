//! # Grid Indexing
//!
//! Coordinate-to-index arithmetic over a fixed-resolution global latitude/longitude
//! grid, plus the [`RegionQuery`] value object used to request bounded subregions.
//!
//! The grid is implicit: row 0 is the northern edge (90°N) and column 0 is the
//! western edge (180°W). Indices grow southwards and eastwards respectively.
//!
//! ## Example
//!
//! ```rust
//! use climviz::grid::GridIndexer;
//!
//! let indexer = GridIndexer::default(); // 0.25° resolution
//! let slice = indexer.region_slice(40.0, -90.0, 10.0, 10.0);
//! assert_eq!(slice.rows, 160..240);
//! assert_eq!(slice.cols, 320..400);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::Range;
use thiserror::Error;

/// Cells per degree of the reanalysis grids this crate was built around (0.25°).
pub const DEFAULT_CELLS_PER_DEGREE: f64 = 4.0;

/// Errors raised while building a [`RegionQuery`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegionError {
    #[error("region information ambiguous: {supplied} of lat/lon/dlat/dlon supplied, expected all or none")]
    AmbiguousRegion { supplied: usize },

    #[error("invalid region: {0}")]
    InvalidRegion(String),

    #[error("region spans longitudes {west}..{east} and crosses the antimeridian; split it into two queries")]
    CrossesAntimeridian { west: f64, east: f64 },
}

/// Pure coordinate-to-index mapping for a global grid at constant resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridIndexer {
    cells_per_degree: f64,
}

impl Default for GridIndexer {
    fn default() -> Self {
        GridIndexer {
            cells_per_degree: DEFAULT_CELLS_PER_DEGREE,
        }
    }
}

/// Half-open row and column ranges selected by [`GridIndexer::region_slice`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSlice {
    pub rows: Range<usize>,
    pub cols: Range<usize>,
}

impl RegionSlice {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.cols.is_empty()
    }

    /// Shape of the selection as `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.cols.len())
    }

    /// Restricts both ranges to an actual array of `n_rows` x `n_cols`.
    pub fn clamp_to(&self, n_rows: usize, n_cols: usize) -> RegionSlice {
        let clamp = |r: &Range<usize>, n: usize| {
            let end = r.end.min(n);
            r.start.min(end)..end
        };
        RegionSlice {
            rows: clamp(&self.rows, n_rows),
            cols: clamp(&self.cols, n_cols),
        }
    }
}

impl GridIndexer {
    /// Creates an indexer for a grid with `cells_per_degree` cells per degree.
    ///
    /// A 0.25° grid has 4 cells per degree, a 1° grid has 1.
    pub fn new(cells_per_degree: f64) -> Self {
        GridIndexer { cells_per_degree }
    }

    pub fn cells_per_degree(&self) -> f64 {
        self.cells_per_degree
    }

    /// Nominal `(rows, cols)` of the global grid, poles included.
    pub fn grid_shape(&self) -> (usize, usize) {
        let rows = (180.0 * self.cells_per_degree).floor() as usize + 1;
        let cols = (360.0 * self.cells_per_degree).floor() as usize;
        (rows, cols)
    }

    /// Maps a latitude to its row index, `floor((90 - lat) * cells_per_degree)`.
    ///
    /// Row 0 is the north pole, so the index decreases as latitude increases.
    /// No bounds checking happens here: latitudes outside [-90, 90] produce
    /// indices outside the grid, and callers clamp before converting.
    pub fn latitude_to_index(&self, lat: f64) -> i64 {
        ((90.0 - lat) * self.cells_per_degree).floor() as i64
    }

    /// Maps a longitude to its column index, `floor((lon + 180) * cells_per_degree)`.
    pub fn longitude_to_index(&self, lon: f64) -> i64 {
        ((lon + 180.0) * self.cells_per_degree).floor() as i64
    }

    /// Computes the row/column ranges covering
    /// `[center_lat - half_height, center_lat + half_height] x [center_lon - half_width, center_lon + half_width]`.
    ///
    /// The bounds are clamped to the global extent before conversion, so the
    /// result always lies inside the grid. Boxes reaching past the poles are
    /// cut there; [`RegionQuery::validate`] rejects boxes reaching past ±180°.
    ///
    /// Because row indices grow southwards, the *maximum* latitude yields the
    /// start of the row range.
    ///
    /// # Arguments
    ///
    /// * `center_lat` - Latitude of the region centre, degrees north
    /// * `center_lon` - Longitude of the region centre, degrees east
    /// * `half_height` - Half of the latitude extent, degrees
    /// * `half_width` - Half of the longitude extent, degrees
    ///
    /// # Returns
    ///
    /// The selected ranges. A zero half extent yields an empty range, which is
    /// not an error.
    pub fn region_slice(
        &self,
        center_lat: f64,
        center_lon: f64,
        half_height: f64,
        half_width: f64,
    ) -> RegionSlice {
        let lat_min = (center_lat - half_height).max(-90.0);
        let lat_max = (center_lat + half_height).min(90.0);
        let lon_min = (center_lon - half_width).max(-180.0);
        let lon_max = (center_lon + half_width).min(180.0);

        let row_start = self.latitude_to_index(lat_max).max(0) as usize;
        let row_stop = self.latitude_to_index(lat_min).max(0) as usize;
        let col_start = self.longitude_to_index(lon_min).max(0) as usize;
        let col_stop = self.longitude_to_index(lon_max).max(0) as usize;

        RegionSlice {
            rows: row_start..row_stop.max(row_start),
            cols: col_start..col_stop.max(col_start),
        }
    }
}

/// A spatial filter for mesh extraction: either the whole grid, or a box given
/// by its centre and half extents.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegionQuery {
    #[default]
    Whole,
    Bounded {
        center_lat: f64,
        center_lon: f64,
        half_height: f64,
        half_width: f64,
    },
}

impl RegionQuery {
    /// Builds a bounded query, rejecting non-finite values, negative half
    /// extents, centres outside the globe and boxes crossing the antimeridian.
    pub fn bounded(
        center_lat: f64,
        center_lon: f64,
        half_height: f64,
        half_width: f64,
    ) -> Result<Self, RegionError> {
        let query = RegionQuery::Bounded {
            center_lat,
            center_lon,
            half_height,
            half_width,
        };
        query.validate()?;
        Ok(query)
    }

    /// Builds a query from optional parts, as they arrive from flags or config.
    ///
    /// All four present gives [`RegionQuery::Bounded`], none gives
    /// [`RegionQuery::Whole`]; anything in between is ambiguous.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use climviz::grid::{RegionQuery, RegionError};
    ///
    /// assert_eq!(RegionQuery::from_parts(None, None, None, None), Ok(RegionQuery::Whole));
    /// assert!(matches!(
    ///     RegionQuery::from_parts(Some(40.0), None, Some(5.0), None),
    ///     Err(RegionError::AmbiguousRegion { supplied: 2 })
    /// ));
    /// ```
    pub fn from_parts(
        lat: Option<f64>,
        lon: Option<f64>,
        dlat: Option<f64>,
        dlon: Option<f64>,
    ) -> Result<Self, RegionError> {
        match (lat, lon, dlat, dlon) {
            (Some(lat), Some(lon), Some(dlat), Some(dlon)) => Self::bounded(lat, lon, dlat, dlon),
            (None, None, None, None) => Ok(RegionQuery::Whole),
            parts => {
                let supplied = [parts.0, parts.1, parts.2, parts.3]
                    .iter()
                    .filter(|p| p.is_some())
                    .count();
                Err(RegionError::AmbiguousRegion { supplied })
            }
        }
    }

    pub fn validate(&self) -> Result<(), RegionError> {
        let RegionQuery::Bounded {
            center_lat,
            center_lon,
            half_height,
            half_width,
        } = *self
        else {
            return Ok(());
        };

        if ![center_lat, center_lon, half_height, half_width]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(RegionError::InvalidRegion(
                "region values must be finite".to_string(),
            ));
        }
        if !(-90.0..=90.0).contains(&center_lat) {
            return Err(RegionError::InvalidRegion(format!(
                "center latitude {} outside [-90, 90]",
                center_lat
            )));
        }
        if !(-180.0..=180.0).contains(&center_lon) {
            return Err(RegionError::InvalidRegion(format!(
                "center longitude {} outside [-180, 180]",
                center_lon
            )));
        }
        if half_height < 0.0 || half_width < 0.0 {
            return Err(RegionError::InvalidRegion(
                "half extents must be non-negative".to_string(),
            ));
        }
        if self.crosses_antimeridian() {
            return Err(RegionError::CrossesAntimeridian {
                west: center_lon - half_width,
                east: center_lon + half_width,
            });
        }
        Ok(())
    }

    /// True when the box reaches past ±180°.
    pub fn crosses_antimeridian(&self) -> bool {
        match *self {
            RegionQuery::Whole => false,
            RegionQuery::Bounded {
                center_lon,
                half_width,
                ..
            } => center_lon - half_width < -180.0 || center_lon + half_width > 180.0,
        }
    }

    pub fn is_whole(&self) -> bool {
        matches!(self, RegionQuery::Whole)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_endpoints() {
        let indexer = GridIndexer::default();
        assert_eq!(indexer.latitude_to_index(90.0), 0);
        assert_eq!(indexer.latitude_to_index(0.0), 360);
        assert_eq!(indexer.latitude_to_index(-90.0), 720);
        assert_eq!(indexer.longitude_to_index(-180.0), 0);
        assert_eq!(indexer.longitude_to_index(0.0), 720);
        assert_eq!(indexer.longitude_to_index(180.0), 1440);
    }

    #[test]
    fn test_index_rounds_down() {
        let indexer = GridIndexer::default();
        // 0.1° into a 0.25° cell stays in that cell
        assert_eq!(indexer.latitude_to_index(89.9), 0);
        assert_eq!(indexer.longitude_to_index(-179.9), 0);
        assert_eq!(indexer.longitude_to_index(-179.74), 1);
    }

    #[test]
    fn test_grid_shape() {
        assert_eq!(GridIndexer::default().grid_shape(), (721, 1440));
        assert_eq!(GridIndexer::new(1.0).grid_shape(), (181, 360));
    }

    #[test]
    fn test_zero_extent_gives_empty_slice() {
        let slice = GridIndexer::default().region_slice(10.0, 10.0, 0.0, 0.0);
        assert!(slice.is_empty());
        assert_eq!(slice.shape(), (0, 0));
    }

    #[test]
    fn test_clamp_to_array() {
        let slice = RegionSlice {
            rows: 700..721,
            cols: 1430..1440,
        };
        let clamped = slice.clamp_to(710, 1435);
        assert_eq!(clamped.rows, 700..710);
        assert_eq!(clamped.cols, 1430..1435);

        let outside = RegionSlice { rows: 20..30, cols: 0..5 }.clamp_to(10, 10);
        assert_eq!(outside.rows, 10..10);
    }

    #[test]
    fn test_region_validation() {
        assert!(RegionQuery::bounded(0.0, 0.0, -1.0, 1.0).is_err());
        assert!(RegionQuery::bounded(95.0, 0.0, 1.0, 1.0).is_err());
        assert!(RegionQuery::bounded(0.0, 181.0, 1.0, 1.0).is_err());
        assert!(RegionQuery::bounded(f64::NAN, 0.0, 1.0, 1.0).is_err());
        assert!(RegionQuery::bounded(0.0, 180.0, 0.0, 0.0).is_ok());
    }

    #[test]
    fn test_crosses_antimeridian() {
        let seam = RegionQuery::Bounded {
            center_lat: 0.0,
            center_lon: 179.0,
            half_height: 5.0,
            half_width: 5.0,
        };
        assert!(seam.crosses_antimeridian());
        let inside = RegionQuery::bounded(0.0, 170.0, 5.0, 5.0).unwrap();
        assert!(!inside.crosses_antimeridian());
        assert!(!RegionQuery::Whole.crosses_antimeridian());
    }

    #[test]
    fn test_antimeridian_regions_rejected() {
        assert_eq!(
            RegionQuery::bounded(0.0, 179.0, 5.0, 5.0),
            Err(RegionError::CrossesAntimeridian {
                west: 174.0,
                east: 184.0
            })
        );
        assert!(matches!(
            RegionQuery::bounded(10.0, -175.0, 5.0, 10.0),
            Err(RegionError::CrossesAntimeridian { .. })
        ));
        // touching the seam is fine
        assert!(RegionQuery::bounded(0.0, 170.0, 5.0, 10.0).is_ok());
        assert!(RegionQuery::bounded(0.0, -170.0, 5.0, 10.0).is_ok());
    }

    #[test]
    fn test_region_query_serde() {
        let json = r#"{"kind": "bounded", "center_lat": 40.0, "center_lon": -90.0, "half_height": 10.0, "half_width": 10.0}"#;
        let query: RegionQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query, RegionQuery::bounded(40.0, -90.0, 10.0, 10.0).unwrap());

        let whole: RegionQuery = serde_json::from_str(r#"{"kind": "whole"}"#).unwrap();
        assert!(whole.is_whole());
    }
}
