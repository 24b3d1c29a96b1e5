//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during evaluation
//! - exported to JSON/CSV
//! - reloaded later for comparisons

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Offset between degrees Celsius and kelvin.
pub const KELVIN_OFFSET: f64 = 273.15;

/// Reference temperatures of the two calibration points (°C).
pub const REFERENCE_TEMP_LOW_C: f64 = 40.0;
pub const REFERENCE_TEMP_HIGH_C: f64 = 100.0;

/// Largest number of points a `TemperatureGrid` may hold.
pub const MAX_GRID_POINTS: usize = 1_000_000;

/// A measured `(temperature, kinematic viscosity)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    pub temperature_celsius: f64,
    pub viscosity_cst: f64,
}

impl CalibrationPoint {
    pub fn new(temperature_celsius: f64, viscosity_cst: f64) -> Self {
        Self {
            temperature_celsius,
            viscosity_cst,
        }
    }

    pub fn temperature_kelvin(&self) -> f64 {
        self.temperature_celsius + KELVIN_OFFSET
    }
}

/// A named lubricant described by its two reference viscosities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lubricant {
    pub name: String,
    /// Kinematic viscosity at 40 °C (cSt).
    pub visc_40: f64,
    /// Kinematic viscosity at 100 °C (cSt).
    pub visc_100: f64,
}

impl Lubricant {
    pub fn new(name: impl Into<String>, visc_40: f64, visc_100: f64) -> Self {
        Self {
            name: name.into(),
            visc_40,
            visc_100,
        }
    }

    /// The two calibration points, low temperature first.
    pub fn calibration_points(&self) -> [CalibrationPoint; 2] {
        [
            CalibrationPoint::new(REFERENCE_TEMP_LOW_C, self.visc_40),
            CalibrationPoint::new(REFERENCE_TEMP_HIGH_C, self.visc_100),
        ]
    }
}

/// Inclusive arithmetic temperature range (°C).
///
/// Points are computed as `start + i * step` rather than by repeated addition,
/// so long grids do not drift.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureGrid {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl Default for TemperatureGrid {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: 150.0,
            step: 1.0,
        }
    }
}

impl TemperatureGrid {
    pub fn new(start: f64, end: f64, step: f64) -> Self {
        Self { start, end, step }
    }

    /// Number of points in the grid.
    ///
    /// 0 for an empty or malformed range, including one with more than
    /// [`MAX_GRID_POINTS`] points.
    pub fn len(&self) -> usize {
        if !(self.start.is_finite() && self.end.is_finite() && self.step.is_finite()) {
            return 0;
        }
        if self.step <= 0.0 || self.end < self.start {
            return 0;
        }
        // Small tolerance so `0..=150 step 0.1` keeps its endpoint.
        let span = ((self.end - self.start) / self.step + 1e-9).floor();
        if !span.is_finite() || span >= MAX_GRID_POINTS as f64 {
            return 0;
        }
        (span as usize).saturating_add(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Temperature at index `i` (not bounds-checked against `len`).
    pub fn at(&self, i: usize) -> f64 {
        self.start + self.step * i as f64
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = f64> + Clone + '_ {
        (0..self.len()).map(move |i| self.at(i))
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }
}

/// Which ASTM D2270 branch produced a Viscosity Index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexProcedure {
    /// `U > L`: the sample thins faster than the VI-0 reference.
    Negative,
    /// Procedure A (`H < U <= L`, VI <= 100).
    A,
    /// Procedure B (`U <= H`, VI > 100).
    B,
}

impl IndexProcedure {
    pub fn display_name(self) -> &'static str {
        match self {
            IndexProcedure::Negative => "A (negative)",
            IndexProcedure::A => "A",
            IndexProcedure::B => "B",
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub lubricants: Vec<Lubricant>,
    pub csv_path: Option<PathBuf>,

    /// Dense grid used for exported curves.
    pub grid: TemperatureGrid,
    /// Temperatures shown in the comparison table (sorted, deduplicated).
    pub table_temps: Vec<f64>,
    /// Temperatures highlighted on exported curves (at most three).
    pub mark_temps: Vec<f64>,

    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

/// A single highlighted `(temperature, viscosity)` point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkedPoint {
    pub temperature_c: f64,
    pub viscosity_cst: f64,
}

/// Per-lubricant entry of a saved curve file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveEntry {
    pub name: String,
    pub visc_40: f64,
    pub visc_100: f64,
    /// `None` when the calibration was rejected.
    pub constants: Option<crate::models::WaltherConstants>,
    pub viscosity_index: Option<f64>,
    /// Grid viscosities; `None` where the curve is undefined (JSON has no NaN).
    pub viscosity_cst: Vec<Option<f64>>,
    /// Highlighted points with a finite viscosity.
    pub marked: Vec<MarkedPoint>,
}

/// A saved curve file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub grid: TemperatureGrid,
    pub temperature_c: Vec<f64>,
    /// Suggested upper bound of a chart's viscosity axis.
    pub y_axis_max: Option<f64>,
    pub lubricants: Vec<CurveEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_covers_zero_to_150() {
        let grid = TemperatureGrid::default();
        assert_eq!(grid.len(), 151);
        let v = grid.to_vec();
        assert_eq!(v[0], 0.0);
        assert_eq!(v[150], 150.0);
    }

    #[test]
    fn fractional_step_keeps_endpoint() {
        let grid = TemperatureGrid::new(0.0, 150.0, 0.1);
        assert_eq!(grid.len(), 1501);
        assert!((grid.at(1500) - 150.0).abs() < 1e-9);
    }

    #[test]
    fn malformed_grid_is_empty() {
        assert!(TemperatureGrid::new(10.0, 0.0, 1.0).is_empty());
        assert!(TemperatureGrid::new(0.0, 10.0, 0.0).is_empty());
        assert!(TemperatureGrid::new(0.0, f64::NAN, 1.0).is_empty());
        assert!(TemperatureGrid::new(0.0, 1e300, 1e-300).is_empty());
        assert!(TemperatureGrid::new(0.0, 150.0, 1e-12).is_empty());
    }

    #[test]
    fn grid_size_is_capped() {
        let largest = TemperatureGrid::new(0.0, (MAX_GRID_POINTS - 1) as f64, 1.0);
        assert_eq!(largest.len(), MAX_GRID_POINTS);
        assert!(TemperatureGrid::new(0.0, MAX_GRID_POINTS as f64, 1.0).is_empty());
    }

    #[test]
    fn calibration_points_use_reference_temperatures() {
        let lube = Lubricant::new("ISO 46", 45.0, 9.0);
        let [low, high] = lube.calibration_points();
        assert_eq!(low.temperature_celsius, 40.0);
        assert_eq!(high.viscosity_cst, 9.0);
        assert!((high.temperature_kelvin() - 373.15).abs() < 1e-12);
    }
}
