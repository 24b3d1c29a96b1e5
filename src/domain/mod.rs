//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - calibration inputs (`CalibrationPoint`, `Lubricant`)
//! - evaluation grids (`TemperatureGrid`)
//! - run configuration (`RunConfig`) and saved curve files (`CurveFile`)

pub mod types;

pub use types::*;
