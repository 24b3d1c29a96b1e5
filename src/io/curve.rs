//! Read/write curve JSON files.
//!
//! Curve JSON is the "portable" representation of a run:
//! - the temperature grid and a suggested chart axis bound
//! - per lubricant: inputs, Walther constants, viscosity index
//! - precomputed grid viscosities and highlighted points
//!
//! The schema is defined by `domain::CurveFile`.

use std::fs::File;
use std::path::Path;

use chrono::Utc;

use crate::app::pipeline::RunOutput;
use crate::domain::{CurveEntry, CurveFile};
use crate::error::AppError;

/// Build the serializable form of a run.
pub fn build_curve_file(output: &RunOutput) -> CurveFile {
    let lubricants = output
        .analyses
        .iter()
        .map(|a| CurveEntry {
            name: a.lubricant.name.clone(),
            visc_40: a.lubricant.visc_40,
            visc_100: a.lubricant.visc_100,
            constants: a.constants(),
            viscosity_index: a.vi_value(),
            viscosity_cst: a
                .grid_viscosity
                .iter()
                .map(|v| v.is_finite().then_some(*v))
                .collect(),
            marked: a
                .marked
                .iter()
                .filter(|m| m.viscosity_cst.is_finite())
                .copied()
                .collect(),
        })
        .collect();

    CurveFile {
        tool: "visc".to_string(),
        generated_at: Utc::now(),
        grid: output.grid,
        temperature_c: output.grid_temps.clone(),
        y_axis_max: output.y_axis_max,
        lubricants,
    }
}

/// Write a curve JSON file.
pub fn write_curve_json(path: &Path, output: &RunOutput) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create curve JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &build_curve_file(output))
        .map_err(|e| AppError::input(format!("Failed to write curve JSON: {e}")))?;

    Ok(())
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open curve JSON '{}': {e}", path.display())))?;
    let curve: CurveFile =
        serde_json::from_reader(file).map_err(|e| AppError::input(format!("Invalid curve JSON: {e}")))?;
    Ok(curve)
}
