//! Shared analysis pipeline used by every `visc` subcommand that handles lubricant lists.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! gather lubricants -> fit each curve -> evaluate grid/table/marks -> viscosity index
//!
//! The lubricant list is owned by the caller and passed in explicitly; nothing is
//! remembered between runs. Each lubricant is analysed independently (in parallel),
//! and results keep the input order.

use log::{info, warn};
use rayon::prelude::*;

use crate::domain::{Lubricant, MAX_GRID_POINTS, MarkedPoint, RunConfig, TemperatureGrid};
use crate::error::{AppError, EXIT_NO_DATA};
use crate::io::ingest::{RowError, load_lubricants};
use crate::models::{self, CalibrationError, IndexError, ViscosityIndex, WaltherConstants};

/// At most this many temperatures can be highlighted on a curve.
pub const MAX_MARKS: usize = 3;

/// Headroom applied above the coldest-point viscosity for chart axes.
const Y_AXIS_HEADROOM: f64 = 1.1;

/// Temperature (°C) whose viscosity sets the chart axis bound.
const Y_AXIS_REFERENCE_C: f64 = 0.0;

/// Everything computed for one lubricant.
#[derive(Debug, Clone)]
pub struct LubricantAnalysis {
    pub lubricant: Lubricant,
    pub constants: Result<WaltherConstants, CalibrationError>,
    /// Viscosities on the dense grid (all NaN if the calibration was rejected).
    pub grid_viscosity: Vec<f64>,
    /// Viscosities at the comparison-table temperatures.
    pub table_viscosity: Vec<f64>,
    pub marked: Vec<MarkedPoint>,
    pub viscosity_index: Result<ViscosityIndex, IndexError>,
}

impl LubricantAnalysis {
    pub fn constants(&self) -> Option<WaltherConstants> {
        self.constants.ok()
    }

    pub fn vi_value(&self) -> Option<f64> {
        self.viscosity_index.ok().map(|vi| vi.value)
    }
}

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub grid: TemperatureGrid,
    pub grid_temps: Vec<f64>,
    pub table_temps: Vec<f64>,
    pub analyses: Vec<LubricantAnalysis>,
    pub y_axis_max: Option<f64>,
    /// Rows skipped while reading the lubricant CSV.
    pub row_errors: Vec<RowError>,
}

/// Gather lubricants from the config (flags first, then CSV) and analyse them.
pub fn run(config: &RunConfig) -> Result<RunOutput, AppError> {
    let mut lubricants = config.lubricants.clone();
    let mut row_errors = Vec::new();

    if let Some(path) = &config.csv_path {
        let ingested = load_lubricants(path)?;
        info!(
            "read {} lubricant rows from '{}' ({} used)",
            ingested.rows_read,
            path.display(),
            ingested.lubricants.len()
        );
        lubricants.extend(ingested.lubricants);
        row_errors = ingested.row_errors;
    }

    if lubricants.is_empty() {
        return Err(AppError::new(
            EXIT_NO_DATA,
            "No lubricants to analyse (use --lube NAME:V40:V100 or --csv PATH).",
        ));
    }

    let mut output = analyze(&lubricants, config.grid, &config.table_temps, &config.mark_temps)?;
    output.row_errors = row_errors;
    Ok(output)
}

/// Analyse an explicit list of lubricants.
pub fn analyze(
    lubricants: &[Lubricant],
    grid: TemperatureGrid,
    table_temps: &[f64],
    mark_temps: &[f64],
) -> Result<RunOutput, AppError> {
    if grid.is_empty() {
        return Err(AppError::input(format!(
            "Invalid temperature grid: {}..{} step {} (must be finite, step > 0, end >= start, at most {MAX_GRID_POINTS} points).",
            grid.start, grid.end, grid.step
        )));
    }
    if mark_temps.len() > MAX_MARKS {
        return Err(AppError::input(format!(
            "At most {MAX_MARKS} temperatures can be highlighted (got {}).",
            mark_temps.len()
        )));
    }

    let grid_temps = grid.to_vec();
    let table_temps = normalize_temps(table_temps);

    let analyses: Vec<LubricantAnalysis> = lubricants
        .par_iter()
        .map(|lube| analyze_lubricant(lube, &grid_temps, &table_temps, mark_temps))
        .collect();

    for a in &analyses {
        if let Err(e) = &a.constants {
            warn!("'{}': {e}", a.lubricant.name);
        }
    }

    let y_axis_max = y_axis_max(&analyses);

    Ok(RunOutput {
        grid,
        grid_temps,
        table_temps,
        analyses,
        y_axis_max,
        row_errors: Vec::new(),
    })
}

/// Analyse one lubricant.
pub fn analyze_lubricant(
    lubricant: &Lubricant,
    grid_temps: &[f64],
    table_temps: &[f64],
    mark_temps: &[f64],
) -> LubricantAnalysis {
    let [low, high] = lubricant.calibration_points();
    let constants = models::fit_points(low, high);

    let evaluate = |temps: &[f64]| match &constants {
        Ok(k) => k.evaluate(temps),
        Err(_) => vec![f64::NAN; temps.len()],
    };

    let grid_viscosity = evaluate(grid_temps);
    let table_viscosity = evaluate(table_temps);
    let marked = mark_temps
        .iter()
        .zip(evaluate(mark_temps))
        .map(|(&temperature_c, viscosity_cst)| MarkedPoint {
            temperature_c,
            viscosity_cst,
        })
        .collect();

    LubricantAnalysis {
        lubricant: lubricant.clone(),
        constants,
        grid_viscosity,
        table_viscosity,
        marked,
        viscosity_index: models::compute(lubricant.visc_40, lubricant.visc_100),
    }
}

/// Upper bound for a chart's viscosity axis: the largest finite viscosity at 0 °C,
/// plus headroom. `None` if no lubricant has a finite value there.
pub fn y_axis_max(analyses: &[LubricantAnalysis]) -> Option<f64> {
    analyses
        .iter()
        .filter_map(|a| a.constants())
        .map(|k| k.viscosity_at(Y_AXIS_REFERENCE_C))
        .filter(|v| v.is_finite())
        .reduce(f64::max)
        .map(|v| v * Y_AXIS_HEADROOM)
}

/// Sort and deduplicate temperatures, dropping non-finite entries.
pub fn normalize_temps(temps: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = temps.iter().copied().filter(|t| t.is_finite()).collect();
    out.sort_by(f64::total_cmp);
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn lubes() -> Vec<Lubricant> {
        vec![
            Lubricant::new("ISO 46", 45.0, 9.0),
            Lubricant::new("broken", 10.0, 11.0),
            Lubricant::new("gear 126", 126.0, 16.2),
        ]
    }

    #[test]
    fn preserves_order_and_isolates_failures() {
        let out = analyze(&lubes(), TemperatureGrid::default(), &[100.0, 40.0, 40.0], &[40.0, 100.0]).unwrap();

        let names: Vec<&str> = out.analyses.iter().map(|a| a.lubricant.name.as_str()).collect();
        assert_eq!(names, ["ISO 46", "broken", "gear 126"]);
        assert_eq!(out.table_temps, vec![40.0, 100.0]);

        let iso = &out.analyses[0];
        assert_eq!(iso.grid_viscosity.len(), 151);
        assert_relative_eq!(iso.table_viscosity[0], 45.0, max_relative = 1e-6);
        assert_relative_eq!(iso.marked[1].viscosity_cst, 9.0, max_relative = 1e-6);
        assert!(iso.vi_value().is_some());

        let broken = &out.analyses[1];
        assert!(broken.constants().is_none());
        assert!(broken.grid_viscosity.iter().all(|v| v.is_nan()));
        assert!(broken.marked.iter().all(|m| m.viscosity_cst.is_nan()));
        assert!(broken.vi_value().is_none());

        assert!(out.analyses[2].vi_value().unwrap() > 100.0);
    }

    #[test]
    fn y_axis_uses_coldest_viscosity() {
        let out = analyze(&lubes(), TemperatureGrid::default(), &[], &[]).unwrap();
        let expected = 1.1 * crate::api::evaluate_at(126.0, 16.2, 0.0);
        assert_relative_eq!(out.y_axis_max.unwrap(), expected, max_relative = 1e-12);

        let only_broken = analyze(&lubes()[1..2], TemperatureGrid::default(), &[], &[]).unwrap();
        assert!(only_broken.y_axis_max.is_none());
    }

    #[test]
    fn rejects_too_many_marks_and_bad_grids() {
        let err = analyze(&lubes(), TemperatureGrid::default(), &[], &[0.0, 20.0, 40.0, 60.0]).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = analyze(&lubes(), TemperatureGrid::new(10.0, 0.0, 1.0), &[], &[]).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = analyze(&lubes(), TemperatureGrid::new(0.0, 1e300, 1e-300), &[], &[]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn empty_run_is_reported() {
        let config = RunConfig {
            lubricants: Vec::new(),
            csv_path: None,
            grid: TemperatureGrid::default(),
            table_temps: Vec::new(),
            mark_temps: Vec::new(),
            export_csv: None,
            export_json: None,
        };
        assert_eq!(run(&config).unwrap_err().exit_code(), EXIT_NO_DATA);
    }

    #[test]
    fn normalize_temps_sorts_and_dedups() {
        assert_eq!(normalize_temps(&[120.0, 0.0, f64::NAN, 40.0, 0.0]), vec![0.0, 40.0, 120.0]);
    }
}
