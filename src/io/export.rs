//! Export evaluated curves to CSV.
//!
//! Long format (one row per lubricant and temperature) so the file loads directly
//! into spreadsheets and plotting tools:
//!
//! ```text
//! lubricant,temperature_c,viscosity_cst
//! ```
//!
//! Undefined viscosities are written as empty cells.

use std::path::Path;

use crate::app::pipeline::RunOutput;
use crate::error::AppError;

/// Write every lubricant's grid curve to a CSV file.
pub fn write_curves_csv(path: &Path, output: &RunOutput) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::input(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_curves(&mut writer, output)?;
    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to write export CSV: {e}")))
}

fn write_curves<W: std::io::Write>(writer: &mut csv::Writer<W>, output: &RunOutput) -> Result<(), AppError> {
    let row_err = |e: csv::Error| AppError::input(format!("Failed to write export CSV row: {e}"));

    writer
        .write_record(["lubricant", "temperature_c", "viscosity_cst"])
        .map_err(row_err)?;

    for analysis in &output.analyses {
        for (t, v) in output.grid_temps.iter().zip(&analysis.grid_viscosity) {
            let temperature = format!("{t}");
            let viscosity = if v.is_finite() { format!("{v:.6}") } else { String::new() };
            writer
                .write_record([analysis.lubricant.name.as_str(), temperature.as_str(), viscosity.as_str()])
                .map_err(row_err)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::analyze;
    use crate::domain::{Lubricant, TemperatureGrid};

    #[test]
    fn writes_long_format_with_blank_undefined_cells() {
        let lubes = [
            Lubricant::new("ISO 46, synthetic", 45.0, 9.0),
            Lubricant::new("broken", 10.0, 11.0),
        ];
        let output = analyze(&lubes, TemperatureGrid::new(0.0, 100.0, 50.0), &[], &[]).unwrap();

        let mut writer = csv::Writer::from_writer(Vec::new());
        write_curves(&mut writer, &output).unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 1 + 2 * 3);
        assert_eq!(lines[0], "lubricant,temperature_c,viscosity_cst");
        assert!(lines[1].starts_with("\"ISO 46, synthetic\",0,"));
        assert_eq!(lines[3], "\"ISO 46, synthetic\",100,9.000000");
        assert_eq!(lines[4], "broken,0,");
    }

    #[test]
    fn writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curves.csv");
        let output = analyze(&[Lubricant::new("ISO 68", 68.0, 8.7)], TemperatureGrid::default(), &[], &[]).unwrap();

        write_curves_csv(&path, &output).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 152);
    }
}
