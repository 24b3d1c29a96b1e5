//! Reporting utilities: comparison tables and formatted terminal output.

pub mod format;

pub use format::*;

use crate::app::pipeline::RunOutput;

/// Viscosities of every lubricant at a shared set of temperatures.
///
/// Rows are temperatures, columns are lubricants (in input order).
#[derive(Debug, Clone)]
pub struct ComparisonTable {
    pub temperatures: Vec<f64>,
    pub names: Vec<String>,
    /// `cells[row][col]`: viscosity at `temperatures[row]` for `names[col]`.
    pub cells: Vec<Vec<f64>>,
}

/// Pivot per-lubricant table viscosities into temperature rows.
pub fn comparison_table(output: &RunOutput) -> ComparisonTable {
    let names = output.analyses.iter().map(|a| a.lubricant.name.clone()).collect();
    let cells = (0..output.table_temps.len())
        .map(|row| {
            output
                .analyses
                .iter()
                .map(|a| a.table_viscosity.get(row).copied().unwrap_or(f64::NAN))
                .collect()
        })
        .collect();

    ComparisonTable {
        temperatures: output.table_temps.clone(),
        names,
        cells,
    }
}
