//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the model code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::app::pipeline::RunOutput;
use crate::domain::CurveFile;
use crate::models::{ViscosityCurve, ViscosityIndex};
use crate::report::ComparisonTable;

/// Width of a lubricant column in the comparison table.
const COLUMN_WIDTH: usize = 16;

/// Format the per-lubricant summary (inputs, Walther constants, viscosity index).
pub fn format_run_summary(output: &RunOutput) -> String {
    let mut out = String::new();

    out.push_str("=== visc - Walther viscosity curves (ASTM D341 / D2270) ===\n");
    out.push_str(&format!(
        "Grid: {}..{} °C step {} ({} points)\n",
        output.grid.start,
        output.grid.end,
        output.grid.step,
        output.grid_temps.len()
    ));
    if let Some(y_max) = output.y_axis_max {
        out.push_str(&format!("Chart axis: 0..{y_max:.1} cSt\n"));
    }

    out.push('\n');
    out.push_str(
        format!(
            "{:<24} {:>10} {:>10} {:>10} {:>10} {:>6} {:<12}\n",
            "lubricant", "kv40", "kv100", "A", "B", "VI", "procedure"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<24} {:-<10} {:-<10} {:-<10} {:-<10} {:-<6} {:-<12}\n",
            "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    let mut notes = Vec::new();
    for a in &output.analyses {
        let lube = &a.lubricant;
        let (a_str, b_str) = match &a.constants {
            Ok(k) => (format!("{:.6}", k.a), format!("{:.6}", k.b)),
            Err(e) => {
                notes.push(format!("{}: no curve ({e})", lube.name));
                ("n/a".to_string(), "n/a".to_string())
            }
        };
        let (vi_str, procedure) = match &a.viscosity_index {
            Ok(vi) => (format!("{:.0}", vi.rounded()), vi.procedure.display_name()),
            Err(e) => {
                notes.push(format!("{}: no viscosity index ({e})", lube.name));
                ("n/a".to_string(), "")
            }
        };

        out.push_str(
            format!(
                "{:<24} {:>10.2} {:>10.2} {:>10} {:>10} {:>6} {:<12}\n",
                truncate(&lube.name, 24),
                lube.visc_40,
                lube.visc_100,
                a_str,
                b_str,
                vi_str,
                procedure,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    if !notes.is_empty() || !output.row_errors.is_empty() {
        out.push_str("\nWarnings:\n");
        for note in &notes {
            out.push_str(&format!("- {note}\n"));
        }
        for e in &output.row_errors {
            let name = e.name.as_deref().map(|n| format!(" ({n})")).unwrap_or_default();
            out.push_str(&format!("- CSV line {}{name}: {}\n", e.line, e.message));
        }
    }

    out
}

/// Format the comparison table (rows = temperatures, columns = lubricants).
pub fn format_comparison_table(table: &ComparisonTable) -> String {
    let mut out = String::new();
    if table.temperatures.is_empty() {
        out.push_str("(no comparison temperatures selected)\n");
        return out;
    }

    out.push_str("Viscosity (cSt) by temperature:\n");

    let mut header = format!("{:<10}", "T (°C)");
    let mut rule = format!("{:-<10}", "");
    for name in &table.names {
        header.push_str(&format!(" {:>w$}", truncate(name, COLUMN_WIDTH), w = COLUMN_WIDTH));
        rule.push_str(&format!(" {:-<w$}", "", w = COLUMN_WIDTH));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');

    for (t, row) in table.temperatures.iter().zip(&table.cells) {
        let mut line = format!("{:<10}", fmt_temp(*t));
        for v in row {
            line.push_str(&format!(" {:>w$}", fmt_visc(*v), w = COLUMN_WIDTH));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

/// Format a single curve as a two-column listing.
pub fn format_curve(curve: &ViscosityCurve) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Walther constants: A={:.6} B={:.6} C={}\n",
        curve.constants.a, curve.constants.b, curve.constants.c
    ));
    out.push_str(&format!("{:<10} {:>14}\n", "T (°C)", "viscosity cSt"));
    for (t, v) in curve {
        out.push_str(&format!("{:<10} {:>14}\n", fmt_temp(t), fmt_visc(v)));
    }
    out
}

/// Format a viscosity index together with its reference viscosities.
pub fn format_viscosity_index(kv40: f64, kv100: f64, vi: &ViscosityIndex) -> String {
    let mut out = String::new();
    out.push_str(&format!("kv40={kv40} cSt, kv100={kv100} cSt\n"));
    out.push_str(&format!("L={:.2} cSt, H={:.2} cSt\n", vi.l, vi.h));
    out.push_str(&format!(
        "VI={:.0} (raw {:.2}, procedure {})\n",
        vi.rounded(),
        vi.value,
        vi.procedure.display_name()
    ));
    out
}

/// Format a saved curve file: metadata plus the marked points of each lubricant.
pub fn format_curve_file(curve: &CurveFile) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {} curve file ({}) ===\n", curve.tool, curve.generated_at.to_rfc3339()));
    out.push_str(&format!(
        "Grid: {}..{} °C step {} ({} points)\n",
        curve.grid.start,
        curve.grid.end,
        curve.grid.step,
        curve.temperature_c.len()
    ));
    if let Some(y_max) = curve.y_axis_max {
        out.push_str(&format!("Chart axis: 0..{y_max:.1} cSt\n"));
    }

    for entry in &curve.lubricants {
        out.push('\n');
        out.push_str(&format!(
            "{} (kv40={}, kv100={})\n",
            entry.name, entry.visc_40, entry.visc_100
        ));
        match entry.constants {
            Some(k) => out.push_str(&format!("  A={:.6} B={:.6} C={}\n", k.a, k.b, k.c)),
            None => out.push_str("  no curve (invalid calibration)\n"),
        }
        match entry.viscosity_index {
            Some(vi) => out.push_str(&format!("  VI={:.0}\n", vi.round())),
            None => out.push_str("  VI=n/a\n"),
        }
        for m in &entry.marked {
            out.push_str(&format!(
                "  {} °C: {} cSt\n",
                fmt_temp(m.temperature_c),
                fmt_visc(m.viscosity_cst)
            ));
        }
    }

    out
}

/// Viscosity cell: two decimals, `n/a` for undefined, `overflow` for infinite.
pub fn fmt_visc(v: f64) -> String {
    if v.is_nan() {
        "n/a".to_string()
    } else if v.is_infinite() {
        "overflow".to_string()
    } else {
        format!("{v:.2}")
    }
}

fn fmt_temp(t: f64) -> String {
    if t.fract() == 0.0 {
        format!("{t:.0}")
    } else {
        format!("{t:.2}")
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
