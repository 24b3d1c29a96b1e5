//! Lubricant list ingest and validation.
//!
//! Lubricants come from two places: repeated `--lube NAME:V40:V100` flags and a
//! CSV file with `name,visc_40,visc_100` columns. Both go through the same
//! validation, so a lubricant that would be refused on the command line is also
//! refused from a file.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Separation of concerns**: no model evaluation here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use log::warn;

use crate::domain::Lubricant;
use crate::error::{AppError, EXIT_NO_DATA};

const NAME_COLUMNS: &[&str] = &["name", "lubricant"];
const V40_COLUMNS: &[&str] = &["visc_40", "kv40", "v40"];
const V100_COLUMNS: &[&str] = &["visc_100", "kv100", "v100"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub name: Option<String>,
    pub message: String,
}

/// Ingest output: validated lubricants + row errors.
#[derive(Debug, Clone)]
pub struct IngestedLubricants {
    pub lubricants: Vec<Lubricant>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Check the invariants every lubricant must satisfy before it is analysed.
pub fn validate_lubricant(lube: &Lubricant) -> Result<(), String> {
    if lube.name.trim().is_empty() {
        return Err("lubricant name must not be empty".to_string());
    }
    if !(lube.visc_40.is_finite() && lube.visc_100.is_finite()) {
        return Err("viscosities must be finite numbers".to_string());
    }
    if lube.visc_40 <= 0.0 || lube.visc_100 <= 0.0 {
        return Err("viscosities must be positive".to_string());
    }
    if lube.visc_40 <= lube.visc_100 {
        return Err(format!(
            "viscosity at 40 °C ({}) must exceed viscosity at 100 °C ({})",
            lube.visc_40, lube.visc_100
        ));
    }
    Ok(())
}

/// Parse a `NAME:V40:V100` command-line value.
///
/// The name may itself contain `:`; the last two fields are the viscosities.
pub fn parse_lubricant_arg(raw: &str) -> Result<Lubricant, String> {
    let mut parts = raw.rsplitn(3, ':');
    let (Some(v100), Some(v40), Some(name)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected NAME:V40:V100, got '{raw}'"));
    };

    let lube = Lubricant::new(
        name.trim(),
        parse_number(v40, "V40")?,
        parse_number(v100, "V100")?,
    );
    validate_lubricant(&lube)?;
    Ok(lube)
}

/// Load and validate lubricants from a CSV file.
pub fn load_lubricants(path: &Path) -> Result<IngestedLubricants, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_lubricants(file)
}

/// Read lubricants from any CSV source (used by `load_lubricants` and tests).
pub fn read_lubricants<R: std::io::Read>(source: R) -> Result<IngestedLubricants, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let name_idx = find_column(&header_map, NAME_COLUMNS)?;
    let v40_idx = find_column(&header_map, V40_COLUMNS)?;
    let v100_idx = find_column(&header_map, V100_COLUMNS)?;

    let mut lubricants = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    name: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let name = record.get(name_idx).unwrap_or("").to_string();
        let parsed = parse_number(record.get(v40_idx).unwrap_or(""), "visc_40").and_then(|v40| {
            let v100 = parse_number(record.get(v100_idx).unwrap_or(""), "visc_100")?;
            let lube = Lubricant::new(name.clone(), v40, v100);
            validate_lubricant(&lube)?;
            Ok(lube)
        });

        match parsed {
            Ok(lube) => lubricants.push(lube),
            Err(message) => {
                warn!("skipping CSV line {line}: {message}");
                row_errors.push(RowError {
                    line,
                    name: (!name.is_empty()).then_some(name),
                    message,
                });
            }
        }
    }

    if lubricants.is_empty() {
        return Err(AppError::new(
            EXIT_NO_DATA,
            format!("No valid lubricant rows ({} read, {} rejected).", rows_read, row_errors.len()),
        ));
    }

    Ok(IngestedLubricants {
        lubricants,
        row_errors,
        rows_read,
    })
}

fn parse_number(raw: &str, field: &str) -> Result<f64, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(format!("missing {field}"));
    }
    raw.parse::<f64>()
        .map_err(|_| format!("{field} is not a number: '{raw}'"))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn find_column(header_map: &HashMap<String, usize>, aliases: &[&str]) -> Result<usize, AppError> {
    aliases
        .iter()
        .find_map(|alias| header_map.get(*alias).copied())
        .ok_or_else(|| {
            AppError::input(format!(
                "Missing required CSV column (one of: {}).",
                aliases.join(", ")
            ))
        })
}
