//! Command-line parsing for the `visc` viscosity tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the model code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::Lubricant;
use crate::io::ingest::parse_lubricant_arg;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "visc", version, about = "Lubricant viscosity curves (Walther / ASTM D341) and Viscosity Index (ASTM D2270)")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). Overrides VISC_LOG.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compare lubricants: summary, viscosity table, and optional exports.
    Table(TableArgs),
    /// Viscosity at a single temperature.
    At(AtArgs),
    /// Print the viscosity curve of one lubricant over a temperature range.
    Curve(CurveArgs),
    /// ASTM D2270 Viscosity Index.
    Vi(CalibrationArgs),
    /// Print a previously exported curve JSON.
    Show(ShowArgs),
}

/// The two reference viscosities of a single lubricant.
#[derive(Debug, Args, Clone, Copy)]
pub struct CalibrationArgs {
    /// Kinematic viscosity at 40 °C (cSt).
    #[arg(long = "v40")]
    pub visc_40: f64,

    /// Kinematic viscosity at 100 °C (cSt).
    #[arg(long = "v100")]
    pub visc_100: f64,
}

/// Options for comparing lubricants.
#[derive(Debug, Args, Clone)]
pub struct TableArgs {
    /// Lubricant as NAME:V40:V100 (repeatable).
    #[arg(short = 'l', long = "lube", value_name = "NAME:V40:V100", value_parser = parse_lubricant_arg)]
    pub lubricants: Vec<Lubricant>,

    /// CSV file with name,visc_40,visc_100 columns.
    #[arg(long, env = "VISC_CSV")]
    pub csv: Option<PathBuf>,

    /// Temperatures (°C) for the comparison table.
    #[arg(
        short,
        long,
        env = "VISC_TEMPS",
        value_delimiter = ',',
        default_values_t = [0.0, 20.0, 40.0, 80.0, 100.0, 120.0],
        allow_hyphen_values = true
    )]
    pub temps: Vec<f64>,

    /// Temperatures (°C) to highlight on exported curves (at most 3).
    #[arg(long, value_delimiter = ',', default_values_t = [40.0, 100.0], allow_hyphen_values = true)]
    pub mark: Vec<f64>,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Export the curve grid of every lubricant to CSV.
    #[arg(long = "export-csv")]
    pub export_csv: Option<PathBuf>,

    /// Export the run (constants, VI, curve grid) to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

/// Temperature range of a dense curve grid.
#[derive(Debug, Args, Clone, Copy)]
pub struct RangeArgs {
    /// First grid temperature (°C).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub from: f64,

    /// Last grid temperature (°C, inclusive).
    #[arg(long, default_value_t = 150.0, allow_negative_numbers = true)]
    pub to: f64,

    /// Grid step (°C).
    #[arg(long, default_value_t = 1.0)]
    pub step: f64,
}

/// Options for a single-temperature query.
#[derive(Debug, Args, Clone, Copy)]
pub struct AtArgs {
    #[command(flatten)]
    pub calibration: CalibrationArgs,

    /// Query temperature (°C).
    #[arg(long, allow_negative_numbers = true)]
    pub temp: f64,
}

/// Options for printing one curve.
#[derive(Debug, Args, Clone, Copy)]
pub struct CurveArgs {
    #[command(flatten)]
    pub calibration: CalibrationArgs,

    #[command(flatten)]
    pub range: RangeArgs,
}

/// Options for showing a saved curve.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Curve JSON file produced by `visc table --export-json`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_table_flags() {
        let cli = Cli::try_parse_from([
            "visc", "table", "-l", "ISO 46:45:9", "--lube", "gear:126:16.2", "--temps", "-20,40", "--mark", "40",
        ])
        .unwrap();
        let Command::Table(args) = cli.command else {
            panic!("expected table");
        };
        assert_eq!(args.lubricants.len(), 2);
        assert_eq!(args.temps, vec![-20.0, 40.0]);
        assert_eq!(args.mark, vec![40.0]);
        assert_eq!(args.range.to, 150.0);
    }

    #[test]
    fn rejects_invalid_lubricant_flag() {
        assert!(Cli::try_parse_from(["visc", "table", "-l", "oil:9:45"]).is_err());
    }

    #[test]
    fn parses_point_query() {
        let cli = Cli::try_parse_from(["visc", "-v", "at", "--v40", "45", "--v100", "9", "--temp", "-10"]).unwrap();
        assert_eq!(cli.verbose, 1);
        let Command::At(args) = cli.command else {
            panic!("expected at");
        };
        assert_eq!(args.temp, -10.0);
        assert_eq!(args.calibration.visc_40, 45.0);
    }
}
