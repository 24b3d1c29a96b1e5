//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - runs the viscosity pipeline or a single-lubricant query
//! - prints reports
//! - writes optional exports

use clap::{CommandFactory, Parser};
use log::{LevelFilter, debug};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use crate::cli::{AtArgs, CalibrationArgs, Command, CurveArgs, RangeArgs, ShowArgs, TableArgs};
use crate::domain::{RunConfig, TemperatureGrid};
use crate::error::AppError;
use crate::models;

pub mod pipeline;

/// Environment variable holding the default log level (`error` .. `trace`).
pub const LOG_ENV: &str = "VISC_LOG";

/// Entry point for the `visc` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env file is the normal case.
    let _ = dotenvy::dotenv();

    // We want `visc -l A:45:9` to behave like `visc table -l A:45:9`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    init_logging(cli.verbose);

    match cli.command {
        Command::Table(args) => handle_table(args),
        Command::At(args) => handle_at(args),
        Command::Curve(args) => handle_curve(args),
        Command::Vi(args) => handle_vi(args),
        Command::Show(args) => handle_show(args),
    }
}

fn handle_table(args: TableArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let output = pipeline::run(&config)?;

    println!("{}", crate::report::format_run_summary(&output));
    let table = crate::report::comparison_table(&output);
    println!("{}", crate::report::format_comparison_table(&table));

    // Optional exports.
    if let Some(path) = &config.export_csv {
        crate::io::export::write_curves_csv(path, &output)?;
        debug!("wrote curve CSV to '{}'", path.display());
    }
    if let Some(path) = &config.export_json {
        crate::io::curve::write_curve_json(path, &output)?;
        debug!("wrote curve JSON to '{}'", path.display());
    }

    Ok(())
}

fn handle_at(args: AtArgs) -> Result<(), AppError> {
    let CalibrationArgs { visc_40, visc_100 } = args.calibration;
    // Surface the reason for a rejected calibration instead of printing NaN.
    models::fit(visc_40, visc_100)?;

    let v = crate::api::evaluate_at(visc_40, visc_100, args.temp);
    println!("{} cSt at {} °C", crate::report::fmt_visc(v), args.temp);
    Ok(())
}

fn handle_curve(args: CurveArgs) -> Result<(), AppError> {
    let CalibrationArgs { visc_40, visc_100 } = args.calibration;
    let constants = models::fit(visc_40, visc_100)?;

    let grid = grid_from_args(&args.range);
    if grid.is_empty() {
        return Err(AppError::input(format!(
            "Invalid temperature range: {}..{} step {} (at most {} points).",
            grid.start, grid.end, grid.step, crate::domain::MAX_GRID_POINTS
        )));
    }

    print!("{}", crate::report::format_curve(&constants.curve(grid)));
    Ok(())
}

fn handle_vi(args: CalibrationArgs) -> Result<(), AppError> {
    let vi = models::compute(args.visc_40, args.visc_100)?;
    print!(
        "{}",
        crate::report::format_viscosity_index(args.visc_40, args.visc_100, &vi)
    );
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let curve = crate::io::curve::read_curve_json(&args.curve)?;
    print!("{}", crate::report::format_curve_file(&curve));
    Ok(())
}

pub fn run_config_from_args(args: &TableArgs) -> RunConfig {
    RunConfig {
        lubricants: args.lubricants.clone(),
        csv_path: args.csv.clone(),
        grid: grid_from_args(&args.range),
        table_temps: args.temps.clone(),
        mark_temps: args.mark.clone(),
        export_csv: args.export_csv.clone(),
        export_json: args.export_json.clone(),
    }
}

fn grid_from_args(range: &RangeArgs) -> TemperatureGrid {
    TemperatureGrid::new(range.from, range.to, range.step)
}

/// Resolve the log level: `-v` flags win, then `VISC_LOG`, then `warn`.
pub fn log_level(verbose: u8, env_value: Option<&str>) -> LevelFilter {
    match verbose {
        0 => env_value
            .and_then(|v| v.trim().parse::<LevelFilter>().ok())
            .unwrap_or(LevelFilter::Warn),
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn init_logging(verbose: u8) {
    let env_value = std::env::var(LOG_ENV).ok();
    let level = log_level(verbose, env_value.as_deref());
    // Only fails if a logger is already installed.
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto);
}

/// Rewrite argv so `visc <flags>` defaults to `visc table <flags>`.
///
/// Rules:
/// - `visc`                        -> unchanged (clap prints usage)
/// - `visc -l A:45:9 ...`          -> `visc table -l A:45:9 ...`
/// - `visc -v -l A:45:9`           -> `visc -v table -l A:45:9`
/// - `visc --help/--version/-h`    -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    // Leading verbosity flags are global and may precede the subcommand.
    let first = argv
        .iter()
        .skip(1)
        .position(|a| !is_verbose_flag(a))
        .map(|p| p + 1);
    let Some(idx) = first else {
        return argv;
    };

    let arg = argv[idx].as_str();
    let is_top_level_help_or_version = matches!(arg, "-h" | "--help" | "-V" | "--version" | "help");
    let is_subcommand = crate::cli::Cli::command()
        .get_subcommands()
        .any(|c| c.get_name() == arg || c.get_all_aliases().any(|a| a == arg));
    if is_top_level_help_or_version || is_subcommand {
        return argv;
    }

    // If the token is a flag, treat it as "table flags".
    if arg.starts_with('-') {
        argv.insert(idx, "table".to_string());
    }
    argv
}

fn is_verbose_flag(arg: &str) -> bool {
    arg == "--verbose" || (arg.len() > 1 && arg.starts_with('-') && arg[1..].chars().all(|c| c == 'v'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_flags_default_to_table() {
        assert_eq!(
            rewrite_args(argv(&["visc", "-l", "A:45:9"])),
            argv(&["visc", "table", "-l", "A:45:9"])
        );
        assert_eq!(
            rewrite_args(argv(&["visc", "-vv", "--csv", "x.csv"])),
            argv(&["visc", "-vv", "table", "--csv", "x.csv"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        for args in [
            &["visc"][..],
            &["visc", "-v"][..],
            &["visc", "--help"][..],
            &["visc", "vi", "--v40", "45", "--v100", "9"][..],
            &["visc", "-v", "curve", "--v40", "45", "--v100", "9"][..],
        ] {
            assert_eq!(rewrite_args(argv(args)), argv(args));
        }
    }

    #[test]
    fn every_subcommand_is_left_in_place() {
        for sub in crate::cli::Cli::command().get_subcommands() {
            let args = argv(&["visc", sub.get_name(), "--help"]);
            assert_eq!(rewrite_args(args.clone()), args);
        }
    }

    #[test]
    fn rewritten_args_parse() {
        let cli = crate::cli::Cli::try_parse_from(rewrite_args(argv(&["visc", "-l", "A:45:9"]))).unwrap();
        assert!(matches!(cli.command, Command::Table(_)));
    }

    #[test]
    fn log_level_resolution() {
        assert_eq!(log_level(0, None), LevelFilter::Warn);
        assert_eq!(log_level(0, Some("debug")), LevelFilter::Debug);
        assert_eq!(log_level(0, Some("nonsense")), LevelFilter::Warn);
        assert_eq!(log_level(1, Some("error")), LevelFilter::Info);
        assert_eq!(log_level(5, None), LevelFilter::Trace);
    }

    #[test]
    fn table_args_become_run_config() {
        let cli = crate::cli::Cli::try_parse_from(["visc", "table", "-l", "A:45:9", "--step", "5"]).unwrap();
        let Command::Table(args) = cli.command else {
            panic!("expected table");
        };
        let config = run_config_from_args(&args);
        assert_eq!(config.lubricants.len(), 1);
        assert_eq!(config.grid.len(), 31);
        assert_eq!(config.mark_temps, vec![40.0, 100.0]);
    }
}
