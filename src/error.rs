//! Application-level error carrying a process exit code.
//!
//! Numeric errors (`CalibrationError`, `IndexError`) stay inside the library and
//! are usually absorbed as NaN. `AppError` is what the `visc` binary reports.

use crate::models::{CalibrationError, IndexError};

/// Exit code for bad arguments, unreadable files and malformed input.
pub const EXIT_INPUT: u8 = 2;
/// Exit code when no usable lubricant remains after validation.
pub const EXIT_NO_DATA: u8 = 3;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(EXIT_INPUT, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<CalibrationError> for AppError {
    fn from(err: CalibrationError) -> Self {
        Self::input(format!("Invalid calibration: {err}"))
    }
}

impl From<IndexError> for AppError {
    fn from(err: IndexError) -> Self {
        Self::input(format!("Viscosity index undefined: {err}"))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
