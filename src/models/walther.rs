//! Walther equation (ASTM D341).
//!
//! The model relates kinematic viscosity `ν` (cSt) to absolute temperature `T` (K):
//!
//! ```text
//! log10(log10(ν + C)) = A - B · log10(T)
//! ```
//!
//! Two calibration points pin down `A` and `B`; `C = 0.7` is the ASTM constant
//! for viscosities above ~1.5 cSt.
//!
//! Numerical notes:
//! - Fitting fails (rather than producing NaN constants) when `ν + C <= 1`,
//!   because the inner logarithm is then non-positive.
//! - Evaluation never panics. Temperatures at or below absolute zero give NaN and
//!   overflow in `10^(10^Z)` gives `inf`; both are reported per element.

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    CalibrationPoint, KELVIN_OFFSET, REFERENCE_TEMP_HIGH_C, REFERENCE_TEMP_LOW_C, TemperatureGrid,
};

/// ASTM D341 additive constant for viscosities above 1.5 cSt.
pub const WALTHER_C: f64 = 0.7;

/// Why a pair of calibration points cannot be turned into a Walther curve.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CalibrationError {
    #[error("viscosities must be finite and positive (got {low} and {high} cSt)")]
    NonPositive { low: f64, high: f64 },
    #[error("calibration temperatures must be distinct and above absolute zero")]
    Temperatures,
    #[error("viscosity must decrease with temperature ({low} cSt at the low point, {high} cSt at the high point)")]
    NotDecreasing { low: f64, high: f64 },
    #[error("viscosity {0} cSt is outside the Walther double-log domain")]
    LogDomain(f64),
    #[error("calibration points ({low} and {high} cSt) give non-finite Walther constants")]
    Degenerate { low: f64, high: f64 },
}

/// Fitted Walther constants for one lubricant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaltherConstants {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl WaltherConstants {
    /// Kinematic viscosity (cSt) at `temperature_c` (°C).
    ///
    /// This is the single kernel behind every scalar, slice and curve query.
    pub fn viscosity_at(&self, temperature_c: f64) -> f64 {
        let t_k = temperature_c + KELVIN_OFFSET;
        if t_k.is_nan() || t_k <= 0.0 {
            return f64::NAN;
        }
        let z = self.a - self.b * t_k.log10();
        10f64.powf(10f64.powf(z)) - self.c
    }

    /// Evaluate the curve at each temperature; output has the same length as input.
    pub fn evaluate(&self, temperatures_c: &[f64]) -> Vec<f64> {
        temperatures_c.iter().map(|&t| self.viscosity_at(t)).collect()
    }

    /// Lazy curve over `grid`.
    pub fn curve(&self, grid: TemperatureGrid) -> ViscosityCurve {
        ViscosityCurve {
            constants: *self,
            grid,
        }
    }
}

/// Fit the Walther constants from the 40 °C and 100 °C viscosities.
pub fn fit(visc_40: f64, visc_100: f64) -> Result<WaltherConstants, CalibrationError> {
    fit_points(
        CalibrationPoint::new(REFERENCE_TEMP_LOW_C, visc_40),
        CalibrationPoint::new(REFERENCE_TEMP_HIGH_C, visc_100),
    )
}

/// Fit the Walther constants from two arbitrary calibration points.
///
/// `low` must be the colder point; its viscosity must be the larger one.
pub fn fit_points(
    low: CalibrationPoint,
    high: CalibrationPoint,
) -> Result<WaltherConstants, CalibrationError> {
    let (v1, v2) = (low.viscosity_cst, high.viscosity_cst);
    if !(v1.is_finite() && v2.is_finite() && v1 > 0.0 && v2 > 0.0) {
        return Err(CalibrationError::NonPositive { low: v1, high: v2 });
    }

    let (t1, t2) = (low.temperature_kelvin(), high.temperature_kelvin());
    if !(t1.is_finite() && t2.is_finite() && t1 > 0.0 && t2 > t1) {
        return Err(CalibrationError::Temperatures);
    }
    if v1 <= v2 {
        return Err(CalibrationError::NotDecreasing { low: v1, high: v2 });
    }

    let z1 = double_log(v1)?;
    let z2 = double_log(v2)?;
    let (log_t1, log_t2) = (t1.log10(), t2.log10());

    let b = (z1 - z2) / (log_t2 - log_t1);
    let a = z1 + b * log_t1;
    if !(a.is_finite() && b.is_finite()) {
        return Err(CalibrationError::Degenerate { low: v1, high: v2 });
    }

    trace!("walther fit: v=({v1}, {v2}) -> A={a:.6}, B={b:.6}");
    Ok(WaltherConstants { a, b, c: WALTHER_C })
}

/// `log10(log10(v + C))`, rejecting arguments outside the real domain.
fn double_log(viscosity: f64) -> Result<f64, CalibrationError> {
    let shifted = viscosity + WALTHER_C;
    if shifted <= 1.0 {
        debug!("viscosity {viscosity} cSt gives log10(v + C) <= 0; no Walther curve");
        return Err(CalibrationError::LogDomain(viscosity));
    }
    Ok(shifted.log10().log10())
}

/// A lazy, restartable `(temperature, viscosity)` sequence.
///
/// Nothing is evaluated until iteration; iterating again yields the same points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViscosityCurve {
    pub constants: WaltherConstants,
    pub grid: TemperatureGrid,
}

impl ViscosityCurve {
    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    pub fn iter(&self) -> CurvePoints {
        CurvePoints {
            curve: *self,
            next: 0,
            len: self.grid.len(),
        }
    }

    /// Viscosities only, in grid order.
    pub fn viscosities(&self) -> Vec<f64> {
        self.iter().map(|(_, v)| v).collect()
    }
}

impl IntoIterator for &ViscosityCurve {
    type Item = (f64, f64);
    type IntoIter = CurvePoints;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`ViscosityCurve`].
#[derive(Debug, Clone)]
pub struct CurvePoints {
    curve: ViscosityCurve,
    next: usize,
    len: usize,
}

impl Iterator for CurvePoints {
    type Item = (f64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.len {
            return None;
        }
        let t = self.curve.grid.at(self.next);
        self.next += 1;
        Some((t, self.curve.constants.viscosity_at(t)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CurvePoints {}
