//! Plain-number entry points for front ends.
//!
//! These never fail: rejected calibrations and out-of-range inputs come back as
//! NaN so callers can show a warning instead of handling an error type. Use
//! [`crate::models`] directly when the reason matters.

use log::debug;

use crate::models::{self, WaltherConstants};

/// Fit a Walther curve to `(visc_40, visc_100)` and evaluate it at each temperature (°C).
///
/// The output has the same length as `temperatures`. An invalid calibration gives
/// an all-NaN vector.
pub fn fit_and_evaluate(visc_40: f64, visc_100: f64, temperatures: &[f64]) -> Vec<f64> {
    match models::fit(visc_40, visc_100) {
        Ok(constants) => constants.evaluate(temperatures),
        Err(e) => {
            debug!("no curve for ({visc_40}, {visc_100}): {e}");
            vec![f64::NAN; temperatures.len()]
        }
    }
}

/// Viscosity (cSt) at a single temperature (°C).
pub fn evaluate_at(visc_40: f64, visc_100: f64, temperature: f64) -> f64 {
    fit_and_evaluate(visc_40, visc_100, &[temperature])[0]
}

/// ASTM D2270 Viscosity Index, or NaN when it is undefined.
pub fn viscosity_index(visc_40: f64, visc_100: f64) -> f64 {
    match models::compute(visc_40, visc_100) {
        Ok(vi) => vi.value,
        Err(e) => {
            debug!("no viscosity index for ({visc_40}, {visc_100}): {e}");
            f64::NAN
        }
    }
}

/// Fitted constants, or `None` for an invalid calibration.
pub fn walther_constants(visc_40: f64, visc_100: f64) -> Option<WaltherConstants> {
    models::fit(visc_40, visc_100).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn evaluates_reference_lubricant() {
        assert_relative_eq!(evaluate_at(45.0, 9.0, 40.0), 45.0, max_relative = 1e-6);
        assert_relative_eq!(evaluate_at(45.0, 9.0, 100.0), 9.0, max_relative = 1e-6);

        let cold = evaluate_at(45.0, 9.0, 0.0);
        assert!(cold.is_finite() && cold > 45.0);
    }

    #[test]
    fn invalid_calibration_gives_all_nan() {
        let out = fit_and_evaluate(10.0, 11.0, &[0.0, 40.0, 100.0]);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|v| v.is_nan()));

        assert!(fit_and_evaluate(0.0, -1.0, &[20.0])[0].is_nan());
        assert!(fit_and_evaluate(10.0, 11.0, &[]).is_empty());
        assert!(walther_constants(10.0, 11.0).is_none());
    }

    #[test]
    fn scalar_matches_grid_query() {
        let temps = [0.0, 25.0, 40.0, 75.0, 100.0, 150.0];
        let grid = fit_and_evaluate(68.0, 8.7, &temps);
        for (t, v) in temps.iter().zip(&grid) {
            assert_eq!(evaluate_at(68.0, 8.7, *t).to_bits(), v.to_bits());
        }
    }

    #[test]
    fn sub_absolute_zero_is_nan() {
        assert!(evaluate_at(45.0, 9.0, -273.15).is_nan());
        assert!(evaluate_at(45.0, 9.0, -500.0).is_nan());
    }

    #[test]
    fn viscosity_index_values() {
        let vi = viscosity_index(126.0, 16.2);
        assert!((vi - 137.0).abs() < 1.5, "got {vi}");
        assert!(viscosity_index(10.0, 11.0).is_nan());
        assert!(viscosity_index(10.0, 1.0).is_nan());
    }
}
