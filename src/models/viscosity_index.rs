//! Viscosity Index (ASTM D2270).
//!
//! For a sample with kinematic viscosities `U` at 40 °C and `Y` at 100 °C:
//!
//! 1. Look up `L` and `H`, the 40 °C viscosities of the VI-0 and VI-100 reference
//!    oils that share the sample's 100 °C viscosity `Y`.
//! 2. If `U > H`, use Procedure A: `VI = (L - U) / (L - H) · 100`
//!    (negative when `U > L`).
//! 3. Otherwise use Procedure B:
//!    `N = (log10 H - log10 U) / log10 Y`, `VI = (10^N - 1) / 0.00715 + 100`.
//!
//! `L` and `H` come from the closed-form quadratic fits of the D2270 reference
//! table (piecewise for `2 <= Y <= 70`, a single quadratic above 70 cSt). The
//! fits are continuous at the band edges to within a few tenths of a percent.

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::IndexProcedure;

/// Lowest 100 °C viscosity covered by the reference data (cSt).
pub const MIN_KV100: f64 = 2.0;

/// Upper edge of the piecewise reference fits (cSt).
pub const PIECEWISE_MAX_KV100: f64 = 70.0;

const PROCEDURE_B_DIVISOR: f64 = 0.00715;

/// Quadratic `a·Y² + b·Y + c`.
#[derive(Debug, Clone, Copy)]
struct Quadratic {
    a: f64,
    b: f64,
    c: f64,
}

impl Quadratic {
    const fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    fn eval(&self, y: f64) -> f64 {
        (self.a * y + self.b) * y + self.c
    }
}

/// One band of the reference fits, valid for `previous upper < Y <= upper`.
#[derive(Debug, Clone, Copy)]
struct ReferenceBand {
    upper: f64,
    l: Quadratic,
    h: Quadratic,
}

const fn band(upper: f64, l: [f64; 3], h: [f64; 3]) -> ReferenceBand {
    ReferenceBand {
        upper,
        l: Quadratic::new(l[0], l[1], l[2]),
        h: Quadratic::new(h[0], h[1], h[2]),
    }
}

static REFERENCE_BANDS: [ReferenceBand; 15] = [
    band(3.8, [1.14673, 1.7576, -0.109], [0.84155, 1.5521, -0.077]),
    band(4.4, [3.38095, -15.4952, 33.196], [0.78571, 1.7929, -0.183]),
    band(5.0, [2.5, -7.2143, 13.812], [0.82143, 1.5679, 0.119]),
    band(6.4, [0.101, 16.635, -45.469], [0.04985, 9.1613, -18.557]),
    band(7.0, [3.35714, -23.5643, 78.466], [0.22619, 7.7369, -16.656]),
    band(7.7, [0.01191, 21.475, -72.870], [0.79762, -0.7321, 14.610]),
    band(9.0, [0.41858, 16.1558, -56.040], [0.05794, 10.5156, -28.240]),
    band(12.0, [0.88779, 7.5527, -16.600], [0.26665, 6.7015, -10.810]),
    band(15.0, [0.7672, 10.7972, -38.180], [0.20073, 8.4658, -22.490]),
    band(18.0, [0.97305, 5.3135, -2.200], [0.28889, 5.9741, -4.930]),
    band(22.0, [0.97256, 5.2480, -0.980], [0.24504, 7.4160, -16.730]),
    band(28.0, [0.91413, 7.4052, -21.820], [0.20323, 9.1267, -34.230]),
    band(40.0, [0.87031, 9.7613, -50.770], [0.18411, 10.1015, -46.750]),
    band(55.0, [0.84703, 12.0848, -106.190], [0.17029, 11.4307, -76.350]),
    band(70.0, [0.85921, 11.1336, -85.070], [0.17385, 11.0661, -67.630]),
];

/// Simplified fits used above [`PIECEWISE_MAX_KV100`].
const HIGH_L: Quadratic = Quadratic::new(0.8353, 14.67, -216.0);
const HIGH_H: Quadratic = Quadratic::new(0.1684, 11.85, -97.0);

/// Why a Viscosity Index could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum IndexError {
    #[error("viscosities must be finite (got {kv40} and {kv100} cSt)")]
    NonFinite { kv40: f64, kv100: f64 },
    #[error("viscosity at 100 °C must be finite (got {0} cSt)")]
    NonFiniteKv100(f64),
    #[error("viscosity at 40 °C ({kv40} cSt) must exceed viscosity at 100 °C ({kv100} cSt)")]
    NotDecreasing { kv40: f64, kv100: f64 },
    #[error("viscosity at 100 °C ({0} cSt) is below the ASTM D2270 range (>= 2.0 cSt)")]
    OutOfTableRange(f64),
}

/// 40 °C viscosities of the VI-0 (`l`) and VI-100 (`h`) reference oils.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceViscosities {
    pub l: f64,
    pub h: f64,
}

/// A computed Viscosity Index together with the inputs to its formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViscosityIndex {
    pub value: f64,
    pub procedure: IndexProcedure,
    pub l: f64,
    pub h: f64,
}

impl ViscosityIndex {
    /// VI as reported by D2270: nearest whole number.
    pub fn rounded(&self) -> f64 {
        self.value.round()
    }
}

/// Reference viscosities `L` and `H` for a 100 °C viscosity `kv100`.
pub fn reference_viscosities(kv100: f64) -> Result<ReferenceViscosities, IndexError> {
    if !kv100.is_finite() {
        return Err(IndexError::NonFiniteKv100(kv100));
    }
    if kv100 < MIN_KV100 {
        return Err(IndexError::OutOfTableRange(kv100));
    }

    let (l, h) = match REFERENCE_BANDS.iter().find(|b| kv100 <= b.upper) {
        Some(b) => (b.l.eval(kv100), b.h.eval(kv100)),
        None => (HIGH_L.eval(kv100), HIGH_H.eval(kv100)),
    };
    Ok(ReferenceViscosities { l, h })
}

/// Compute the ASTM D2270 Viscosity Index.
pub fn compute(kv40: f64, kv100: f64) -> Result<ViscosityIndex, IndexError> {
    if !(kv40.is_finite() && kv100.is_finite()) {
        return Err(IndexError::NonFinite { kv40, kv100 });
    }
    if kv100 < MIN_KV100 {
        debug!("kv100={kv100} cSt is below the D2270 reference range");
        return Err(IndexError::OutOfTableRange(kv100));
    }
    if kv40 <= kv100 {
        return Err(IndexError::NotDecreasing { kv40, kv100 });
    }

    let ReferenceViscosities { l, h } = reference_viscosities(kv100)?;
    let u = kv40;

    let (value, procedure) = if u > l {
        (procedure_a(u, l, h), IndexProcedure::Negative)
    } else if u <= h {
        (procedure_b(u, h, kv100), IndexProcedure::B)
    } else {
        (procedure_a(u, l, h), IndexProcedure::A)
    };

    Ok(ViscosityIndex {
        value,
        procedure,
        l,
        h,
    })
}

fn procedure_a(u: f64, l: f64, h: f64) -> f64 {
    (l - u) / (l - h) * 100.0
}

fn procedure_b(u: f64, h: f64, y: f64) -> f64 {
    let n = (h.log10() - u.log10()) / y.log10();
    (10f64.powf(n) - 1.0) / PROCEDURE_B_DIVISOR + 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn reference_values_match_astm_table() {
        let r = reference_viscosities(8.86).unwrap();
        assert_abs_diff_eq!(r.l, 119.94, epsilon = 0.05);
        assert_abs_diff_eq!(r.h, 69.48, epsilon = 0.05);

        let r = reference_viscosities(2.0).unwrap();
        assert_abs_diff_eq!(r.l, 7.994, epsilon = 0.01);
        assert_abs_diff_eq!(r.h, 6.394, epsilon = 0.01);

        let r = reference_viscosities(5.05).unwrap();
        assert_abs_diff_eq!(r.h, 28.97, epsilon = 0.05);
    }

    #[test]
    fn procedure_a_worked_example() {
        let vi = compute(73.30, 8.86).unwrap();
        assert_eq!(vi.procedure, IndexProcedure::A);
        assert_abs_diff_eq!(vi.value, 92.43, epsilon = 0.2);
        assert_eq!(vi.rounded(), 92.0);
    }

    #[test]
    fn procedure_b_worked_example() {
        let vi = compute(22.83, 5.05).unwrap();
        assert_eq!(vi.procedure, IndexProcedure::B);
        assert_abs_diff_eq!(vi.value, 156.4, epsilon = 0.3);
        assert_eq!(vi.rounded(), 156.0);
    }

    #[test]
    fn high_vi_gear_oil() {
        let vi = compute(126.0, 16.2).unwrap();
        assert_eq!(vi.procedure, IndexProcedure::B);
        assert_abs_diff_eq!(vi.value, 137.0, epsilon = 1.5);
    }

    #[test]
    fn negative_vi_when_thinner_than_l() {
        let vi = compute(140.0, 8.86).unwrap();
        assert_eq!(vi.procedure, IndexProcedure::Negative);
        assert!(vi.value < 0.0, "got {}", vi.value);
    }

    #[test]
    fn procedures_agree_at_h() {
        let r = reference_viscosities(10.0).unwrap();
        let vi = compute(r.h, 10.0).unwrap();
        assert_abs_diff_eq!(vi.value, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn rejects_invalid_inputs() {
        assert!(matches!(compute(10.0, 11.0), Err(IndexError::NotDecreasing { .. })));
        assert_eq!(compute(10.0, 1.5), Err(IndexError::OutOfTableRange(1.5)));
        assert!(matches!(compute(f64::NAN, 9.0), Err(IndexError::NonFinite { .. })));
    }

    #[test]
    fn reference_lookup_reports_only_kv100() {
        let err = reference_viscosities(f64::INFINITY).unwrap_err();
        assert_eq!(err, IndexError::NonFiniteKv100(f64::INFINITY));
        assert!(!err.to_string().contains("NaN"));
    }

    #[test]
    fn bands_are_continuous() {
        for pair in REFERENCE_BANDS.windows(2) {
            let y = pair[0].upper;
            for (lo, hi) in [(pair[0].l, pair[1].l), (pair[0].h, pair[1].h)] {
                let (a, b) = (lo.eval(y), hi.eval(y));
                assert!((a - b).abs() / a < 5e-3, "jump at Y={y}: {a} vs {b}");
            }
        }

        let last = REFERENCE_BANDS[REFERENCE_BANDS.len() - 1];
        let y = PIECEWISE_MAX_KV100;
        assert!((last.l.eval(y) - HIGH_L.eval(y)).abs() / HIGH_L.eval(y) < 5e-3);
        assert!((last.h.eval(y) - HIGH_H.eval(y)).abs() / HIGH_H.eval(y) < 5e-3);
    }

    #[test]
    fn very_viscous_oils_use_simplified_fit() {
        let r = reference_viscosities(100.0).unwrap();
        assert_abs_diff_eq!(r.l, HIGH_L.eval(100.0), epsilon = 1e-12);
        assert_abs_diff_eq!(r.h, HIGH_H.eval(100.0), epsilon = 1e-12);
    }
}
