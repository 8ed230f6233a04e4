//! Final rounding step, applied exactly once per calculation

use crate::config::RoundingMode;

/// Round a computed premium for output
///
/// `NearestDollar` rounds half away from zero; `None` rounds to cents.
pub fn apply_final_rounding(value: f64, mode: RoundingMode) -> f64 {
    match mode {
        RoundingMode::NearestDollar => value.round(),
        RoundingMode::None => (value * 100.0).round() / 100.0,
    }
}
