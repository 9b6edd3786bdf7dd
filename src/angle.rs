//! Angle wrapping

use std::f64::consts::TAU;

#[derive(Debug, thiserror::Error)]
pub enum AngleError {
    #[error("upper bound ({upper}) must be greater than lower bound ({lower})")]
    Range { lower: f64, upper: f64 },
    #[error("cannot normalize non-finite angle {0}")]
    NotFinite(f64),
}
pub type Result<T> = std::result::Result<T, AngleError>;

/// Brings `angle` into `[lower,upper]` by adding or subtracting full turns
///
/// Full turns are first added while `angle<lower` and then subtracted while `angle>upper`,
/// so an interval narrower than $2\pi$ may not contain the result.
pub fn normalize(angle: f64, lower: f64, upper: f64) -> Result<f64> {
    if upper <= lower {
        return Err(AngleError::Range { lower, upper });
    }
    if !angle.is_finite() {
        return Err(AngleError::NotFinite(angle));
    }
    let mut angle = angle;
    if angle < lower {
        angle += ((lower - angle) / TAU).ceil() * TAU;
    }
    if angle > upper {
        angle -= ((angle - upper) / TAU).ceil() * TAU;
    }
    Ok(angle)
}
/// Brings `angle` into $[0,2\pi]$
pub fn normalize_full_turn(angle: f64) -> Result<f64> {
    normalize(angle, 0f64, TAU)
}
