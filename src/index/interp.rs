//! Interpolation of per-maturity variances to the target horizon.

use crate::conventions::variance_to_index;
use crate::error::{self, VolIndexError};

/// Interpolate variance at `horizon_days` and convert it to index points.
///
/// `points` are (days to expiry, un-annualized variance) pairs in any order.
/// Undefined (NaN, infinite) or non-positive variances are dropped first.
///
/// - One valid point: its variance is used unchanged.
/// - Several: linear interpolation in calendar days, extended linearly from
///   the two nearest maturities when the horizon lies outside their range.
///
/// The result is `100·√(variance·365/horizon_days)`.
///
/// # Errors
/// Returns [`VolIndexError::InsufficientTermStructure`] if no valid point
/// remains, [`VolIndexError::InvalidInput`] if `horizon_days` is zero or two
/// valid points share a maturity, and [`VolIndexError::NumericalError`] if
/// extrapolation produces a non-positive variance.
///
/// # Examples
/// ```
/// use volindex::index::interpolate_horizon;
///
/// let index = interpolate_horizon(&[(20, 0.0022), (40, 0.0044)], 30)?;
/// assert!((index - 100.0 * (0.0033_f64 * 365.0 / 30.0).sqrt()).abs() < 1e-9);
/// # Ok::<(), volindex::VolIndexError>(())
/// ```
pub fn interpolate_horizon(points: &[(u32, f64)], horizon_days: u32) -> error::Result<f64> {
    if horizon_days == 0 {
        return Err(VolIndexError::InvalidInput {
            message: "horizon must be at least one day".into(),
        });
    }

    let mut valid: Vec<(f64, f64)> = points
        .iter()
        .filter(|(_, v)| v.is_finite() && *v > 0.0)
        .map(|&(d, v)| (f64::from(d), v))
        .collect();
    valid.sort_by(|a, b| a.0.total_cmp(&b.0));
    if let Some(w) = valid.windows(2).find(|w| w[0].0 == w[1].0) {
        return Err(VolIndexError::InvalidInput {
            message: format!("duplicate maturity {} days in term structure", w[0].0),
        });
    }

    let horizon = f64::from(horizon_days);
    let variance = match valid.as_slice() {
        [] => {
            return Err(VolIndexError::InsufficientTermStructure {
                message: "no maturity produced a valid variance".into(),
            });
        }
        [(_, v)] => *v,
        _ => linear_at(&valid, horizon),
    };

    if !variance.is_finite() || variance <= 0.0 {
        return Err(VolIndexError::NumericalError {
            message: format!("variance {variance} at {horizon_days}-day horizon is not positive"),
        });
    }
    Ok(variance_to_index(variance, horizon))
}

/// Linear interpolation through sorted points, extrapolating from the end segments.
fn linear_at(points: &[(f64, f64)], x: f64) -> f64 {
    let n = points.len();
    let right = points.partition_point(|&(t, _)| t < x).clamp(1, n - 1);
    let (t0, v0) = points[right - 1];
    let (t1, v1) = points[right];
    v0 + (v1 - v0) * (x - t0) / (t1 - t0)
}
