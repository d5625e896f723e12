//! Trapezoidal integration of out-of-the-money premiums.
//!
//! The un-annualized risk-neutral variance for one maturity is
//!
//! ```text
//! σ²·t = 2·e^(rt) · ∫ Q(K) / K² dK
//! ```
//!
//! where Q(K) is the OTM premium: puts below the forward, calls above. The
//! trapezoid rule handles the irregular spacing of an augmented strike grid,
//! unlike the rectangle rule of the classic CBOE formula.

use crate::error::{self, VolIndexError};

/// Integrate OTM premiums over strike into an un-annualized variance.
///
/// Puts with `K ≤ forward` and calls with `K ≥ forward` are kept; in-the-money
/// legs are discarded. Both grids must be ascending. A strike equal to the
/// forward contributes from both sides, which adds a zero-width panel.
///
/// # Errors
/// Returns [`VolIndexError::InvalidInput`] if strike and price lengths differ
/// or the merged strikes are not ascending, and
/// [`VolIndexError::DegenerateSlice`] if fewer than two OTM nodes remain.
pub fn trapezoid_variance(
    call_strikes: &[f64],
    call_prices: &[f64],
    put_strikes: &[f64],
    put_prices: &[f64],
    forward: f64,
    rate: f64,
    expiry: f64,
) -> error::Result<f64> {
    if call_strikes.len() != call_prices.len() || put_strikes.len() != put_prices.len() {
        return Err(VolIndexError::InvalidInput {
            message: format!(
                "strike/price length mismatch: calls {}/{}, puts {}/{}",
                call_strikes.len(),
                call_prices.len(),
                put_strikes.len(),
                put_prices.len()
            ),
        });
    }

    let otm_puts = put_strikes
        .iter()
        .zip(put_prices)
        .filter(|(k, _)| **k <= forward);
    let otm_calls = call_strikes
        .iter()
        .zip(call_prices)
        .filter(|(k, _)| **k >= forward);
    let nodes: Vec<(f64, f64)> = otm_puts
        .chain(otm_calls)
        .map(|(&k, &q)| (k, q / (k * k)))
        .collect();

    if nodes.len() < 2 {
        return Err(VolIndexError::DegenerateSlice {
            message: format!("{} out-of-the-money nodes, at least 2 required", nodes.len()),
        });
    }
    if let Some(w) = nodes.windows(2).find(|w| w[1].0 < w[0].0) {
        return Err(VolIndexError::InvalidInput {
            message: format!("strikes must be ascending, got {} after {}", w[1].0, w[0].0),
        });
    }

    let integral: f64 = nodes
        .windows(2)
        .map(|w| 0.5 * (w[1].0 - w[0].0) * (w[0].1 + w[1].1))
        .sum();
    Ok(2.0 * (rate * expiry).exp() * integral)
}
