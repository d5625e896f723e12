//! Implied forward and spot from put-call parity.
//!
//! The anchor strike is the one where the call and put premiums are closest;
//! parity at that strike gives the forward the market is pricing:
//!
//! ```text
//! F = (C − P)·e^(rt) + K,    S = F·e^(−rt) = C − P + K·e^(−rt)
//! ```
//!
//! The ATM volatility is the mean of the call and put implied vols at the
//! anchor, both computed against the implied spot.

use serde::{Deserialize, Serialize};

use crate::conventions::discount_factor;
use crate::error::{self, VolIndexError};
use crate::implied::BlackImpliedVol;
use crate::quotes::OptionQuote;
use crate::types::{OptionType, Vol};

/// Implied forward from a call/put pair at one strike: F = (C − P)·e^(rt) + K.
pub fn implied_forward(call: f64, put: f64, strike: f64, rate: f64, expiry: f64) -> f64 {
    (call - put) / discount_factor(rate, expiry) + strike
}

/// Implied spot from a call/put pair at one strike: S = C − P + K·e^(−rt).
pub fn implied_spot(call: f64, put: f64, strike: f64, rate: f64, expiry: f64) -> f64 {
    call - put + strike * discount_factor(rate, expiry)
}

/// Forward, spot and ATM volatility backed out of one maturity slice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForwardEstimate {
    /// Strike with the smallest |call − put| premium gap.
    pub anchor_strike: f64,
    pub implied_spot: f64,
    pub implied_forward: f64,
    /// Mean of the anchor call and put implied vols (annualized).
    pub atm_vol: Vol,
}

impl ForwardEstimate {
    /// Estimate the forward from call and put quotes sorted by strike.
    ///
    /// Only strikes quoted on both sides are candidates. Ties in |C − P| go
    /// to the lowest strike.
    ///
    /// # Errors
    /// Returns [`VolIndexError::DegenerateSlice`] if no strike is quoted on
    /// both sides, the implied spot is not positive, or either anchor
    /// implied vol cannot be solved.
    pub fn from_quotes(
        calls: &[OptionQuote],
        puts: &[OptionQuote],
        rate: f64,
        expiry: f64,
        solver: &BlackImpliedVol,
    ) -> error::Result<Self> {
        let (strike, call, put) =
            min_parity_gap(calls, puts).ok_or_else(|| VolIndexError::DegenerateSlice {
                message: format!(
                    "no strike quoted on both sides ({} calls, {} puts)",
                    calls.len(),
                    puts.len()
                ),
            })?;

        let forward = implied_forward(call, put, strike, rate, expiry);
        let spot = forward * discount_factor(rate, expiry);
        if !spot.is_finite() || spot <= 0.0 {
            return Err(VolIndexError::DegenerateSlice {
                message: format!("implied spot {spot} at anchor strike {strike} is not positive"),
            });
        }

        let degenerate = |e: VolIndexError| VolIndexError::DegenerateSlice {
            message: format!("ATM implied vol at anchor strike {strike}: {e}"),
        };
        let call_vol = solver
            .solve(spot, strike, expiry, rate, call, OptionType::Call)
            .map_err(degenerate)?;
        let put_vol = solver
            .solve(spot, strike, expiry, rate, put, OptionType::Put)
            .map_err(degenerate)?;

        Ok(Self {
            anchor_strike: strike,
            implied_spot: spot,
            implied_forward: forward,
            atm_vol: Vol((call_vol.0 + put_vol.0) / 2.0),
        })
    }

    /// Un-annualized ATM standard deviation σ·√t.
    pub fn std_dev(&self, expiry: f64) -> f64 {
        self.atm_vol.0 * expiry.sqrt()
    }
}

/// Merge-join both sides by strike and return the matched (strike, call, put)
/// with the smallest |call − put|.
fn min_parity_gap(calls: &[OptionQuote], puts: &[OptionQuote]) -> Option<(f64, f64, f64)> {
    let mut best: Option<(f64, f64, f64)> = None;
    let (mut i, mut j) = (0, 0);
    while i < calls.len() && j < puts.len() {
        let (c, p) = (&calls[i], &puts[j]);
        if c.strike() < p.strike() {
            i += 1;
        } else if p.strike() < c.strike() {
            j += 1;
        } else {
            let gap = (c.price() - p.price()).abs();
            if best.is_none_or(|(_, bc, bp)| gap < (bc - bp).abs()) {
                best = Some((c.strike(), c.price(), p.price()));
            }
            i += 1;
            j += 1;
        }
    }
    best
}
