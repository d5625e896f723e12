//! No-arbitrage and minimum-tick quote filters.
//!
//! Static no-arbitrage bounds for European premiums, with S the implied spot
//! and D = e^(−rt):
//!
//! ```text
//! call:  max(S − K·D, 0) ≤ C ≤ S
//! put:   max(K·D − S, 0) ≤ P ≤ K·D
//! ```
//!
//! Quotes outside the band are stale or mis-keyed. Quotes below one tick are
//! dominated by rounding and make implied-vol inversion unstable.

use serde::{Deserialize, Serialize};

use crate::conventions::discount_factor;
use crate::quotes::OptionQuote;
use crate::types::OptionType;

/// Smallest premium treated as a meaningful price.
pub const DEFAULT_MIN_TICK: f64 = 0.0001;

/// Whether a quote's premium lies inside the static no-arbitrage band.
pub fn within_price_bounds(quote: &OptionQuote, spot: f64, rate: f64, expiry: f64) -> bool {
    let (lower, upper) = price_bounds(quote.option_type(), quote.strike(), spot, rate, expiry);
    lower <= quote.price() && quote.price() <= upper
}

/// Whether a quote's premium is at least `min_tick`.
pub fn above_min_tick(quote: &OptionQuote, min_tick: f64) -> bool {
    quote.price() >= min_tick
}

/// The (lower, upper) no-arbitrage premium band for one contract.
pub fn price_bounds(
    option_type: OptionType,
    strike: f64,
    spot: f64,
    rate: f64,
    expiry: f64,
) -> (f64, f64) {
    let pv_strike = strike * discount_factor(rate, expiry);
    match option_type {
        OptionType::Call => ((spot - pv_strike).max(0.0), spot),
        OptionType::Put => ((pv_strike - spot).max(0.0), pv_strike),
    }
}

/// Counts of quotes removed by each filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterReport {
    /// Quotes that passed both filters.
    pub kept: usize,
    /// Quotes outside the no-arbitrage band.
    pub bound_violations: usize,
    /// Quotes inside the band but below the minimum tick.
    pub below_tick: usize,
}

impl FilterReport {
    /// Total number of quotes examined.
    pub fn total(&self) -> usize {
        self.kept + self.bound_violations + self.below_tick
    }

    /// Combine the counts of two filter passes (e.g., call and put sides).
    pub fn merge(&self, other: &FilterReport) -> FilterReport {
        FilterReport {
            kept: self.kept + other.kept,
            bound_violations: self.bound_violations + other.bound_violations,
            below_tick: self.below_tick + other.below_tick,
        }
    }
}

/// Apply the bounds filter, then the tick filter.
///
/// Surviving quotes are returned unchanged and in their original order.
pub fn filter_quotes(
    quotes: &[OptionQuote],
    spot: f64,
    rate: f64,
    expiry: f64,
    min_tick: f64,
) -> (Vec<OptionQuote>, FilterReport) {
    let mut report = FilterReport::default();
    let mut kept = Vec::with_capacity(quotes.len());
    for q in quotes {
        if !within_price_bounds(q, spot, rate, expiry) {
            report.bound_violations += 1;
        } else if !above_min_tick(q, min_tick) {
            report.below_tick += 1;
        } else {
            report.kept += 1;
            kept.push(*q);
        }
    }
    (kept, report)
}
