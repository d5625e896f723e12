//! Market conventions for the index calculation.
//!
//! Calendar-day time measurement, continuous compounding, and the index
//! annualization convention.

/// Calendar days per year used for both time-to-expiry and annualization.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Convert calendar days to expiry into a year fraction: t = days / 365.
pub fn year_fraction(days: u32) -> f64 {
    f64::from(days) / DAYS_PER_YEAR
}

/// Continuously compounded discount factor: e^(−r·t).
pub fn discount_factor(rate: f64, expiry: f64) -> f64 {
    (-rate * expiry).exp()
}

/// Annualize an un-annualized variance over `horizon_days` and quote it in
/// index points: 100 · √(variance · 365 / horizon_days).
pub fn variance_to_index(variance: f64, horizon_days: f64) -> f64 {
    100.0 * (variance * DAYS_PER_YEAR / horizon_days).sqrt()
}
