//! Black–Scholes–Merton pricing and implied volatility by bisection.
//!
//! # Formula
//! ```text
//! d1 = (ln(S/K) + (r + σ²/2)·t) / (σ√t),   d2 = d1 − σ√t
//! C  = S·N(d1) − K·e^(−rt)·N(d2)
//! P  = K·e^(−rt)·N(−d2) − S·N(−d1)
//! ```
//!
//! The price is strictly increasing in σ for both calls and puts, so a
//! bracketed bisection always converges when the target lies between the
//! prices at the bracket ends.

use std::f64::consts::SQRT_2;

use serde::{Deserialize, Serialize};
use statrs::function::erf::erfc;

use crate::conventions::discount_factor;
use crate::error::{self, VolIndexError};
use crate::types::{OptionType, Vol};
use crate::validate::{validate_finite, validate_positive};

/// Floor applied to the bisection midpoint to stay clear of the σ → 0 singularity.
const MIN_SIGMA: f64 = 1e-5;

/// Standard normal CDF, N(x) = erfc(−x/√2) / 2.
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// European option premium under Black–Scholes–Merton.
///
/// # Arguments
/// * `spot`: Underlying price (must be > 0)
/// * `strike`: Strike price (must be > 0)
/// * `expiry`: Time to expiry in years (must be > 0)
/// * `rate`: Continuously compounded risk-free rate (any finite value)
/// * `sigma`: Annualized volatility (must be > 0)
/// * `option_type`: Call or Put
///
/// # Errors
/// Returns [`VolIndexError::InvalidInput`] for out-of-domain inputs.
///
/// # Examples
/// ```
/// use volindex::implied::black_scholes_price;
/// use volindex::OptionType;
///
/// let call = black_scholes_price(100.0, 100.0, 1.0, 0.0, 0.2, OptionType::Call)?;
/// assert!((call - 7.9655).abs() < 1e-3);
/// # Ok::<(), volindex::VolIndexError>(())
/// ```
pub fn black_scholes_price(
    spot: f64,
    strike: f64,
    expiry: f64,
    rate: f64,
    sigma: f64,
    option_type: OptionType,
) -> error::Result<f64> {
    validate_positive(spot, "spot")?;
    validate_positive(strike, "strike")?;
    validate_positive(expiry, "expiry")?;
    validate_finite(rate, "rate")?;
    validate_positive(sigma, "sigma")?;
    Ok(price_unchecked(spot, strike, expiry, rate, sigma, option_type))
}

fn price_unchecked(
    spot: f64,
    strike: f64,
    expiry: f64,
    rate: f64,
    sigma: f64,
    option_type: OptionType,
) -> f64 {
    let sqrt_t = expiry.sqrt();
    let d1 = ((spot / strike).ln() + (rate + 0.5 * sigma * sigma) * expiry) / (sigma * sqrt_t);
    let d2 = d1 - sigma * sqrt_t;
    let discounted_strike = strike * discount_factor(rate, expiry);
    match option_type {
        OptionType::Call => spot * norm_cdf(d1) - discounted_strike * norm_cdf(d2),
        OptionType::Put => discounted_strike * norm_cdf(-d2) - spot * norm_cdf(-d1),
    }
}

/// Bracket and stopping rule for the bisection solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BisectionConfig {
    /// Lower volatility bracket.
    pub low: f64,
    /// Upper volatility bracket.
    pub high: f64,
    /// Maximum number of halvings before giving up.
    pub max_iter: usize,
    /// Absolute tolerance on the repriced premium.
    pub tol: f64,
}

impl Default for BisectionConfig {
    fn default() -> Self {
        Self {
            low: 1e-5,
            high: 5.0,
            max_iter: 10_000,
            tol: 1e-6,
        }
    }
}

/// Black–Scholes implied volatility calculator using bisection on σ.
///
/// # Examples
/// ```
/// use volindex::implied::{black_scholes_price, BlackImpliedVol};
/// use volindex::OptionType;
///
/// let price = black_scholes_price(100.0, 105.0, 0.25, 0.02, 0.3, OptionType::Put)?;
/// let vol = BlackImpliedVol::compute(100.0, 105.0, 0.25, 0.02, price, OptionType::Put)?;
/// assert!((vol.0 - 0.3).abs() < 1e-4);
/// # Ok::<(), volindex::VolIndexError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BlackImpliedVol {
    config: BisectionConfig,
}

impl BlackImpliedVol {
    /// Create a solver with a custom bracket and stopping rule.
    ///
    /// # Errors
    /// Returns [`VolIndexError::InvalidInput`] if the bracket is not
    /// `0 < low < high`, the tolerance is not positive, or `max_iter` is zero.
    pub fn with_config(config: BisectionConfig) -> error::Result<Self> {
        validate_positive(config.low, "bisection low")?;
        validate_positive(config.high, "bisection high")?;
        validate_positive(config.tol, "bisection tol")?;
        if config.high <= config.low {
            return Err(VolIndexError::InvalidInput {
                message: format!(
                    "bisection bracket must satisfy low < high, got [{}, {}]",
                    config.low, config.high
                ),
            });
        }
        if config.max_iter == 0 {
            return Err(VolIndexError::InvalidInput {
                message: "bisection max_iter must be at least 1".into(),
            });
        }
        Ok(Self { config })
    }

    /// The bracket and stopping rule in use.
    pub fn config(&self) -> &BisectionConfig {
        &self.config
    }

    /// Compute implied volatility with the default bracket `[1e-5, 5]`.
    ///
    /// # Errors
    /// See [`solve`](Self::solve).
    pub fn compute(
        spot: f64,
        strike: f64,
        expiry: f64,
        rate: f64,
        option_price: f64,
        option_type: OptionType,
    ) -> error::Result<Vol> {
        Self::default().solve(spot, strike, expiry, rate, option_price, option_type)
    }

    /// Solve for σ such that the Black–Scholes premium matches `option_price`.
    ///
    /// # Errors
    /// Returns [`VolIndexError::InvalidInput`] for out-of-domain pricing inputs,
    /// [`VolIndexError::SolverNonConvergence`] if the target cannot be
    /// bracketed by the prices at `low` and `high`, or if `max_iter` halvings
    /// do not bring the repricing error below `tol`.
    pub fn solve(
        &self,
        spot: f64,
        strike: f64,
        expiry: f64,
        rate: f64,
        option_price: f64,
        option_type: OptionType,
    ) -> error::Result<Vol> {
        let BisectionConfig {
            mut low,
            mut high,
            max_iter,
            tol,
        } = self.config;

        let upper_bound = black_scholes_price(spot, strike, expiry, rate, high, option_type)?;
        let lower_bound = black_scholes_price(spot, strike, expiry, rate, low, option_type)?;
        if !(lower_bound <= option_price && option_price <= upper_bound) {
            return Err(VolIndexError::SolverNonConvergence {
                message: format!(
                    "{option_type} price {option_price} at strike {strike} outside attainable range [{lower_bound}, {upper_bound}]"
                ),
            });
        }

        for _ in 0..max_iter {
            let mid = ((low + high) / 2.0).max(MIN_SIGMA);
            let estimate = price_unchecked(spot, strike, expiry, rate, mid, option_type);
            if (estimate - option_price).abs() < tol {
                return Ok(Vol(mid));
            }
            if estimate > option_price {
                high = mid;
            } else {
                low = mid;
            }
        }

        Err(VolIndexError::SolverNonConvergence {
            message: format!(
                "{option_type} price {option_price} at strike {strike} not matched within {tol} after {max_iter} iterations"
            ),
        })
    }
}
