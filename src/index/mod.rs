//! Horizon index calculation across maturities.
//!
//! ```
//! use volindex::index::IndexBuilder;
//! use volindex::implied::black_scholes_price;
//! use volindex::{OptionQuote, OptionType};
//!
//! let mut quotes = Vec::new();
//! for days in [21, 42] {
//!     let t = f64::from(days) / 365.0;
//!     for i in 0..=16 {
//!         let strike = 80.0 + 2.5 * f64::from(i);
//!         for ty in [OptionType::Call, OptionType::Put] {
//!             let price = black_scholes_price(100.0, strike, t, 0.01, 0.2, ty)?;
//!             quotes.push(OptionQuote::new(ty, strike, price, days)?);
//!         }
//!     }
//! }
//!
//! let report = IndexBuilder::new().rate(0.01).horizon_days(30).build()?.compute(&quotes)?;
//! assert!((report.index - 20.0).abs() < 1.0);
//! assert_eq!(report.maturities.len(), 2);
//! # Ok::<(), volindex::VolIndexError>(())
//! ```

pub mod config;
pub mod interp;

pub use config::IndexConfig;
pub use interp::interpolate_horizon;

use serde::Serialize;

use crate::error::{self, VolIndexError};
use crate::implied::BisectionConfig;
use crate::quotes::{deduplicate, group_by_maturity, trim_near_expiry, MaturitySlice, OptionQuote};
use crate::validate::validate_finite;
use crate::variance::{single_maturity_variance, MaturityVariance, SliceParams};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Compute the index for `horizon_days` with default settings.
///
/// # Errors
/// Returns [`VolIndexError::InvalidInput`] for a non-finite rate or a zero
/// horizon, and [`VolIndexError::InsufficientTermStructure`] when no usable
/// maturity is close enough to the horizon.
pub fn compute_index(quotes: &[OptionQuote], rate: f64, horizon_days: u32) -> error::Result<f64> {
    IndexBuilder::new()
        .rate(rate)
        .horizon_days(horizon_days)
        .build()?
        .compute(quotes)
        .map(|report| report.index)
}

/// Builder for an [`IndexCalculator`].
///
/// Only the risk-free rate is required; everything else starts from
/// [`IndexConfig::default`].
#[derive(Debug, Clone, Default)]
pub struct IndexBuilder {
    rate: Option<f64>,
    config: IndexConfig,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the continuously compounded annual risk-free rate.
    pub fn rate(mut self, rate: f64) -> Self {
        self.rate = Some(rate);
        self
    }

    /// Replace all settings at once.
    pub fn config(mut self, config: IndexConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the target horizon in calendar days. Default is 30.
    pub fn horizon_days(mut self, days: u32) -> Self {
        self.config.horizon_days = days;
        self
    }

    /// Drop quotes with fewer days to expiry. Default is 7.
    pub fn min_days_to_expiry(mut self, days: u32) -> Self {
        self.config.min_days_to_expiry = days;
        self
    }

    /// Minimum meaningful premium. Default is 0.0001.
    pub fn min_tick(mut self, tick: f64) -> Self {
        self.config.min_tick = tick;
        self
    }

    /// Integration band half-width in ATM standard deviations. Default is 8.
    pub fn band_width(mut self, width: f64) -> Self {
        self.config.band_width = width;
        self
    }

    /// Maximum strike spacing in ATM standard deviations. Default is 0.35.
    pub fn max_gap(mut self, gap: f64) -> Self {
        self.config.max_gap = gap;
        self
    }

    /// The nearest maturity must be shorter than `ratio · horizon_days`. Default is 2.
    pub fn max_near_term_ratio(mut self, ratio: f64) -> Self {
        self.config.max_near_term_ratio = ratio;
        self
    }

    /// Implied-vol bisection settings.
    pub fn solver(mut self, solver: BisectionConfig) -> Self {
        self.config.solver = solver;
        self
    }

    /// Validate the settings.
    ///
    /// # Errors
    /// Returns [`VolIndexError::InvalidInput`] if the rate is missing or not
    /// finite, or any setting is out of range.
    pub fn build(self) -> error::Result<IndexCalculator> {
        let rate = self.rate.ok_or_else(|| VolIndexError::InvalidInput {
            message: "risk-free rate is required".into(),
        })?;
        validate_finite(rate, "rate")?;
        let params = self.config.slice_params()?;
        Ok(IndexCalculator {
            rate,
            config: self.config,
            params,
        })
    }
}

/// Validated index settings, reusable across quote snapshots.
#[derive(Debug, Clone, Copy)]
pub struct IndexCalculator {
    rate: f64,
    config: IndexConfig,
    params: SliceParams,
}

impl IndexCalculator {
    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Run the full calculation on one snapshot of quotes.
    ///
    /// Quotes expiring too soon are dropped, duplicates resolved, and the
    /// rest grouped by maturity. Each maturity is estimated independently. A
    /// maturity that fails is kept in the report with its error and left out
    /// of the horizon interpolation.
    ///
    /// # Errors
    /// - [`VolIndexError::InsufficientTermStructure`] if no maturity
    ///   survives trimming, the nearest maturity is too far from the horizon,
    ///   or every maturity fails.
    /// - [`VolIndexError::NumericalError`] if the interpolated variance is not
    ///   positive.
    pub fn compute(&self, quotes: &[OptionQuote]) -> error::Result<IndexReport> {
        let horizon_days = self.config.horizon_days;

        #[cfg(feature = "logging")]
        tracing::debug!(n_quotes = quotes.len(), horizon_days, "index computation started");

        let trimmed = trim_near_expiry(quotes, self.config.min_days_to_expiry);
        let slices = group_by_maturity(&deduplicate(&trimmed))?;

        let nearest = slices
            .first()
            .map(MaturitySlice::days_to_expiry)
            .ok_or_else(|| VolIndexError::InsufficientTermStructure {
                message: format!(
                    "no quotes with at least {} days to expiry",
                    self.config.min_days_to_expiry
                ),
            })?;
        if f64::from(nearest) >= self.config.near_term_limit() {
            return Err(VolIndexError::InsufficientTermStructure {
                message: format!(
                    "nearest maturity {nearest} days is too far from the {horizon_days}-day horizon"
                ),
            });
        }

        let rate = self.rate;
        let params = &self.params;
        let estimate = |slice: &MaturitySlice| {
            let result = single_maturity_variance(slice, rate, params);
            #[cfg(feature = "logging")]
            match &result {
                Ok(est) => tracing::debug!(
                    days = slice.days_to_expiry(),
                    variance = est.variance.0,
                    "maturity estimated"
                ),
                Err(e) => tracing::warn!(
                    days = slice.days_to_expiry(),
                    error = %e,
                    "maturity dropped from term structure"
                ),
            }
            MaturityVariance {
                days_to_expiry: slice.days_to_expiry(),
                result,
            }
        };

        #[cfg(feature = "parallel")]
        let maturities: Vec<MaturityVariance> = slices.par_iter().map(estimate).collect();
        #[cfg(not(feature = "parallel"))]
        let maturities: Vec<MaturityVariance> = slices.iter().map(estimate).collect();

        let report = IndexReport {
            index: 0.0,
            horizon_days,
            maturities,
        };
        let index = interpolate_horizon(&report.term_structure(), horizon_days)?;

        #[cfg(feature = "logging")]
        tracing::debug!(
            index,
            n_maturities = report.maturities.len(),
            n_failed = report.failures().count(),
            "index computation complete"
        );

        Ok(IndexReport { index, ..report })
    }
}

/// Index value with the per-maturity estimates behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexReport {
    /// 100 × annualized volatility at the horizon.
    pub index: f64,
    pub horizon_days: u32,
    /// One entry per maturity, ascending by days to expiry.
    pub maturities: Vec<MaturityVariance>,
}

impl IndexReport {
    /// (days, variance) for every maturity that succeeded.
    pub fn term_structure(&self) -> Vec<(u32, f64)> {
        self.maturities
            .iter()
            .filter_map(|m| m.variance().map(|v| (m.days_to_expiry, v)))
            .collect()
    }

    /// Maturities that failed, with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (u32, &VolIndexError)> {
        self.maturities
            .iter()
            .filter_map(|m| m.result.as_ref().err().map(|e| (m.days_to_expiry, e)))
    }
}
