//! Index calculation settings.

use serde::{Deserialize, Serialize};

use crate::error::{self, VolIndexError};
use crate::implied::{BisectionConfig, BlackImpliedVol};
use crate::smile::arbitrage::DEFAULT_MIN_TICK;
use crate::smile::grid::{DEFAULT_BAND_WIDTH, DEFAULT_MAX_GAP};
use crate::validate::{validate_non_negative, validate_positive};
use crate::variance::SliceParams;

/// Default target horizon in calendar days.
pub const DEFAULT_HORIZON_DAYS: u32 = 30;

/// Quotes with fewer days to expiry than this are dropped by default.
pub const DEFAULT_MIN_DAYS_TO_EXPIRY: u32 = 7;

/// The nearest maturity must be strictly shorter than this multiple of the horizon.
pub const DEFAULT_MAX_NEAR_TERM_RATIO: f64 = 2.0;

/// Settings for one index calculation.
///
/// Missing fields take their defaults when deserializing, so a config file
/// only needs to name what it changes.
///
/// # Examples
/// ```
/// use volindex::index::IndexConfig;
///
/// let config: IndexConfig = serde_json::from_str(r#"{"horizon_days": 60}"#).unwrap();
/// assert_eq!(config.horizon_days, 60);
/// assert_eq!(config.min_days_to_expiry, 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Target horizon in calendar days.
    pub horizon_days: u32,
    /// Quotes expiring sooner than this are ignored.
    pub min_days_to_expiry: u32,
    /// Premiums below this are dropped before implied-vol inversion.
    pub min_tick: f64,
    /// Half-width of the integration band in ATM standard deviations.
    pub band_width: f64,
    /// Maximum strike spacing in ATM standard deviations.
    pub max_gap: f64,
    /// The nearest maturity must satisfy `days < max_near_term_ratio · horizon_days`.
    pub max_near_term_ratio: f64,
    /// Implied-vol bisection settings.
    pub solver: BisectionConfig,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            horizon_days: DEFAULT_HORIZON_DAYS,
            min_days_to_expiry: DEFAULT_MIN_DAYS_TO_EXPIRY,
            min_tick: DEFAULT_MIN_TICK,
            band_width: DEFAULT_BAND_WIDTH,
            max_gap: DEFAULT_MAX_GAP,
            max_near_term_ratio: DEFAULT_MAX_NEAR_TERM_RATIO,
            solver: BisectionConfig::default(),
        }
    }
}

impl IndexConfig {
    /// Check every field and derive the per-maturity pipeline settings.
    ///
    /// # Errors
    /// Returns [`VolIndexError::InvalidInput`] if the horizon is zero, a
    /// numeric setting is out of range, or the solver bracket is invalid.
    pub fn slice_params(&self) -> error::Result<SliceParams> {
        if self.horizon_days == 0 {
            return Err(VolIndexError::InvalidInput {
                message: "horizon_days must be at least 1".into(),
            });
        }
        validate_non_negative(self.min_tick, "min_tick")?;
        validate_positive(self.band_width, "band_width")?;
        validate_positive(self.max_gap, "max_gap")?;
        validate_positive(self.max_near_term_ratio, "max_near_term_ratio")?;
        Ok(SliceParams {
            solver: BlackImpliedVol::with_config(self.solver)?,
            min_tick: self.min_tick,
            band_width: self.band_width,
            max_gap: self.max_gap,
        })
    }

    /// Largest nearest-maturity (exclusive) that still supports the horizon.
    pub fn near_term_limit(&self) -> f64 {
        self.max_near_term_ratio * f64::from(self.horizon_days)
    }
}
