//! Per-maturity variance estimation.
//!
//! [`single_maturity_variance`] runs the full single-expiry pipeline:
//!
//! 1. implied forward/spot and ATM vol from put-call parity
//! 2. no-arbitrage and minimum-tick filters
//! 3. implied vol of every surviving quote
//! 4. Jiang–Tian strike augmentation, per side
//! 5. monotone vol interpolation with flat wings, per side
//! 6. repricing on the augmented grid
//! 7. trapezoidal integration of OTM premiums
//!
//! Each call is pure and touches only its own slice, so maturities can be
//! processed in parallel.

pub mod integration;

pub use integration::trapezoid_variance;

use serde::{Serialize, Serializer};

use crate::error::{self, VolIndexError};
use crate::implied::{black_scholes_price, BlackImpliedVol};
use crate::quotes::{MaturitySlice, OptionQuote};
use crate::smile::arbitrage::{filter_quotes, FilterReport};
use crate::smile::grid::{StrikeGrid, DEFAULT_BAND_WIDTH, DEFAULT_MAX_GAP};
use crate::smile::parity::ForwardEstimate;
use crate::smile::pchip::interpolate_vols;
use crate::types::{OptionType, Variance};

/// Numerical settings for the single-maturity pipeline.
#[derive(Debug, Clone, Copy)]
pub struct SliceParams {
    pub solver: BlackImpliedVol,
    pub min_tick: f64,
    pub band_width: f64,
    pub max_gap: f64,
}

impl Default for SliceParams {
    fn default() -> Self {
        Self {
            solver: BlackImpliedVol::default(),
            min_tick: crate::smile::arbitrage::DEFAULT_MIN_TICK,
            band_width: DEFAULT_BAND_WIDTH,
            max_gap: DEFAULT_MAX_GAP,
        }
    }
}

/// Successful variance estimate for one maturity, with its intermediates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliceEstimate {
    pub forward: ForwardEstimate,
    /// Un-annualized variance σ²·t.
    pub variance: Variance,
    pub filter: FilterReport,
    /// Number of augmented call strikes.
    pub call_grid_size: usize,
    /// Number of augmented put strikes.
    pub put_grid_size: usize,
}

/// Outcome of the pipeline for one maturity.
///
/// A failed maturity keeps its typed error and is excluded from the horizon
/// interpolation.
#[derive(Debug, Clone, PartialEq)]
pub struct MaturityVariance {
    pub days_to_expiry: u32,
    pub result: error::Result<SliceEstimate>,
}

impl MaturityVariance {
    /// The variance if the pipeline succeeded.
    pub fn variance(&self) -> Option<f64> {
        self.result.as_ref().ok().map(|e| e.variance.0)
    }
}

impl Serialize for MaturityVariance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Repr<'a> {
            days_to_expiry: u32,
            #[serde(skip_serializing_if = "Option::is_none")]
            estimate: Option<&'a SliceEstimate>,
            #[serde(skip_serializing_if = "Option::is_none")]
            error: Option<String>,
        }

        Repr {
            days_to_expiry: self.days_to_expiry,
            estimate: self.result.as_ref().ok(),
            error: self.result.as_ref().err().map(ToString::to_string),
        }
        .serialize(serializer)
    }
}

/// Estimate the un-annualized variance for one maturity slice.
///
/// # Errors
/// - [`VolIndexError::DegenerateSlice`] if there is no usable put/call pair,
///   fewer than two quotes survive filtering on a side, or fewer than two OTM
///   integration nodes remain.
/// - [`VolIndexError::SolverNonConvergence`] if a surviving quote has no
///   implied vol.
/// - [`VolIndexError::NumericalError`] if the integral is not finite.
pub fn single_maturity_variance(
    slice: &MaturitySlice,
    rate: f64,
    params: &SliceParams,
) -> error::Result<SliceEstimate> {
    if slice.days_to_expiry() == 0 {
        return Err(VolIndexError::DegenerateSlice {
            message: "slice expires today".into(),
        });
    }
    let expiry = slice.expiry();

    let forward =
        ForwardEstimate::from_quotes(slice.calls(), slice.puts(), rate, expiry, &params.solver)?;
    let spot = forward.implied_spot;

    let (calls, call_report) = filter_quotes(slice.calls(), spot, rate, expiry, params.min_tick);
    let (puts, put_report) = filter_quotes(slice.puts(), spot, rate, expiry, params.min_tick);
    let filter = call_report.merge(&put_report);

    #[cfg(feature = "logging")]
    tracing::debug!(
        days = slice.days_to_expiry(),
        implied_forward = forward.implied_forward,
        atm_vol = forward.atm_vol.0,
        kept = filter.kept,
        bound_violations = filter.bound_violations,
        below_tick = filter.below_tick,
        "slice filtered"
    );

    let side = SideContext {
        forward: &forward,
        rate,
        expiry,
        params,
    };
    let (call_strikes, call_prices) = side.reprice(&calls, OptionType::Call)?;
    let (put_strikes, put_prices) = side.reprice(&puts, OptionType::Put)?;

    let variance = trapezoid_variance(
        &call_strikes,
        &call_prices,
        &put_strikes,
        &put_prices,
        forward.implied_forward,
        rate,
        expiry,
    )?;
    if !variance.is_finite() {
        return Err(VolIndexError::NumericalError {
            message: format!("non-finite variance {variance}"),
        });
    }

    Ok(SliceEstimate {
        forward,
        variance: Variance(variance),
        filter,
        call_grid_size: call_strikes.len(),
        put_grid_size: put_strikes.len(),
    })
}

struct SideContext<'a> {
    forward: &'a ForwardEstimate,
    rate: f64,
    expiry: f64,
    params: &'a SliceParams,
}

impl SideContext<'_> {
    /// Augmented strikes and model premiums for one option side.
    fn reprice(
        &self,
        quotes: &[OptionQuote],
        option_type: OptionType,
    ) -> error::Result<(Vec<f64>, Vec<f64>)> {
        if quotes.len() < 2 {
            return Err(VolIndexError::DegenerateSlice {
                message: format!(
                    "{} {option_type} quotes survive filtering, at least 2 required",
                    quotes.len()
                ),
            });
        }

        let spot = self.forward.implied_spot;
        let strikes: Vec<f64> = quotes.iter().map(OptionQuote::strike).collect();
        let vols = quotes
            .iter()
            .map(|q| {
                self.params
                    .solver
                    .solve(spot, q.strike(), self.expiry, self.rate, q.price(), option_type)
                    .map(|v| v.0)
            })
            .collect::<error::Result<Vec<f64>>>()?;

        let grid = StrikeGrid::with_params(
            &strikes,
            self.forward.std_dev(self.expiry),
            self.forward.implied_forward,
            self.params.band_width,
            self.params.max_gap,
        )?
        .into_strikes();
        let grid_vols = interpolate_vols(&strikes, &vols, &grid)?;

        let prices = grid
            .iter()
            .zip(&grid_vols)
            .map(|(&k, &v)| black_scholes_price(spot, k, self.expiry, self.rate, v, option_type))
            .collect::<error::Result<Vec<f64>>>()?;
        Ok((grid, prices))
    }
}
