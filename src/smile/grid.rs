//! Strike grid augmentation following Jiang & Tian (2005).
//!
//! The variance integral is truncated at the listed strikes and discretized at
//! their spacing. Both errors are bounded by augmenting the listed strikes:
//!
//! - **Truncation**: the grid is extended to `[F·e^(−8σ), F·e^(8σ)]`, where
//!   σ is the un-annualized ATM standard deviation σ_atm·√t.
//! - **Discretization**: no two consecutive strikes are more than `0.35·σ·F`
//!   apart.
//!
//! The forward itself is always a grid node so the OTM put and call legs meet
//! exactly at F.
//!
//! # References
//! - Jiang, G.J. & Tian, Y.S. "The Model-Free Implied Volatility and Its
//!   Information Content" (2005)

use crate::error::{self, VolIndexError};
use crate::validate::validate_positive;

/// Half-width of the strike band in standard deviations.
pub const DEFAULT_BAND_WIDTH: f64 = 8.0;

/// Maximum strike spacing in standard deviations (scaled by the forward).
pub const DEFAULT_MAX_GAP: f64 = 0.35;

/// Largest grid `with_params` will build. A near-zero σ or `max_gap` would
/// otherwise ask for billions of nodes.
pub const MAX_GRID_POINTS: usize = 100_000;

/// Strictly increasing strike grid covering the integration band.
///
/// # Examples
/// ```
/// use volindex::smile::StrikeGrid;
///
/// let grid = StrikeGrid::jiang_tian(&[95.0, 100.0, 105.0], 0.05, 100.0)?;
/// let strikes = grid.strikes();
/// assert!(strikes[0] <= 100.0 * (-0.4_f64).exp() + 1e-9);
/// assert!(strikes.windows(2).all(|w| w[1] - w[0] <= 0.35 * 0.05 * 100.0 + 1e-9));
/// # Ok::<(), volindex::VolIndexError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StrikeGrid {
    strikes: Vec<f64>,
}

impl StrikeGrid {
    /// Augment `strikes` with the default band width (8σ) and spacing (0.35σ).
    ///
    /// # Errors
    /// See [`with_params`](Self::with_params).
    pub fn jiang_tian(strikes: &[f64], std_dev: f64, forward: f64) -> error::Result<Self> {
        Self::with_params(strikes, std_dev, forward, DEFAULT_BAND_WIDTH, DEFAULT_MAX_GAP)
    }

    /// Augment `strikes` to span `forward·e^(±band_width·std_dev)` with
    /// spacing at most `max_gap·std_dev·forward`.
    ///
    /// Input strikes need not be sorted. Exact duplicates, whether listed
    /// twice or produced by coinciding synthetic points, appear once.
    ///
    /// # Errors
    /// Returns [`VolIndexError::InvalidInput`] if `strikes` is empty or holds
    /// a non-positive strike, or if any scalar parameter is not positive and
    /// finite. Returns [`VolIndexError::NumericalError`] if the filled grid
    /// would exceed [`MAX_GRID_POINTS`].
    pub fn with_params(
        strikes: &[f64],
        std_dev: f64,
        forward: f64,
        band_width: f64,
        max_gap: f64,
    ) -> error::Result<Self> {
        validate_positive(std_dev, "std_dev")?;
        validate_positive(forward, "forward")?;
        validate_positive(band_width, "band_width")?;
        validate_positive(max_gap, "max_gap")?;
        if strikes.is_empty() {
            return Err(VolIndexError::InvalidInput {
                message: "strike grid requires at least one listed strike".into(),
            });
        }
        for &k in strikes {
            validate_positive(k, "strike")?;
        }

        let mut grid = strikes.to_vec();
        grid.sort_by(f64::total_cmp);

        let lower = forward * (-band_width * std_dev).exp();
        let upper = forward * (band_width * std_dev).exp();
        if lower < grid[0] {
            grid.insert(0, lower);
        }
        if upper > grid[grid.len() - 1] {
            grid.push(upper);
        }
        if !grid.contains(&forward) {
            grid.push(forward);
        }
        grid.sort_by(f64::total_cmp);
        grid.dedup();

        let threshold = max_gap * std_dev * forward;
        // floor(gap/threshold) interior points split each gap into equal
        // pieces strictly shorter than the threshold.
        let inserts: Vec<f64> = grid
            .windows(2)
            .map(|w| ((w[1] - w[0]) / threshold).floor())
            .collect();
        let total = grid.len() as f64 + inserts.iter().sum::<f64>();
        if total > MAX_GRID_POINTS as f64 {
            return Err(VolIndexError::NumericalError {
                message: format!(
                    "strike grid needs {total} points at spacing {threshold}, limit is {MAX_GRID_POINTS}"
                ),
            });
        }

        let mut filled = Vec::with_capacity(total as usize);
        for (w, &n) in grid.windows(2).zip(&inserts) {
            filled.push(w[0]);
            let n = n as usize;
            let step = (w[1] - w[0]) / (n + 1) as f64;
            filled.extend((1..=n).map(|j| w[0] + step * j as f64));
        }
        filled.push(grid[grid.len() - 1]);

        Ok(Self { strikes: filled })
    }

    /// Grid strikes in ascending order.
    pub fn strikes(&self) -> &[f64] {
        &self.strikes
    }

    pub fn len(&self) -> usize {
        self.strikes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strikes.is_empty()
    }

    pub fn into_strikes(self) -> Vec<f64> {
        self.strikes
    }
}
