//! Monotone piecewise-cubic interpolation of implied volatility.
//!
//! Fits a PCHIP (piecewise cubic Hermite interpolating polynomial) through
//! observed (strike, implied vol) points. Knot derivatives follow
//! Fritsch–Carlson: a weighted harmonic mean of the neighboring secant slopes,
//! set to zero at local extrema, so the curve never overshoots the observed
//! vols between two knots.
//!
//! Outside the observed strike range the vol is held flat at the boundary
//! value. Linear extrapolation of a skewed smile routinely prices a far OTM
//! option above a nearer one; flat wings avoid that at the cost of a slight
//! downward bias when one side of the chain is sparse.
//!
//! # References
//! - Fritsch, F.N. & Carlson, R.E. "Monotone Piecewise Cubic Interpolation" (1980)

use serde::Serialize;

use crate::error::{self, VolIndexError};
use crate::types::Vol;
use crate::validate::{validate_finite, validate_positive, validate_strictly_increasing};

/// Coefficients for one cubic polynomial interval.
///
/// On interval \[xᵢ, xᵢ₊₁\], the curve is:
/// `S(x) = a + b·(x - xᵢ) + c·(x - xᵢ)² + d·(x - xᵢ)³`
#[derive(Debug, Clone, Serialize)]
struct HermiteCoeff {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
}

/// Shape-preserving implied-vol curve for one expiry and one option side.
///
/// # Examples
///
/// ```
/// use volindex::smile::PchipSmile;
///
/// let smile = PchipSmile::new(vec![90.0, 100.0, 110.0], vec![0.30, 0.22, 0.20])?;
/// assert_eq!(smile.vol(50.0)?.0, 0.30); // flat below the first strike
/// assert_eq!(smile.vol(200.0)?.0, 0.20); // flat above the last strike
/// let mid = smile.vol(95.0)?.0;
/// assert!(mid < 0.30 && mid > 0.22);
/// # Ok::<(), volindex::VolIndexError>(())
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct PchipSmile {
    strikes: Vec<f64>,
    vols: Vec<f64>,
    coeffs: Vec<HermiteCoeff>,
}

impl PchipSmile {
    /// Fit the curve through (strike, vol) pairs.
    ///
    /// # Arguments
    /// * `strikes`: Strictly increasing strike values (at least 2)
    /// * `vols`: Finite implied vols at each strike
    ///
    /// # Errors
    /// Returns [`VolIndexError::InvalidInput`] if fewer than 2 points are
    /// given, lengths differ, strikes are not strictly increasing, or a vol
    /// is not finite.
    pub fn new(strikes: Vec<f64>, vols: Vec<f64>) -> error::Result<Self> {
        if strikes.len() != vols.len() {
            return Err(VolIndexError::InvalidInput {
                message: format!(
                    "strikes and vols must have the same length, got {} and {}",
                    strikes.len(),
                    vols.len()
                ),
            });
        }
        if strikes.len() < 2 {
            return Err(VolIndexError::InvalidInput {
                message: "monotone interpolation requires at least 2 data points".into(),
            });
        }
        validate_strictly_increasing(&strikes, "strikes")?;
        for v in &vols {
            validate_finite(*v, "vol")?;
        }

        let coeffs = build_hermite_coefficients(&strikes, &vols);
        Ok(Self {
            strikes,
            vols,
            coeffs,
        })
    }

    /// Implied vol at `strike`, flat outside the observed range.
    ///
    /// # Errors
    /// Returns [`VolIndexError::InvalidInput`] if `strike` is not positive and finite.
    pub fn vol(&self, strike: f64) -> error::Result<Vol> {
        validate_positive(strike, "strike")?;
        Ok(Vol(self.eval(strike)))
    }

    /// Implied vols at every strike in `targets`.
    ///
    /// # Errors
    /// Returns [`VolIndexError::InvalidInput`] on the first invalid strike.
    pub fn vols_at(&self, targets: &[f64]) -> error::Result<Vec<f64>> {
        targets.iter().map(|&k| self.vol(k).map(|v| v.0)).collect()
    }

    /// Lowest observed strike.
    pub fn min_strike(&self) -> f64 {
        self.strikes[0]
    }

    /// Highest observed strike.
    pub fn max_strike(&self) -> f64 {
        self.strikes[self.strikes.len() - 1]
    }

    fn eval(&self, strike: f64) -> f64 {
        let n = self.strikes.len();
        if strike <= self.strikes[0] {
            return self.vols[0];
        }
        if strike >= self.strikes[n - 1] {
            return self.vols[n - 1];
        }
        let i = self.strikes.partition_point(|&x| x <= strike) - 1;
        let dx = strike - self.strikes[i];
        let c = &self.coeffs[i];
        c.a + dx * (c.b + dx * (c.c + dx * c.d))
    }
}

/// Fit a [`PchipSmile`] through the observed points and evaluate it at `targets`.
///
/// # Errors
/// See [`PchipSmile::new`] and [`PchipSmile::vols_at`].
pub fn interpolate_vols(strikes: &[f64], vols: &[f64], targets: &[f64]) -> error::Result<Vec<f64>> {
    PchipSmile::new(strikes.to_vec(), vols.to_vec())?.vols_at(targets)
}

fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

/// One-sided three-point derivative at an end knot, clamped to preserve shape.
fn edge_derivative(h0: f64, h1: f64, m0: f64, m1: f64) -> f64 {
    let d = ((2.0 * h0 + h1) * m0 - h0 * m1) / (h0 + h1);
    if sign(d) != sign(m0) {
        0.0
    } else if sign(m0) != sign(m1) && d.abs() > 3.0 * m0.abs() {
        3.0 * m0
    } else {
        d
    }
}

fn knot_derivatives(h: &[f64], m: &[f64]) -> Vec<f64> {
    let n = h.len() + 1;
    if n == 2 {
        return vec![m[0], m[0]];
    }

    let mut d = vec![0.0; n];
    for k in 1..n - 1 {
        if sign(m[k - 1]) * sign(m[k]) <= 0 {
            continue;
        }
        let w1 = 2.0 * h[k] + h[k - 1];
        let w2 = h[k] + 2.0 * h[k - 1];
        d[k] = (w1 + w2) / (w1 / m[k - 1] + w2 / m[k]);
    }
    d[0] = edge_derivative(h[0], h[1], m[0], m[1]);
    d[n - 1] = edge_derivative(h[n - 2], h[n - 3], m[n - 2], m[n - 3]);
    d
}

fn build_hermite_coefficients(x: &[f64], y: &[f64]) -> Vec<HermiteCoeff> {
    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let m: Vec<f64> = y
        .windows(2)
        .zip(&h)
        .map(|(w, &hi)| (w[1] - w[0]) / hi)
        .collect();
    let d = knot_derivatives(&h, &m);

    (0..h.len())
        .map(|i| HermiteCoeff {
            a: y[i],
            b: d[i],
            c: (3.0 * m[i] - 2.0 * d[i] - d[i + 1]) / h[i],
            d: (d[i] + d[i + 1] - 2.0 * m[i]) / (h[i] * h[i]),
        })
        .collect()
}
