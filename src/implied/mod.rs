//! Option pricing and implied volatility extraction.
//!
//! - [`black_scholes_price`]: closed-form European premium (Black–Scholes–Merton)
//! - [`BlackImpliedVol`]: bisection inversion of the premium in σ

pub mod black;

pub use black::{black_scholes_price, norm_cdf, BisectionConfig, BlackImpliedVol};
