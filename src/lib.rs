//! # volindex
//!
//! Model-free implied volatility index (VIX-style) from listed option quotes.
//!
//! Turns a cross-section of call and put quotes over several maturities into
//! one number: 100 × the annualized risk-neutral volatility expected over a
//! target horizon (30 calendar days by default).
//!
//! ## Pipeline
//!
//! 1. **`quotes`**: trim near-expiry quotes, resolve duplicates, group by maturity
//! 2. **`smile`**: put-call parity forward, no-arbitrage filter, strike grid
//!    augmentation, monotone vol interpolation
//! 3. **`variance`**: repricing and integration of OTM premiums per maturity
//! 4. **`index`**: interpolation of variance to the horizon and annualization
//!
//! Implied volatilities come from **`implied`** (Black–Scholes bisection).
//!
//! ## Design
//!
//! - **No panics.** Every fallible operation returns [`Result`]. Library code
//!   never calls `unwrap()` or `expect()`.
//! - **Recoverable maturities.** A maturity whose estimate fails is recorded
//!   in the [`IndexReport`] with its typed error and excluded from the horizon
//!   interpolation. Only a missing term structure is fatal.
//! - **Pure and parallel.** Maturities are independent; with the `parallel`
//!   feature they run on the rayon pool. Results are identical either way.
//! - **Serializable.** Quotes deserialize with validation, and reports and
//!   configs round-trip through any Serde format.
//!
//! ```
//! use volindex::{compute_index, OptionQuote, OptionType};
//! use volindex::implied::black_scholes_price;
//!
//! let t = 30.0 / 365.0;
//! let mut quotes = Vec::new();
//! for i in 0..=16 {
//!     let strike = 80.0 + 2.5 * f64::from(i);
//!     for ty in [OptionType::Call, OptionType::Put] {
//!         let price = black_scholes_price(100.0, strike, t, 0.02, 0.25, ty)?;
//!         quotes.push(OptionQuote::new(ty, strike, price, 30)?);
//!     }
//! }
//!
//! let index = compute_index(&quotes, 0.02, 30)?;
//! assert!((index - 25.0).abs() < 0.5);
//! # Ok::<(), volindex::VolIndexError>(())
//! ```

pub mod conventions;
pub mod error;
pub mod implied;
pub mod index;
pub mod quotes;
pub mod smile;
pub mod types;
mod validate;
pub mod variance;

#[doc(inline)]
pub use error::{Result, VolIndexError};
#[doc(inline)]
pub use index::{compute_index, IndexBuilder, IndexCalculator, IndexConfig, IndexReport};
#[doc(inline)]
pub use quotes::OptionQuote;
#[doc(inline)]
pub use types::{OptionType, Variance, Vol};
