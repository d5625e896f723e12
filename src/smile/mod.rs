//! Single-expiry smile construction.
//!
//! Everything needed to turn one maturity's quotes into a dense implied-vol
//! curve:
//!
//! - [`ForwardEstimate`]: implied forward, spot and ATM vol from put-call parity
//! - [`filter_quotes`]: no-arbitrage bound and minimum-tick filters
//! - [`StrikeGrid`]: Jiang–Tian strike augmentation
//! - [`PchipSmile`]: monotone cubic interpolation with flat wings

pub mod arbitrage;
pub mod grid;
pub mod parity;
pub mod pchip;

pub use arbitrage::{filter_quotes, FilterReport};
pub use grid::StrikeGrid;
pub use parity::ForwardEstimate;
pub use pchip::{interpolate_vols, PchipSmile};
