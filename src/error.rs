//! Error types for the volindex library.
//!
//! All fallible operations return `Result<T, VolIndexError>` rather than
//! panicking. Per-maturity failures ([`SolverNonConvergence`] and
//! [`DegenerateSlice`]) are recoverable: the index calculation records them
//! and carries on with the remaining maturities. [`InsufficientTermStructure`]
//! is fatal for the whole index.
//!
//! [`SolverNonConvergence`]: VolIndexError::SolverNonConvergence
//! [`DegenerateSlice`]: VolIndexError::DegenerateSlice
//! [`InsufficientTermStructure`]: VolIndexError::InsufficientTermStructure

use thiserror::Error;

/// Convenience type alias for results in this crate.
pub type Result<T> = std::result::Result<T, VolIndexError>;

/// Errors that can occur while computing the volatility index.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum VolIndexError {
    /// Input data is invalid (e.g., unknown option type, negative strike, NaN rate).
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Implied-vol bisection could not bracket or converge on the target price.
    #[error("implied vol solver did not converge: {message}")]
    SolverNonConvergence { message: String },

    /// A maturity slice has no usable put/call pair or too few surviving quotes.
    #[error("degenerate slice: {message}")]
    DegenerateSlice { message: String },

    /// No maturity is close enough to the target horizon to produce an index.
    #[error("insufficient term structure: {message}")]
    InsufficientTermStructure { message: String },

    /// Numerical computation failed (e.g., NaN, negative extrapolated variance).
    #[error("numerical error: {message}")]
    NumericalError { message: String },
}

impl VolIndexError {
    /// Whether this failure only invalidates a single maturity.
    ///
    /// Recoverable failures drop the maturity from the horizon interpolation
    /// instead of aborting the index.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            VolIndexError::SolverNonConvergence { .. }
                | VolIndexError::DegenerateSlice { .. }
                | VolIndexError::NumericalError { .. }
        )
    }
}
