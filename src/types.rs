//! Core domain types for the volatility index calculation.
//!
//! **Outputs use newtypes**: [`Vol`] and [`Variance`] wrap return values so
//! callers can't accidentally mix an annualized volatility with an
//! un-annualized variance.
//!
//! **Inputs use bare `f64`**: pricing and solver functions accept raw floats
//! and validate them on entry.
//!
//! # Why no `Eq` or `Ord`?
//! These types wrap `f64`, which does not implement `Eq` or `Ord` because `NaN`
//! breaks total ordering. We derive `PartialEq` and `PartialOrd` only.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VolIndexError;

/// Implied volatility `σ`, measured as annualized standard deviation.
///
/// # Examples
/// ```
/// use volindex::types::Vol;
/// let vol = Vol(0.20);
/// assert_eq!(vol.0, 0.20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Vol(pub f64);

/// Un-annualized risk-neutral variance for a single maturity.
///
/// # Examples
/// ```
/// use volindex::types::Variance;
/// let var = Variance(0.0033); // ~20% vol over 30 days
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Variance(pub f64);

/// Option type: call or put.
///
/// Parses from the usual text and integer codes:
///
/// ```
/// use volindex::OptionType;
///
/// assert_eq!("call".parse::<OptionType>().unwrap(), OptionType::Call);
/// assert_eq!("P".parse::<OptionType>().unwrap(), OptionType::Put);
/// assert_eq!(OptionType::try_from(-1).unwrap(), OptionType::Put);
/// assert!("straddle".parse::<OptionType>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "OptionTypeRepr")]
pub enum OptionType {
    /// Right to buy at strike price.
    Call,
    /// Right to sell at strike price.
    Put,
}

/// Accepted on input: any [`FromStr`] alias or a ±1 code.
#[derive(Deserialize)]
#[serde(untagged)]
enum OptionTypeRepr {
    Code(i32),
    Name(String),
}

impl TryFrom<OptionTypeRepr> for OptionType {
    type Error = VolIndexError;

    fn try_from(repr: OptionTypeRepr) -> Result<Self, Self::Error> {
        match repr {
            OptionTypeRepr::Code(code) => OptionType::try_from(code),
            OptionTypeRepr::Name(name) => name.parse(),
        }
    }
}

impl FromStr for OptionType {
    type Err = VolIndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "call" | "Call" | "CALL" | "c" | "C" => Ok(OptionType::Call),
            "put" | "Put" | "PUT" | "p" | "P" => Ok(OptionType::Put),
            other => Err(VolIndexError::InvalidInput {
                message: format!("only call and put are supported, got option type {other:?}"),
            }),
        }
    }
}

impl TryFrom<i32> for OptionType {
    type Error = VolIndexError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(OptionType::Call),
            -1 => Ok(OptionType::Put),
            other => Err(VolIndexError::InvalidInput {
                message: format!("option type code must be 1 (call) or -1 (put), got {other}"),
            }),
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => f.write_str("call"),
            OptionType::Put => f.write_str("put"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases() {
        for s in ["call", "c", "C", " Call "] {
            assert_eq!(s.parse::<OptionType>().unwrap(), OptionType::Call);
        }
        for s in ["put", "p", "P", "PUT"] {
            assert_eq!(s.parse::<OptionType>().unwrap(), OptionType::Put);
        }
    }

    #[test]
    fn rejects_unknown_type() {
        let err = "future".parse::<OptionType>().unwrap_err();
        assert!(matches!(err, VolIndexError::InvalidInput { .. }));
        assert!(OptionType::try_from(0).is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for ty in [OptionType::Call, OptionType::Put] {
            assert_eq!(ty.to_string().parse::<OptionType>().unwrap(), ty);
        }
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&OptionType::Put).unwrap();
        assert_eq!(json, "\"put\"");
        let back: OptionType = serde_json::from_str("\"call\"").unwrap();
        assert_eq!(back, OptionType::Call);
    }

    #[test]
    fn serde_accepts_aliases_and_codes() {
        let back: OptionType = serde_json::from_str("\"C\"").unwrap();
        assert_eq!(back, OptionType::Call);
        let back: OptionType = serde_json::from_str("-1").unwrap();
        assert_eq!(back, OptionType::Put);
        assert!(serde_json::from_str::<OptionType>("\"strangle\"").is_err());
        assert!(serde_json::from_str::<OptionType>("2").is_err());
    }
}
