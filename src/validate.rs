//! Input validation helpers.
//!
//! Standardizes validation across the crate using `!is_finite()` to reject
//! NaN, +Inf, and -Inf uniformly.

use crate::error::VolIndexError;

/// Validate that a value is strictly positive and finite (rejects NaN, Inf, zero, negatives).
pub(crate) fn validate_positive(value: f64, name: &str) -> crate::error::Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(VolIndexError::InvalidInput {
            message: format!("{name} must be positive and finite, got {value}"),
        });
    }
    Ok(value)
}

/// Validate that a value is non-negative and finite (rejects NaN, Inf, negatives).
pub(crate) fn validate_non_negative(value: f64, name: &str) -> crate::error::Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(VolIndexError::InvalidInput {
            message: format!("{name} must be non-negative and finite, got {value}"),
        });
    }
    Ok(value)
}

/// Validate that a value is finite (rejects NaN and Inf; allows zero and negatives).
pub(crate) fn validate_finite(value: f64, name: &str) -> crate::error::Result<f64> {
    if !value.is_finite() {
        return Err(VolIndexError::InvalidInput {
            message: format!("{name} must be finite, got {value}"),
        });
    }
    Ok(value)
}

/// Validate that strikes are finite and strictly increasing.
pub(crate) fn validate_strictly_increasing(values: &[f64], name: &str) -> crate::error::Result<()> {
    for v in values {
        validate_finite(*v, name)?;
    }
    for (i, w) in values.windows(2).enumerate() {
        if w[1] <= w[0] {
            return Err(VolIndexError::InvalidInput {
                message: format!(
                    "{name} must be strictly increasing, but {name}[{}]={} >= {name}[{}]={}",
                    i,
                    w[0],
                    i + 1,
                    w[1]
                ),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_rejects_zero_nan_inf() {
        assert!(validate_positive(0.0, "x").is_err());
        assert!(validate_positive(f64::NAN, "x").is_err());
        assert!(validate_positive(f64::INFINITY, "x").is_err());
        assert_eq!(validate_positive(2.5, "x").unwrap(), 2.5);
    }

    #[test]
    fn non_negative_accepts_zero() {
        assert_eq!(validate_non_negative(0.0, "x").unwrap(), 0.0);
        assert!(validate_non_negative(-1e-12, "x").is_err());
    }

    #[test]
    fn finite_accepts_negative() {
        assert_eq!(validate_finite(-0.01, "rate").unwrap(), -0.01);
        assert!(validate_finite(f64::NEG_INFINITY, "rate").is_err());
    }

    #[test]
    fn strictly_increasing_rejects_duplicates() {
        assert!(validate_strictly_increasing(&[1.0, 2.0, 3.0], "strikes").is_ok());
        let err = validate_strictly_increasing(&[1.0, 2.0, 2.0], "strikes").unwrap_err();
        assert!(format!("{err}").contains("strictly increasing"));
        assert!(validate_strictly_increasing(&[1.0, f64::NAN], "strikes").is_err());
    }
}
