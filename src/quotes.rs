//! Option quotes and their per-maturity grouping.
//!
//! Raw quotes go through three cleaning steps before any pricing happens:
//!
//! 1. [`trim_near_expiry`] drops quotes too close to expiry. Near-expiry
//!    premiums are distorted by accelerated decay and overnight-risk selling.
//! 2. [`deduplicate`] keeps one quote per (days, type, strike), preferring the
//!    most liquid one.
//! 3. [`group_by_maturity`] splits the survivors into [`MaturitySlice`]s.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::conventions;
use crate::error::{self, VolIndexError};
use crate::types::OptionType;
use crate::validate::{validate_non_negative, validate_positive};

/// A single listed option quote.
///
/// Fields are validated on construction and on deserialization, so a quote
/// always has a positive finite strike and a non-negative finite premium.
///
/// # Examples
/// ```
/// use volindex::{OptionQuote, OptionType};
///
/// let quote = OptionQuote::new(OptionType::Call, 2.3, 0.15, 30)?.with_volume(1200.0)?;
/// assert_eq!(quote.days_to_expiry(), 30);
/// assert_eq!(quote.volume(), Some(1200.0));
/// # Ok::<(), volindex::VolIndexError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OptionQuoteRaw", into = "OptionQuoteRaw")]
pub struct OptionQuote {
    option_type: OptionType,
    strike: f64,
    price: f64,
    days_to_expiry: u32,
    amount: Option<f64>,
    volume: Option<f64>,
    open_interest: Option<f64>,
}

#[derive(Serialize, Deserialize)]
struct OptionQuoteRaw {
    option_type: OptionType,
    strike: f64,
    price: f64,
    #[serde(alias = "time_remaining")]
    days_to_expiry: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    volume: Option<f64>,
    #[serde(default, alias = "oi", skip_serializing_if = "Option::is_none")]
    open_interest: Option<f64>,
}

impl TryFrom<OptionQuoteRaw> for OptionQuote {
    type Error = VolIndexError;
    fn try_from(raw: OptionQuoteRaw) -> Result<Self, Self::Error> {
        let mut quote = Self::new(raw.option_type, raw.strike, raw.price, raw.days_to_expiry)?;
        if let Some(amount) = raw.amount {
            quote = quote.with_amount(amount)?;
        }
        if let Some(volume) = raw.volume {
            quote = quote.with_volume(volume)?;
        }
        if let Some(oi) = raw.open_interest {
            quote = quote.with_open_interest(oi)?;
        }
        Ok(quote)
    }
}

impl From<OptionQuote> for OptionQuoteRaw {
    fn from(q: OptionQuote) -> Self {
        Self {
            option_type: q.option_type,
            strike: q.strike,
            price: q.price,
            days_to_expiry: q.days_to_expiry,
            amount: q.amount,
            volume: q.volume,
            open_interest: q.open_interest,
        }
    }
}

impl OptionQuote {
    /// Create a quote without liquidity information.
    ///
    /// # Errors
    /// Returns [`VolIndexError::InvalidInput`] if `strike` is not positive and
    /// finite or `price` is negative or non-finite.
    pub fn new(
        option_type: OptionType,
        strike: f64,
        price: f64,
        days_to_expiry: u32,
    ) -> error::Result<Self> {
        validate_positive(strike, "strike")?;
        validate_non_negative(price, "price")?;
        Ok(Self {
            option_type,
            strike,
            price,
            days_to_expiry,
            amount: None,
            volume: None,
            open_interest: None,
        })
    }

    /// Attach the traded amount (turnover).
    pub fn with_amount(mut self, amount: f64) -> error::Result<Self> {
        self.amount = Some(validate_non_negative(amount, "amount")?);
        Ok(self)
    }

    /// Attach the traded volume.
    pub fn with_volume(mut self, volume: f64) -> error::Result<Self> {
        self.volume = Some(validate_non_negative(volume, "volume")?);
        Ok(self)
    }

    /// Attach the open interest.
    pub fn with_open_interest(mut self, open_interest: f64) -> error::Result<Self> {
        self.open_interest = Some(validate_non_negative(open_interest, "open_interest")?);
        Ok(self)
    }

    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    pub fn strike(&self) -> f64 {
        self.strike
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    /// Calendar days remaining until expiry.
    pub fn days_to_expiry(&self) -> u32 {
        self.days_to_expiry
    }

    pub fn amount(&self) -> Option<f64> {
        self.amount
    }

    pub fn volume(&self) -> Option<f64> {
        self.volume
    }

    pub fn open_interest(&self) -> Option<f64> {
        self.open_interest
    }
}

/// Liquidity measure used to choose between duplicate quotes.
///
/// Variants are listed in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiquidityField {
    Amount,
    Volume,
    OpenInterest,
}

impl LiquidityField {
    const PRIORITY: [LiquidityField; 3] = [
        LiquidityField::Amount,
        LiquidityField::Volume,
        LiquidityField::OpenInterest,
    ];

    /// The value of this field on a quote, if present.
    pub fn value(self, quote: &OptionQuote) -> Option<f64> {
        match self {
            LiquidityField::Amount => quote.amount,
            LiquidityField::Volume => quote.volume,
            LiquidityField::OpenInterest => quote.open_interest,
        }
    }

    /// The highest-priority field carried by at least one quote.
    pub fn select(quotes: &[OptionQuote]) -> Option<LiquidityField> {
        Self::PRIORITY
            .into_iter()
            .find(|field| quotes.iter().any(|q| field.value(q).is_some()))
    }
}

/// Quotes for one expiry, split by side and sorted by strike.
///
/// Holds at most one quote per (option type, strike).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaturitySlice {
    days_to_expiry: u32,
    calls: Vec<OptionQuote>,
    puts: Vec<OptionQuote>,
}

impl MaturitySlice {
    /// Build a slice from quotes that all share `days_to_expiry`.
    ///
    /// # Errors
    /// Returns [`VolIndexError::InvalidInput`] if a quote has a different
    /// expiry or two quotes share the same (type, strike).
    pub fn new(days_to_expiry: u32, quotes: Vec<OptionQuote>) -> error::Result<Self> {
        let mut calls = Vec::new();
        let mut puts = Vec::new();
        for q in quotes {
            if q.days_to_expiry != days_to_expiry {
                return Err(VolIndexError::InvalidInput {
                    message: format!(
                        "quote with {} days does not belong to the {days_to_expiry}-day slice",
                        q.days_to_expiry
                    ),
                });
            }
            match q.option_type {
                OptionType::Call => calls.push(q),
                OptionType::Put => puts.push(q),
            }
        }
        for side in [&mut calls, &mut puts] {
            side.sort_by(|a, b| a.strike.total_cmp(&b.strike));
            if let Some(w) = side.windows(2).find(|w| w[0].strike == w[1].strike) {
                return Err(VolIndexError::InvalidInput {
                    message: format!(
                        "duplicate {} quote at strike {} in the {days_to_expiry}-day slice",
                        w[0].option_type, w[0].strike
                    ),
                });
            }
        }
        Ok(Self {
            days_to_expiry,
            calls,
            puts,
        })
    }

    pub fn days_to_expiry(&self) -> u32 {
        self.days_to_expiry
    }

    /// Time to expiry in years (calendar days / 365).
    pub fn expiry(&self) -> f64 {
        conventions::year_fraction(self.days_to_expiry)
    }

    /// Call quotes, ascending by strike.
    pub fn calls(&self) -> &[OptionQuote] {
        &self.calls
    }

    /// Put quotes, ascending by strike.
    pub fn puts(&self) -> &[OptionQuote] {
        &self.puts
    }

    pub fn len(&self) -> usize {
        self.calls.len() + self.puts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty() && self.puts.is_empty()
    }
}

/// Drop quotes with fewer than `min_days` calendar days to expiry.
pub fn trim_near_expiry(quotes: &[OptionQuote], min_days: u32) -> Vec<OptionQuote> {
    quotes
        .iter()
        .filter(|q| q.days_to_expiry >= min_days)
        .copied()
        .collect()
}

/// Keep one quote per (days, option type, strike).
///
/// The liquidity field is chosen by [`LiquidityField::select`]; the kept quote
/// has the largest value of that field (a missing value ranks lowest). Ties,
/// and inputs without any liquidity field, keep the quote that appears last
/// in the input. Survivors are returned in input order.
pub fn deduplicate(quotes: &[OptionQuote]) -> Vec<OptionQuote> {
    let field = LiquidityField::select(quotes);
    let rank = |q: &OptionQuote| {
        field
            .and_then(|f| f.value(q))
            .unwrap_or(f64::NEG_INFINITY)
    };

    let mut best: BTreeMap<(u32, OptionType, u64), usize> = BTreeMap::new();
    for (i, q) in quotes.iter().enumerate() {
        let key = (q.days_to_expiry, q.option_type, q.strike.to_bits());
        let replace = match best.get(&key) {
            Some(&j) => rank(q).total_cmp(&rank(&quotes[j])).is_ge(),
            None => true,
        };
        if replace {
            best.insert(key, i);
        }
    }

    let mut kept: Vec<usize> = best.into_values().collect();
    kept.sort_unstable();
    kept.into_iter().map(|i| quotes[i]).collect()
}

/// Group de-duplicated quotes into slices, ascending by days to expiry.
///
/// # Errors
/// Returns [`VolIndexError::InvalidInput`] if the input still contains
/// duplicate (days, type, strike) quotes.
pub fn group_by_maturity(quotes: &[OptionQuote]) -> error::Result<Vec<MaturitySlice>> {
    let mut groups: BTreeMap<u32, Vec<OptionQuote>> = BTreeMap::new();
    for q in quotes {
        groups.entry(q.days_to_expiry).or_default().push(*q);
    }
    groups
        .into_iter()
        .map(|(days, group)| MaturitySlice::new(days, group))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(ty: OptionType, strike: f64, price: f64, days: u32) -> OptionQuote {
        OptionQuote::new(ty, strike, price, days).unwrap()
    }

    #[test]
    fn rejects_invalid_quotes() {
        assert!(OptionQuote::new(OptionType::Call, 0.0, 1.0, 30).is_err());
        assert!(OptionQuote::new(OptionType::Call, 100.0, -0.5, 30).is_err());
        assert!(OptionQuote::new(OptionType::Put, 100.0, f64::NAN, 30).is_err());
        let q = quote(OptionType::Put, 100.0, 1.0, 30);
        assert!(q.with_volume(-1.0).is_err());
    }

    #[test]
    fn trim_drops_near_expiry() {
        let quotes = vec![
            quote(OptionType::Call, 100.0, 1.0, 3),
            quote(OptionType::Call, 100.0, 1.5, 7),
            quote(OptionType::Call, 100.0, 2.0, 35),
        ];
        let trimmed = trim_near_expiry(&quotes, 7);
        assert_eq!(trimmed.len(), 2);
        assert!(trimmed.iter().all(|q| q.days_to_expiry() >= 7));
    }

    #[test]
    fn trim_is_identity_without_near_expiry_quotes() {
        let quotes = vec![
            quote(OptionType::Call, 100.0, 1.5, 7),
            quote(OptionType::Put, 90.0, 0.4, 21),
        ];
        assert_eq!(trim_near_expiry(&quotes, 7), quotes);
    }

    #[test]
    fn dedup_keeps_higher_volume() {
        let low = quote(OptionType::Call, 100.0, 1.0, 30).with_volume(10.0).unwrap();
        let high = quote(OptionType::Call, 100.0, 1.2, 30).with_volume(500.0).unwrap();
        let other = quote(OptionType::Put, 100.0, 0.8, 30).with_volume(5.0).unwrap();

        let kept = deduplicate(&[high, low, other]);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0], high);
        assert_eq!(kept[1], other);

        let kept = deduplicate(&[low, high]);
        assert_eq!(kept, vec![high]);
    }

    #[test]
    fn dedup_prefers_amount_over_volume() {
        let a = quote(OptionType::Put, 90.0, 1.0, 30)
            .with_amount(1000.0)
            .unwrap()
            .with_volume(1.0)
            .unwrap();
        let b = quote(OptionType::Put, 90.0, 1.1, 30)
            .with_amount(10.0)
            .unwrap()
            .with_volume(99.0)
            .unwrap();
        assert_eq!(deduplicate(&[a, b]), vec![a]);
    }

    #[test]
    fn dedup_without_liquidity_keeps_last() {
        let first = quote(OptionType::Call, 100.0, 1.0, 30);
        let last = quote(OptionType::Call, 100.0, 1.3, 30);
        assert_eq!(deduplicate(&[first, last]), vec![last]);
    }

    #[test]
    fn dedup_tie_keeps_last() {
        let first = quote(OptionType::Call, 100.0, 1.0, 30).with_volume(7.0).unwrap();
        let last = quote(OptionType::Call, 100.0, 1.3, 30).with_volume(7.0).unwrap();
        assert_eq!(deduplicate(&[first, last]), vec![last]);
    }

    #[test]
    fn dedup_missing_value_ranks_lowest() {
        let with = quote(OptionType::Call, 100.0, 1.0, 30).with_volume(0.0).unwrap();
        let without = quote(OptionType::Call, 100.0, 1.3, 30);
        assert_eq!(deduplicate(&[with, without]), vec![with]);
    }

    #[test]
    fn dedup_distinguishes_expiries() {
        let a = quote(OptionType::Call, 100.0, 1.0, 30);
        let b = quote(OptionType::Call, 100.0, 2.0, 60);
        assert_eq!(deduplicate(&[a, b]).len(), 2);
    }

    #[test]
    fn groups_sorted_by_expiry_and_strike() {
        let quotes = vec![
            quote(OptionType::Call, 110.0, 1.0, 60),
            quote(OptionType::Put, 90.0, 0.5, 30),
            quote(OptionType::Call, 100.0, 3.0, 60),
            quote(OptionType::Put, 80.0, 0.1, 30),
        ];
        let slices = group_by_maturity(&quotes).unwrap();
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].days_to_expiry(), 30);
        assert_eq!(slices[1].days_to_expiry(), 60);
        assert_eq!(slices[0].puts()[0].strike(), 80.0);
        assert_eq!(slices[1].calls()[0].strike(), 100.0);
        assert!(slices[0].calls().is_empty());
    }

    #[test]
    fn slice_rejects_duplicates() {
        let quotes = vec![
            quote(OptionType::Call, 100.0, 1.0, 30),
            quote(OptionType::Call, 100.0, 1.1, 30),
        ];
        assert!(matches!(
            group_by_maturity(&quotes),
            Err(VolIndexError::InvalidInput { .. })
        ));
    }

    #[test]
    fn deserializes_table_row_names() {
        let json = r#"{"option_type":"put","strike":2.3,"price":0.15,"time_remaining":30,"oi":42.0}"#;
        let q: OptionQuote = serde_json::from_str(json).unwrap();
        assert_eq!(q.option_type(), OptionType::Put);
        assert_eq!(q.days_to_expiry(), 30);
        assert_eq!(q.open_interest(), Some(42.0));
        assert_eq!(q.volume(), None);
    }

    #[test]
    fn deserialization_validates() {
        let json = r#"{"option_type":"call","strike":-1.0,"price":0.15,"days_to_expiry":30}"#;
        assert!(serde_json::from_str::<OptionQuote>(json).is_err());
    }
}
