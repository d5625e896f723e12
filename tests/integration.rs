//! Integration tests for the volindex pipeline.
//!
//! Exercises the full path from raw quotes through trimming,
//! de-duplication, per-maturity variance estimation, and horizon
//! interpolation, using synthetic Black–Scholes markets.

use std::sync::Arc;
use std::thread;

use approx::assert_relative_eq;
use volindex::implied::black_scholes_price;
use volindex::quotes::{deduplicate, trim_near_expiry};
use volindex::{compute_index, IndexBuilder, OptionQuote, OptionType, VolIndexError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const SPOT: f64 = 100.0;
const RATE: f64 = 0.02;

/// Standard strike ladder: 17 strikes from 80 to 120.
fn standard_strikes() -> Vec<f64> {
    (0..=16).map(|i| 80.0 + 2.5 * f64::from(i)).collect()
}

/// Calls and puts at every standard strike, priced with `vol(K)`.
fn bsm_ladder(days: u32, vol: impl Fn(f64) -> f64) -> Vec<OptionQuote> {
    let t = f64::from(days) / 365.0;
    let mut quotes = Vec::new();
    for k in standard_strikes() {
        for ty in [OptionType::Call, OptionType::Put] {
            let price = black_scholes_price(SPOT, k, t, RATE, vol(k), ty).unwrap();
            quotes.push(OptionQuote::new(ty, k, price, days).unwrap());
        }
    }
    quotes
}

fn flat(vol: f64) -> impl Fn(f64) -> f64 {
    move |_| vol
}

/// Equity-style skew: higher vol for low strikes.
fn skewed(atm: f64) -> impl Fn(f64) -> f64 {
    move |k| atm + 0.003 * (SPOT - k)
}

fn index_of(variance: f64, horizon_days: f64) -> f64 {
    100.0 * (variance * 365.0 / horizon_days).sqrt()
}

// ---------------------------------------------------------------------------
// End-to-end
// ---------------------------------------------------------------------------

#[test]
fn flat_term_structure_recovers_vol() {
    let mut quotes = bsm_ladder(20, flat(0.2));
    quotes.extend(bsm_ladder(50, flat(0.2)));
    let index = compute_index(&quotes, RATE, 30).unwrap();
    assert_relative_eq!(index, 20.0, max_relative = 0.02);
}

#[test]
fn two_maturity_index_lies_between_single_maturity_indices() {
    let near = bsm_ladder(20, flat(0.18));
    let far = bsm_ladder(50, flat(0.24));

    let near_index = compute_index(&near, RATE, 30).unwrap();
    let far_index = compute_index(&far, RATE, 30).unwrap();
    let both: Vec<OptionQuote> = near.iter().chain(&far).copied().collect();
    let index = compute_index(&both, RATE, 30).unwrap();

    assert!(
        near_index < index && index < far_index,
        "index {index} not within [{near_index}, {far_index}]"
    );
}

#[test]
fn single_maturity_variance_is_annualized_by_horizon() {
    let report = IndexBuilder::new()
        .rate(RATE)
        .horizon_days(30)
        .build()
        .unwrap()
        .compute(&bsm_ladder(45, skewed(0.22)))
        .unwrap();

    let term = report.term_structure();
    assert_eq!(term.len(), 1);
    assert_eq!(term[0].0, 45);
    assert_relative_eq!(report.index, index_of(term[0].1, 30.0), max_relative = 1e-12);
}

#[test]
fn skew_raises_index_above_atm_vol() {
    let mut quotes = bsm_ladder(21, skewed(0.2));
    quotes.extend(bsm_ladder(42, skewed(0.2)));
    let report = IndexBuilder::new().rate(RATE).build().unwrap().compute(&quotes).unwrap();
    assert!(report.index > 20.0);

    for m in &report.maturities {
        let est = m.result.as_ref().unwrap();
        assert_relative_eq!(est.forward.implied_spot, SPOT, max_relative = 1e-9);
        assert_eq!(est.forward.anchor_strike, 100.0);
    }
}

#[test]
fn longer_horizon_uses_far_maturities() {
    let mut quotes = bsm_ladder(30, flat(0.15));
    quotes.extend(bsm_ladder(60, flat(0.25)));
    quotes.extend(bsm_ladder(90, flat(0.3)));

    let short = compute_index(&quotes, RATE, 30).unwrap();
    let long = compute_index(&quotes, RATE, 90).unwrap();
    assert!(long > short);
    assert_relative_eq!(long, 30.0, max_relative = 0.03);
}

// ---------------------------------------------------------------------------
// Quote cleaning
// ---------------------------------------------------------------------------

#[test]
fn near_expiry_quotes_do_not_affect_index() {
    let mut clean = bsm_ladder(20, flat(0.2));
    clean.extend(bsm_ladder(50, flat(0.22)));

    let mut noisy = clean.clone();
    // Garbage prices expiring in 3 days.
    noisy.extend(
        standard_strikes()
            .into_iter()
            .map(|k| OptionQuote::new(OptionType::Call, k, 50.0, 3).unwrap()),
    );

    assert_eq!(
        compute_index(&noisy, RATE, 30).unwrap(),
        compute_index(&clean, RATE, 30).unwrap()
    );
}

#[test]
fn trimming_is_idempotent() {
    let mut quotes = bsm_ladder(5, flat(0.2));
    quotes.extend(bsm_ladder(7, flat(0.2)));
    quotes.extend(bsm_ladder(30, flat(0.2)));

    let once = trim_near_expiry(&quotes, 7);
    let twice = trim_near_expiry(&once, 7);
    assert_eq!(once, twice);
    assert_eq!(once.len(), 2 * 2 * standard_strikes().len());
}

#[test]
fn duplicates_resolved_by_volume() {
    let clean: Vec<OptionQuote> = bsm_ladder(30, flat(0.2))
        .into_iter()
        .map(|q| q.with_volume(100.0).unwrap())
        .collect();

    // A stale, thinly traded duplicate of the ATM call.
    let atm_call = clean
        .iter()
        .find(|q| q.option_type() == OptionType::Call && q.strike() == 100.0)
        .copied()
        .unwrap();
    let stale = OptionQuote::new(OptionType::Call, 100.0, atm_call.price() * 1.5, 30)
        .unwrap()
        .with_volume(1.0)
        .unwrap();

    let mut with_stale = vec![stale];
    with_stale.extend(clean.iter().copied());

    assert_eq!(deduplicate(&with_stale).len(), clean.len());
    assert!(!deduplicate(&with_stale).contains(&stale));
    assert_eq!(
        compute_index(&with_stale, RATE, 30).unwrap(),
        compute_index(&clean, RATE, 30).unwrap()
    );
}

// ---------------------------------------------------------------------------
// Failure handling
// ---------------------------------------------------------------------------

#[test]
fn failed_maturity_drops_out_of_interpolation() {
    let mut quotes = bsm_ladder(20, flat(0.2));
    quotes.extend(bsm_ladder(50, flat(0.25)));
    let baseline = compute_index(&quotes, RATE, 30).unwrap();

    // Puts only at 35 days: no parity pair.
    quotes.extend(
        bsm_ladder(35, flat(0.4))
            .into_iter()
            .filter(|q| q.option_type() == OptionType::Put),
    );
    let report = IndexBuilder::new().rate(RATE).build().unwrap().compute(&quotes).unwrap();

    assert_eq!(report.index, baseline);
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, 35);
    assert!(matches!(failures[0].1, VolIndexError::DegenerateSlice { .. }));
}

#[test]
fn far_maturities_only_is_fatal() {
    let quotes = bsm_ladder(90, flat(0.2));
    assert!(matches!(
        compute_index(&quotes, RATE, 30),
        Err(VolIndexError::InsufficientTermStructure { .. })
    ));
    // The same quotes are fine for a 90-day horizon.
    assert!(compute_index(&quotes, RATE, 90).is_ok());
}

#[test]
fn invalid_rate_is_rejected() {
    let quotes = bsm_ladder(30, flat(0.2));
    assert!(matches!(
        compute_index(&quotes, f64::INFINITY, 30),
        Err(VolIndexError::InvalidInput { .. })
    ));
}

// ---------------------------------------------------------------------------
// Determinism and thread safety
// ---------------------------------------------------------------------------

#[test]
fn input_order_does_not_matter() {
    let mut quotes = bsm_ladder(20, skewed(0.2));
    quotes.extend(bsm_ladder(50, skewed(0.23)));
    let forward = compute_index(&quotes, RATE, 30).unwrap();
    quotes.reverse();
    let reversed = compute_index(&quotes, RATE, 30).unwrap();
    assert_eq!(forward, reversed);
}

#[test]
fn calculator_is_shareable_across_threads() {
    let calculator = Arc::new(IndexBuilder::new().rate(RATE).build().unwrap());
    let quotes: Arc<Vec<OptionQuote>> = Arc::new(
        bsm_ladder(20, flat(0.2))
            .into_iter()
            .chain(bsm_ladder(50, flat(0.2)))
            .collect(),
    );
    let expected = calculator.compute(&quotes).unwrap().index;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let calculator = Arc::clone(&calculator);
            let quotes = Arc::clone(&quotes);
            thread::spawn(move || calculator.compute(&quotes).unwrap().index)
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), expected);
    }
}

// ---------------------------------------------------------------------------
// Serde
// ---------------------------------------------------------------------------

#[test]
fn computes_from_json_rows() {
    let t = 30.0 / 365.0;
    let rows: Vec<String> = standard_strikes()
        .into_iter()
        .flat_map(|k| {
            [("C", OptionType::Call), ("P", OptionType::Put)].map(|(code, ty)| {
                let price = black_scholes_price(SPOT, k, t, RATE, 0.2, ty).unwrap();
                format!(
                    r#"{{"option_type":"{code}","strike":{k},"price":{price},"time_remaining":30,"volume":10}}"#
                )
            })
        })
        .collect();
    let json = format!("[{}]", rows.join(","));

    let quotes: Vec<OptionQuote> = serde_json::from_str(&json).unwrap();
    assert_eq!(quotes.len(), 34);
    assert_eq!(
        compute_index(&quotes, RATE, 30).unwrap(),
        compute_index(&bsm_ladder(30, flat(0.2)), RATE, 30).unwrap()
    );
}
