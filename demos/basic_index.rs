//! Compute a 30-day volatility index from a synthetic option chain.
//!
//! Shows how to:
//!   - Build quotes (or load them with serde)
//!   - Configure and run the index calculation
//!   - Inspect per-maturity diagnostics, including failed maturities
//!
//! Run with: `cargo run --example basic_index`

use volindex::implied::black_scholes_price;
use volindex::{IndexBuilder, OptionQuote, OptionType};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let spot = 100.0;
    let rate = 0.025;
    let skew = |k: f64, atm: f64| atm + 0.0025 * (spot - k);

    // ---------------------------------------------------------------
    // 1. A chain with three expiries and some noise
    // ---------------------------------------------------------------

    let mut quotes = Vec::new();
    for (days, atm) in [(4, 0.30), (23, 0.21), (51, 0.23)] {
        let t = f64::from(days) / 365.0;
        for i in 0..=16 {
            let strike = 80.0 + 2.5 * f64::from(i);
            for ty in [OptionType::Call, OptionType::Put] {
                let price = black_scholes_price(spot, strike, t, rate, skew(strike, atm), ty)?;
                quotes.push(OptionQuote::new(ty, strike, price, days)?.with_volume(250.0)?);
            }
        }
    }
    // A stale duplicate with little volume; de-duplication drops it.
    quotes.push(OptionQuote::new(OptionType::Call, 100.0, 9.99, 23)?.with_volume(1.0)?);

    // A maturity with only calls; it fails on its own without sinking the index.
    let t = 37.0 / 365.0;
    for strike in [95.0, 100.0, 105.0] {
        let price = black_scholes_price(spot, strike, t, rate, 0.22, OptionType::Call)?;
        quotes.push(OptionQuote::new(OptionType::Call, strike, price, 37)?);
    }

    // ---------------------------------------------------------------
    // 2. Compute
    // ---------------------------------------------------------------

    let calculator = IndexBuilder::new().rate(rate).horizon_days(30).build()?;
    let report = calculator.compute(&quotes)?;

    println!("{}-day volatility index: {:.4}", report.horizon_days, report.index);

    // ---------------------------------------------------------------
    // 3. Diagnostics
    // ---------------------------------------------------------------

    println!(
        "\n{:>6} {:>10} {:>10} {:>10} {:>12}",
        "Days", "Forward", "ATM vol", "Index", "Grid (c/p)"
    );
    println!("{}", "-".repeat(54));
    for m in &report.maturities {
        match &m.result {
            Ok(est) => println!(
                "{:>6} {:>10.4} {:>9.2}% {:>10.4} {:>6}/{:<5}",
                m.days_to_expiry,
                est.forward.implied_forward,
                est.forward.atm_vol.0 * 100.0,
                100.0 * (est.variance.0 * 365.0 / f64::from(m.days_to_expiry)).sqrt(),
                est.call_grid_size,
                est.put_grid_size,
            ),
            Err(e) => println!("{:>6}  failed: {e}", m.days_to_expiry),
        }
    }

    println!("\nReport as JSON:\n{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
