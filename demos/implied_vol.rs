//! Extract implied volatility from option prices.
//!
//! Shows how to:
//!   - Price an option with Black-Scholes
//!   - Extract implied vol by bisection
//!   - Recover the spot and forward from a put-call pair
//!
//! Run with: `cargo run --example implied_vol`

use volindex::implied::{black_scholes_price, BisectionConfig, BlackImpliedVol};
use volindex::smile::parity::{implied_forward, implied_spot};
use volindex::OptionType;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let spot = 100.0;
    let strike = 105.0;
    let days = 45;
    let expiry = f64::from(days) / 365.0;
    let rate = 0.03;
    let vol = 0.25;

    // ---------------------------------------------------------------
    // 1. Price a call and a put
    // ---------------------------------------------------------------

    let call_price = black_scholes_price(spot, strike, expiry, rate, vol, OptionType::Call)?;
    let put_price = black_scholes_price(spot, strike, expiry, rate, vol, OptionType::Put)?;

    println!("Black-Scholes pricing");
    println!("  Spot:    {spot}");
    println!("  Strike:  {strike}");
    println!("  Expiry:  {days} days");
    println!("  Rate:    {:.1}%", rate * 100.0);
    println!("  Vol:     {:.0}%", vol * 100.0);
    println!();
    println!("  Call price: {call_price:.6}");
    println!("  Put price:  {put_price:.6}");

    // ---------------------------------------------------------------
    // 2. Back out spot and forward from the pair
    // ---------------------------------------------------------------

    println!("\nPut-call parity");
    let spot_hat = implied_spot(call_price, put_price, strike, rate, expiry);
    let forward_hat = implied_forward(call_price, put_price, strike, rate, expiry);
    println!("  Implied spot:    {spot_hat:.6}");
    println!("  Implied forward: {forward_hat:.6}");

    // ---------------------------------------------------------------
    // 3. Extract implied vol from the prices
    // ---------------------------------------------------------------

    let iv_call =
        BlackImpliedVol::compute(spot, strike, expiry, rate, call_price, OptionType::Call)?;
    let iv_put =
        BlackImpliedVol::compute(spot, strike, expiry, rate, put_price, OptionType::Put)?;

    println!("\nImplied vol extraction (bisection, tol 1e-6 on price)");
    println!("  From call: {:.8}", iv_call.0);
    println!("  From put:  {:.8}", iv_put.0);
    println!("  Input vol: {vol:.8}");

    // A tighter tolerance trades iterations for accuracy.
    let tight = BlackImpliedVol::with_config(BisectionConfig {
        tol: 1e-12,
        ..BisectionConfig::default()
    })?;
    let iv_tight = tight.solve(spot, strike, expiry, rate, call_price, OptionType::Call)?;
    println!("  Tight tol: {:.12}", iv_tight.0);

    // ---------------------------------------------------------------
    // 4. Scan across strikes
    // ---------------------------------------------------------------

    println!("\n--- IV extraction across strikes ---\n");
    println!("{:>8} {:>12} {:>12} {:>14}", "Strike", "Put Price", "IV", "Round-trip err");
    println!("{}", "-".repeat(50));

    for k in [80.0, 90.0, 95.0, 100.0, 105.0, 110.0, 120.0] {
        let price = black_scholes_price(spot, k, expiry, rate, vol, OptionType::Put)?;
        match BlackImpliedVol::compute(spot, k, expiry, rate, price, OptionType::Put) {
            Ok(iv) => {
                let reprice = black_scholes_price(spot, k, expiry, rate, iv.0, OptionType::Put)?;
                let err = (price - reprice).abs();
                println!("{k:>8.0} {price:>12.6} {:>11.6}% {err:>14.2e}", iv.0 * 100.0);
            }
            Err(e) => println!("{k:>8.0} {price:>12.6} {e}"),
        }
    }

    Ok(())
}
