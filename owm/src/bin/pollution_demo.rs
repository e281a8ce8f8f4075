//! Demo of reading the current air pollution at one coordinate.
//!
//! Usage: `pollution_demo [LAT LON]`; defaults to the middle of Germany.

use owm::{Client, Settings};

fn main() {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1).map(|a| a.parse::<f64>());
    let (lat, lon) = match (args.next(), args.next()) {
        (Some(Ok(lat)), Some(Ok(lon))) => (lat, lon),
        (None, None) => (51.1657, 10.4515),
        _ => {
            eprintln!("usage: pollution_demo [LAT LON]");
            std::process::exit(1);
        }
    };

    let client = match Client::new(Settings::from_env()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };

    println!("getting sample at {lat:.4},{lon:.4}...");
    match client.current(lat, lon) {
        Ok(s) => {
            println!("aqi: {}", s.aqi);
            for (code, value) in &s.components {
                println!("{code}: {value:.2} μg/m³");
            }
            println!("observed at: {}", s.observed_at);
        }
        Err(e) => {
            println!("error: {}", e);
            std::process::exit(2);
        }
    }
}
