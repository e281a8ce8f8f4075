//! Interactive driver: each line on stdin is a click.
//!
//! Input lines are `LAT LON [PARAMETER]`, e.g. `51.1657 10.4515 pm2_5`.
//! Each click runs on its own thread, so a click entered while another is
//! still loading supersedes it. Overlays are printed as JSON, one per line.

use std::io::BufRead;
use std::sync::Arc;

use airmap::config::Config;
use airmap::context::Context;
use airmap::overlay::Overlay;
use airmap::{GeoPoint, Parameter, Session, State};

fn parse_click(line: &str, default: Parameter) -> Result<(GeoPoint, Parameter), String> {
    let mut fields = line.split_whitespace();
    let (Some(lat), Some(lon)) = (fields.next(), fields.next()) else {
        return Err("expected LAT LON [PARAMETER]".to_owned());
    };
    let lat: f64 = lat.parse().map_err(|_| format!("bad latitude {lat:?}"))?;
    let lon: f64 = lon.parse().map_err(|_| format!("bad longitude {lon:?}"))?;
    let center = GeoPoint::new(lat, lon).map_err(|e| e.to_string())?;
    let parameter = match fields.next() {
        Some(p) => p.parse().map_err(|e: airmap::classify::UnknownParameter| e.to_string())?,
        None => default,
    };
    Ok((center, parameter))
}

fn main() {
    tracing_subscriber::fmt::init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("configuration: {}", e);
            std::process::exit(1);
        }
    };
    let client = match owm::Client::new(config.openweather) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("could not create client: {}", e);
            std::process::exit(1);
        }
    };
    let default_parameter = match std::env::args().nth(1).map(|p| p.parse::<Parameter>()) {
        Some(Ok(p)) => p,
        Some(Err(e)) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
        None => Parameter::Aqi,
    };

    let session = Arc::new(Session::new(client, config.survey));
    let ctx = Context::new();
    {
        let ctx = ctx.clone();
        ctrlc::set_handler(move || {
            tracing::info!("got SIGINT, closing context");
            ctx.cancel();
        })
        .expect("could not set SIGINT handler");
    }

    {
        let ctx = ctx.clone();
        let session = session.clone();
        std::thread::spawn(move || {
            let radius_km = session.settings().radius_km;
            let mut clicks = Vec::new();
            for line in std::io::stdin().lock().lines() {
                if ctx.is_cancelled() {
                    break;
                }
                let line = match line {
                    Ok(l) => l,
                    Err(e) => {
                        tracing::error!("reading stdin: {}", e);
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                let (center, parameter) = match parse_click(&line, default_parameter) {
                    Ok(click) => click,
                    Err(e) => {
                        tracing::error!("{}", e);
                        continue;
                    }
                };
                let session = session.clone();
                clicks.push(std::thread::spawn(move || match session.click(center, parameter) {
                    Some(State::Ready { result, .. }) => {
                        let overlay = Overlay::new(&result, radius_km);
                        match serde_json::to_string(&overlay) {
                            Ok(json) => println!("{json}"),
                            Err(e) => tracing::error!("encoding overlay: {}", e),
                        }
                    }
                    Some(State::Failed { center, reason }) => {
                        tracing::warn!("no overlay for {}: {}", center, reason)
                    }
                    Some(_) => {}
                    None => tracing::info!("click at {} was superseded", center),
                }));
            }
            tracing::info!("end of input; waiting for clicks in flight");
            for click in clicks {
                let _ = click.join();
            }
            ctx.cancel();
        });
    }

    ctx.wait();
    session.clear();
    tracing::info!("shut down");
}
