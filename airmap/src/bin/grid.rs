//! Reasonableness check on the sample grid.
//!
//! Print the grid for a center and radius: one line per point, with its
//! compass direction and the distance and bearing recomputed from the center.
//!
//! Usage: `grid [LAT LON [RADIUS_KM]]`; defaults to the middle of Germany, 10 km.

use airmap::compass::direction_label;
use airmap::geo::{distance_km, initial_bearing};
use airmap::{generate_sample_points, GeoPoint, GridShape};

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<f64> = match std::env::args().skip(1).map(|a| a.parse()).collect() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("usage: grid [LAT LON [RADIUS_KM]]: {e}");
            std::process::exit(1);
        }
    };
    let (lat, lon, radius) = match args[..] {
        [] => (51.1657, 10.4515, 10.0),
        [lat, lon] => (lat, lon, 10.0),
        [lat, lon, radius] => (lat, lon, radius),
        _ => {
            eprintln!("usage: grid [LAT LON [RADIUS_KM]]");
            std::process::exit(1);
        }
    };

    let points = GeoPoint::new(lat, lon)
        .and_then(|center| generate_sample_points(center, radius, GridShape::default()));
    let points = match points {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let center = points[0].point;
    for p in &points {
        let direction = p.bearing_degrees.map_or("-", direction_label);
        println!(
            "{:<10} {:>9.5} {:>10.5}  {:>6.2} km {:>4}  // {:.3} km @ {:.2}°",
            p.sample_id,
            p.point.latitude(),
            p.point.longitude(),
            p.ring_distance_km,
            direction,
            distance_km(&center, &p.point),
            initial_bearing(&center, &p.point),
        );
    }
}
