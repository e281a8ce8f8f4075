//! Compass-direction names for bearings.

const DIRECTIONS: [&str; 16] = [
    "North", "NNE", "NE", "ENE", "East", "ESE", "SE", "SSE", "South", "SSW", "SW", "WSW", "West",
    "WNW", "NW", "NNW",
];

/// Width of one compass sector, in degrees.
const SECTOR: f64 = 360.0 / DIRECTIONS.len() as f64;

/// Name of the 16-point compass direction nearest to `bearing_degrees`.
pub fn direction_label(bearing_degrees: f64) -> &'static str {
    let sector = (bearing_degrees / SECTOR).round() as i64;
    DIRECTIONS[sector.rem_euclid(DIRECTIONS.len() as i64) as usize]
}
