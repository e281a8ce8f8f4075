//! The view handed to the map renderer: one area circle plus per-point markers.

use serde::Serialize;

use crate::aggregate::AggregateResult;
use crate::classify::{classify, hex, Parameter, NO_DATA};
use crate::compass::direction_label;
use crate::geo::GeoPoint;

/// A sample point's marker, colored by its own value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub sample_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub ring: usize,
    pub ring_distance_km: f64,
    pub bearing_degrees: Option<f64>,
    /// Compass direction from the center; None for the center itself.
    pub direction: Option<&'static str>,
    pub value: f64,
    pub severity: &'static str,
    pub color: String,
}

/// Everything the renderer draws for one click.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub center: GeoPoint,
    pub parameter: Parameter,
    pub radius_km: f64,
    pub mean_value: Option<f64>,
    pub sample_count: usize,
    /// Severity of the mean; None without data.
    pub severity: Option<&'static str>,
    /// Color of the area circle and center marker.
    pub color: String,
    pub fill_opacity: f64,
    /// Popup text, one line per entry.
    pub summary: Vec<String>,
    pub markers: Vec<Marker>,
}

impl Overlay {
    pub fn new(result: &AggregateResult, radius_km: f64) -> Self {
        let parameter = result.parameter();
        let band = result.band();

        let markers = result
            .per_point_values()
            .iter()
            .map(|(point, value)| {
                let band = classify(parameter, *value);
                Marker {
                    sample_id: point.sample_id.clone(),
                    latitude: point.point.latitude(),
                    longitude: point.point.longitude(),
                    ring: point.ring,
                    ring_distance_km: point.ring_distance_km,
                    bearing_degrees: point.bearing_degrees,
                    direction: point.bearing_degrees.map(direction_label),
                    value: *value,
                    severity: band.label,
                    color: hex(band.color),
                }
            })
            .collect();

        Overlay {
            center: result.center(),
            parameter,
            radius_km,
            mean_value: result.mean_value(),
            sample_count: result.sample_count(),
            severity: band.map(|b| b.label),
            color: hex(band.map_or(NO_DATA, |b| b.color)),
            fill_opacity: parameter.fill_opacity(),
            summary: summary(result, radius_km),
            markers,
        }
    }
}

fn summary(result: &AggregateResult, radius_km: f64) -> Vec<String> {
    let parameter = result.parameter();
    let center = result.center();
    let mut lines = vec![
        format!("Air Quality - {radius_km}km Radius"),
        format!(
            "Lat: {:.4}, Lon: {:.4}",
            center.latitude(),
            center.longitude()
        ),
    ];
    match (result.mean_value(), result.band()) {
        (Some(mean), Some(band)) if parameter == Parameter::Aqi => lines.push(format!(
            "Average {parameter}: {} ({})",
            parameter.format_value(mean),
            band.label
        )),
        (Some(mean), _) => lines.push(format!(
            "Average {parameter}: {}",
            parameter.format_value(mean)
        )),
        (None, _) => lines.push("No data".to_owned()),
    }
    lines.push(format!("Based on {} sample points", result.sample_count()));
    lines
}
