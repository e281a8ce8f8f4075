//! Bindings for the browser map.
//!
//! The page does its own fetching; these functions compute the grid to fetch
//! and turn what came back into an overlay. Values cross the boundary as JSON.

use std::collections::{BTreeMap, HashSet};

use chrono::DateTime;
use log::MakeConsoleWriter;
use serde::Deserialize;
use wasm_bindgen::prelude::*;

use crate::aggregate::aggregate;
use crate::atmosphere::Reading;
use crate::classify::{classify, hex, legend, Parameter, UnknownParameter};
use crate::geo::{generate_sample_points, GeoError, GeoPoint, GridShape};
use crate::overlay::Overlay;

#[wasm_bindgen(start)]
fn run() {
    tracing_subscriber::fmt::fmt()
        .with_writer(MakeConsoleWriter)
        .without_time()
        .init();

    tracing::info!("air quality map bindings loaded");
}

#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error(transparent)]
    Geo(#[from] GeoError),
    #[error(transparent)]
    Parameter(#[from] UnknownParameter),
    #[error("in readings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("reading for unknown sample point {0:?}")]
    UnknownSample(String),
    #[error("more than one reading for sample point {0:?}")]
    DuplicateSample(String),
    #[error("AQI category {0} is outside 1..=5")]
    InvalidAqi(u8),
}

impl From<WebError> for JsValue {
    fn from(e: WebError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

/// A reading as the page reports it: the sample it was fetched for, and the
/// fields of the data source's response.
#[derive(Debug, Deserialize)]
struct PageReading {
    sample_id: String,
    aqi: u8,
    #[serde(default)]
    components: BTreeMap<String, f64>,
    dt: i64,
}

fn grid_shape(rings: Option<u32>, angles: Option<u32>) -> GridShape {
    let default = GridShape::default();
    GridShape {
        rings: rings.map_or(default.rings, |r| r as usize),
        angles: angles.map_or(default.angles, |a| a as usize),
    }
}

/// JSON array of the sample points around the given center.
#[wasm_bindgen]
pub fn sample_points(
    latitude: f64,
    longitude: f64,
    radius_km: f64,
    rings: Option<u32>,
    angles: Option<u32>,
) -> Result<String, WebError> {
    let center = GeoPoint::new(latitude, longitude)?;
    let points = generate_sample_points(center, radius_km, grid_shape(rings, angles))?;
    Ok(serde_json::to_string(&points)?)
}

/// JSON overlay for the readings the page fetched.
///
/// `readings` is a JSON array of `{sample_id, aqi, components, dt}`; samples
/// that failed are simply absent. Each sample may appear at most once, with an
/// AQI category in 1..=5.
#[wasm_bindgen]
pub fn overlay(
    latitude: f64,
    longitude: f64,
    radius_km: f64,
    parameter: &str,
    readings: &str,
    rings: Option<u32>,
    angles: Option<u32>,
) -> Result<String, WebError> {
    let center = GeoPoint::new(latitude, longitude)?;
    let parameter: Parameter = parameter.parse()?;
    let points = generate_sample_points(center, radius_km, grid_shape(rings, angles))?;

    let page: Vec<PageReading> = serde_json::from_str(readings)?;
    let mut seen = HashSet::new();
    let readings = page
        .into_iter()
        .map(|r| {
            let point = points
                .iter()
                .find(|p| p.sample_id == r.sample_id)
                .ok_or_else(|| WebError::UnknownSample(r.sample_id.clone()))?;
            if !seen.insert(r.sample_id.clone()) {
                return Err(WebError::DuplicateSample(r.sample_id));
            }
            if !(1..=5).contains(&r.aqi) {
                return Err(WebError::InvalidAqi(r.aqi));
            }
            Ok(Reading {
                point: point.clone(),
                aqi: r.aqi,
                components: r.components,
                observed_at: DateTime::from_timestamp(r.dt, 0).unwrap_or_default(),
            })
        })
        .collect::<Result<Vec<_>, WebError>>()?;

    let result = aggregate(center, &readings, parameter);
    Ok(serde_json::to_string(&Overlay::new(&result, radius_km))?)
}

/// JSON legend rows for a parameter.
#[wasm_bindgen]
pub fn legend_rows(parameter: &str) -> Result<String, WebError> {
    let parameter: Parameter = parameter.parse()?;
    Ok(serde_json::to_string(&legend(parameter))?)
}

/// `#RRGGBB` color for a single value.
#[wasm_bindgen]
pub fn classify_color(parameter: &str, value: f64) -> Result<String, WebError> {
    let parameter: Parameter = parameter.parse()?;
    Ok(hex(classify(parameter, value).color))
}

/// Compass direction name for a bearing.
#[wasm_bindgen]
pub fn direction_label(bearing_degrees: f64) -> String {
    crate::compass::direction_label(bearing_degrees).to_owned()
}

mod log {
    use tracing_subscriber::fmt::MakeWriter;
    use wasm_bindgen::JsValue;

    /// Routes formatted events to the browser console, one call per line.
    pub struct MakeConsoleWriter;

    pub struct ConsoleWriter;

    impl MakeWriter<'_> for MakeConsoleWriter {
        type Writer = ConsoleWriter;

        fn make_writer(&self) -> ConsoleWriter {
            ConsoleWriter
        }
    }

    impl std::io::Write for ConsoleWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            // The console adds its own line break.
            let line = String::from_utf8_lossy(buf);
            let args = js_sys::Array::of1(&JsValue::from_str(line.trim_end_matches('\n')));
            web_sys::console::log(&args);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
