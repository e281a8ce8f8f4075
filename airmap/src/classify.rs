//! Severity bands and display colors for each measured parameter.
//!
//! All parameters share one lookup: an ordered table of bands with an
//! inclusive lower bound and an exclusive upper bound; the top band is
//! unbounded above.

use std::str::FromStr;

use embedded_graphics_core::pixelcolor::{Rgb888, RgbColor};
use serde::Serialize;

/// Color for "no data": the aggregate has no mean.
pub const NO_DATA: Rgb888 = Rgb888::new(0x66, 0x66, 0x66);

/// The quantity a click is summarized by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Parameter {
    /// Composite AQI category, 1 (good) to 5 (very poor).
    #[serde(rename = "aqi")]
    Aqi,
    /// Fine particulate matter.
    #[serde(rename = "pm2_5")]
    Pm2_5,
    /// Coarse particulate matter.
    #[serde(rename = "pm10")]
    Pm10,
    /// Ozone.
    #[serde(rename = "o3")]
    O3,
}

impl Parameter {
    pub const ALL: [Parameter; 4] = [
        Parameter::Aqi,
        Parameter::Pm2_5,
        Parameter::Pm10,
        Parameter::O3,
    ];

    /// Key of this parameter in the data source's component map.
    pub fn code(&self) -> &'static str {
        match self {
            Parameter::Aqi => "aqi",
            Parameter::Pm2_5 => "pm2_5",
            Parameter::Pm10 => "pm10",
            Parameter::O3 => "o3",
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Parameter::Aqi => "AQI",
            Parameter::Pm2_5 => "PM2.5",
            Parameter::Pm10 => "PM10",
            Parameter::O3 => "O3",
        }
    }

    /// Unit of concentration; the AQI is a unitless category.
    pub fn unit(&self) -> Option<&'static str> {
        match self {
            Parameter::Aqi => None,
            _ => Some("μg/m³"),
        }
    }

    /// Decimal places shown when presenting a value.
    pub fn precision(&self) -> usize {
        match self {
            Parameter::Aqi => 1,
            _ => 2,
        }
    }

    /// Opacity of the filled area circle.
    pub fn fill_opacity(&self) -> f64 {
        match self {
            Parameter::Aqi => 0.5,
            _ => 0.6,
        }
    }

    /// Breakpoint table for this parameter, lowest band first.
    pub fn bands(&self) -> &'static [Band] {
        match self {
            Parameter::Aqi => &AQI_BANDS,
            Parameter::Pm2_5 => &PM2_5_BANDS,
            Parameter::Pm10 => &PM10_BANDS,
            Parameter::O3 => &O3_BANDS,
        }
    }

    /// Format a value with this parameter's precision and unit.
    pub fn format_value(&self, value: f64) -> String {
        match self.unit() {
            Some(unit) => format!("{value:.prec$} {unit}", prec = self.precision()),
            None => format!("{value:.prec$}", prec = self.precision()),
        }
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown parameter {0:?}; expected one of aqi, pm2_5, pm10, o3")]
pub struct UnknownParameter(pub String);

impl FromStr for Parameter {
    type Err = UnknownParameter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Parameter::ALL
            .into_iter()
            .find(|p| p.code() == lower || p.name().to_ascii_lowercase() == lower)
            .ok_or_else(|| UnknownParameter(s.to_owned()))
    }
}

/// One severity band of a breakpoint table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    /// Inclusive lower bound.
    pub lower: f64,
    /// Exclusive upper bound; None for the top band.
    pub upper: Option<f64>,
    /// 1 (best) to 5 (worst).
    pub level: u8,
    pub label: &'static str,
    pub color: Rgb888,
}

impl Band {
    const fn new(lower: f64, upper: Option<f64>, level: u8, label: &'static str, color: Rgb888) -> Self {
        Band {
            lower,
            upper,
            level,
            label,
            color,
        }
    }

    fn admits(&self, value: f64) -> bool {
        match self.upper {
            Some(upper) => value < upper,
            None => true,
        }
    }
}

// AQI categories are integers; half-integer bounds classify a mean category
// by rounding to the nearest one.
static AQI_BANDS: [Band; 5] = [
    Band::new(0.0, Some(1.5), 1, "Good", Rgb888::new(0x00, 0xE4, 0x00)),
    Band::new(1.5, Some(2.5), 2, "Fair", Rgb888::new(0xFF, 0xFF, 0x00)),
    Band::new(2.5, Some(3.5), 3, "Moderate", Rgb888::new(0xFF, 0x7E, 0x00)),
    Band::new(3.5, Some(4.5), 4, "Poor", Rgb888::new(0xFF, 0x00, 0x00)),
    Band::new(4.5, None, 5, "Very Poor", Rgb888::new(0x8F, 0x3F, 0x97)),
];

static PM2_5_BANDS: [Band; 5] = [
    Band::new(0.0, Some(12.0), 1, "Good", Rgb888::new(0xFE, 0xF9, 0xC3)),
    Band::new(12.0, Some(35.0), 2, "Moderate", Rgb888::new(0xFD, 0xE0, 0x47)),
    Band::new(35.0, Some(55.0), 3, "Unhealthy", Rgb888::new(0xEA, 0xB3, 0x08)),
    Band::new(55.0, Some(75.0), 4, "Very Unhealthy", Rgb888::new(0xF5, 0x9E, 0x0B)),
    Band::new(75.0, None, 5, "Hazardous", Rgb888::new(0xDC, 0x26, 0x26)),
];

static PM10_BANDS: [Band; 5] = [
    Band::new(0.0, Some(20.0), 1, "Good", Rgb888::new(0xFE, 0xF3, 0xC7)),
    Band::new(20.0, Some(50.0), 2, "Moderate", Rgb888::new(0xD9, 0x77, 0x06)),
    Band::new(50.0, Some(100.0), 3, "Unhealthy", Rgb888::new(0x92, 0x40, 0x0E)),
    Band::new(100.0, Some(150.0), 4, "Very Unhealthy", Rgb888::new(0x78, 0x35, 0x0F)),
    Band::new(150.0, None, 5, "Hazardous", Rgb888::new(0x45, 0x1A, 0x03)),
];

static O3_BANDS: [Band; 5] = [
    Band::new(0.0, Some(50.0), 1, "Good", Rgb888::new(0xE0, 0xF2, 0xFE)),
    Band::new(50.0, Some(100.0), 2, "Moderate", Rgb888::new(0x7D, 0xD3, 0xFC)),
    Band::new(100.0, Some(150.0), 3, "Unhealthy", Rgb888::new(0x3B, 0x82, 0xF6)),
    Band::new(150.0, Some(200.0), 4, "Very Unhealthy", Rgb888::new(0x1E, 0x40, 0xAF)),
    Band::new(200.0, None, 5, "Hazardous", Rgb888::new(0x1E, 0x3A, 0x8A)),
];

/// Find the band `value` falls in.
///
/// Values below the first lower bound fall in the first band; NaN falls in the top band.
pub fn classify(parameter: Parameter, value: f64) -> &'static Band {
    let bands = parameter.bands();
    match bands.iter().find(|b| b.admits(value)) {
        Some(band) => band,
        None => &bands[bands.len() - 1],
    }
}

/// Render a color as `#RRGGBB`.
pub fn hex(color: Rgb888) -> String {
    format!("#{:02X}{:02X}{:02X}", color.r(), color.g(), color.b())
}

/// One row of a map legend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
}

/// Legend rows for a parameter, lowest band first.
pub fn legend(parameter: Parameter) -> Vec<LegendEntry> {
    parameter
        .bands()
        .iter()
        .map(|band| {
            let range = match (parameter, band.upper) {
                (Parameter::Aqi, _) => band.level.to_string(),
                (_, Some(upper)) => format!("{}-{}", band.lower, upper),
                (_, None) => format!("{}+", band.lower),
            };
            let label = match parameter.unit() {
                Some(unit) => format!("{range} {unit} ({})", band.label),
                None => format!("{range} ({})", band.label),
            };
            LegendEntry {
                label,
                color: hex(band.color),
            }
        })
        .collect()
}
