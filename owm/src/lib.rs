//! Client for the OpenWeather air pollution service.
//!
//! One request per coordinate, returning the current composite AQI category
//! and per-pollutant concentrations. See
//! <https://openweathermap.org/api/air-pollution>.

use std::collections::BTreeMap;

use reqwest::StatusCode;

mod response;

pub use response::parse;

/// Default location of the "current air pollution" endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/air_pollution";

/// Environment variable holding the API credential.
pub const API_KEY_VAR: &str = "OPENWEATHER_API_KEY";

/// Environment variable overriding [DEFAULT_ENDPOINT].
pub const ENDPOINT_VAR: &str = "OPENWEATHER_ENDPOINT";

/// An error in fetching or interpreting a pollution sample.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no API key configured (set OPENWEATHER_API_KEY)")]
    MissingApiKey,
    #[error("in request to air pollution service: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("air pollution service returned {0}")]
    Status(StatusCode),
    #[error("in decoding air pollution response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("air pollution response has no entries")]
    Empty,
    #[error("AQI category {0} is outside 1..=5")]
    InvalidAqi(u8),
}

/// Settings when connecting to the air pollution service.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Settings {
    /// API credential. Requests fail with [Error::MissingApiKey] if absent.
    pub api_key: Option<String>,

    /// URL of the air pollution endpoint.
    pub endpoint: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
        }
    }
}

impl Settings {
    /// Settings with the given API key and the default endpoint.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Read settings from the process environment.
    ///
    /// An absent or empty key is not an error here; it surfaces on each request instead.
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_key = lookup(API_KEY_VAR).filter(|k| !k.is_empty());
        if api_key.is_none() {
            tracing::warn!("{API_KEY_VAR} is not set; all requests will fail");
        }
        let endpoint = lookup(ENDPOINT_VAR).unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned());
        Self { api_key, endpoint }
    }
}

/// Current air quality at one coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Composite AQI category, 1 (good) to 5 (very poor).
    pub aqi: u8,
    /// Concentrations by pollutant code (e.g. "pm2_5"), in μg/m³.
    pub components: BTreeMap<String, f64>,
    /// Observation time, in seconds since the Unix epoch.
    pub observed_at: i64,
}

/// Handle to the air pollution service.
///
/// Cheap to share between threads; each call is an independent request.
pub struct Client {
    http: reqwest::blocking::Client,
    settings: Settings,
}

impl Client {
    pub fn new(settings: Settings) -> Result<Self, Error> {
        let http = reqwest::blocking::Client::builder().build()?;
        Ok(Client { http, settings })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Fetch the current sample at the given coordinate.
    pub fn current(&self, latitude: f64, longitude: f64) -> Result<Sample, Error> {
        let key = self.settings.api_key.as_deref().ok_or(Error::MissingApiKey)?;
        tracing::debug!("requesting air pollution at {latitude:.4},{longitude:.4}");

        let response = self
            .http
            .get(&self.settings.endpoint)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("appid", key.to_owned()),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status));
        }
        parse(&response.text()?)
    }
}
