//! Types for surfacing air-quality data.

use std::collections::BTreeMap;
use std::fmt::Display;

use chrono::{DateTime, Utc};

use crate::classify::Parameter;
use crate::geo::{GeoPoint, SamplePoint};

/// Current air quality at one coordinate, as reported by a data source.
///
/// For instance, the [OpenWeather air pollution
/// API](https://openweathermap.org/api/air-pollution).
#[derive(Clone, Debug, PartialEq)]
pub struct AirQualitySample {
    /// Time at which the data in this sample was observed.
    pub timestamp: DateTime<Utc>,

    /// Composite AQI category, 1 (good) to 5 (very poor).
    pub aqi: u8,

    /// Pollutant concentrations in μg/m³, keyed by pollutant code
    /// (e.g. "pm2_5", "pm10", "o3").
    pub components: BTreeMap<String, f64>,
}

/// A type that can get air quality at a coordinate.
///
/// Shared by all fetches of a click, which run concurrently.
pub trait AirQualitySource {
    type Error: Display;

    /// Get the current sample at the given point.
    fn sample(&self, at: &GeoPoint) -> Result<AirQualitySample, Self::Error>;
}

/// A successful fetch for one sample point.
#[derive(Clone, Debug, PartialEq)]
pub struct Reading {
    pub point: SamplePoint,
    pub aqi: u8,
    pub components: BTreeMap<String, f64>,
    pub observed_at: DateTime<Utc>,
}

impl Reading {
    pub fn new(point: SamplePoint, sample: AirQualitySample) -> Self {
        Reading {
            point,
            aqi: sample.aqi,
            components: sample.components,
            observed_at: sample.timestamp,
        }
    }

    pub fn observed_at_epoch_seconds(&self) -> i64 {
        self.observed_at.timestamp()
    }

    /// The value of `parameter` at this point.
    /// Pollutants missing from the reading count as 0.
    pub fn value(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::Aqi => self.aqi as f64,
            p => self.components.get(p.code()).copied().unwrap_or(0.0),
        }
    }
}

/// Error from a source that has no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no air quality data available")]
pub struct NoData;

/// The nullary AirQualitySource: provides no data.
pub struct NullAirQualitySource {}

impl AirQualitySource for NullAirQualitySource {
    type Error = NoData;

    fn sample(&self, _at: &GeoPoint) -> Result<AirQualitySample, NoData> {
        Err(NoData)
    }
}

/// Fake air quality source: repeatedly provides the indicated sample.
pub struct FakeAirQualitySource {
    pub sample: AirQualitySample,
}

impl AirQualitySource for FakeAirQualitySource {
    type Error = std::convert::Infallible;

    fn sample(&self, _at: &GeoPoint) -> Result<AirQualitySample, Self::Error> {
        Ok(self.sample.clone())
    }
}

#[cfg(feature = "openweather")]
impl AirQualitySource for owm::Client {
    type Error = owm::Error;

    fn sample(&self, at: &GeoPoint) -> Result<AirQualitySample, owm::Error> {
        let s = self.current(at.latitude(), at.longitude())?;
        Ok(AirQualitySample {
            // Out-of-range timestamps are clamped to the epoch rather than
            // losing an otherwise good reading.
            timestamp: DateTime::from_timestamp(s.observed_at, 0).unwrap_or_default(),
            aqi: s.aqi,
            components: s.components,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AirQualitySample {
        AirQualitySample {
            timestamp: DateTime::from_timestamp(1_606_147_200, 0).unwrap(),
            aqi: 3,
            components: BTreeMap::from([("pm2_5".to_owned(), 40.0), ("o3".to_owned(), 68.5)]),
        }
    }

    fn center() -> SamplePoint {
        SamplePoint {
            sample_id: "center".to_owned(),
            point: GeoPoint::new(51.1657, 10.4515).unwrap(),
            ring: 0,
            ring_distance_km: 0.0,
            bearing_degrees: None,
        }
    }

    #[test]
    fn reading_values() {
        let r = Reading::new(center(), sample());
        assert_eq!(r.value(Parameter::Aqi), 3.0);
        assert_eq!(r.value(Parameter::Pm2_5), 40.0);
        assert_eq!(r.value(Parameter::O3), 68.5);
        // Absent pollutant reads as zero.
        assert_eq!(r.value(Parameter::Pm10), 0.0);
        assert_eq!(r.observed_at_epoch_seconds(), 1_606_147_200);
    }

    #[test]
    fn null_source_has_no_data() {
        let at = GeoPoint::new(0.0, 0.0).unwrap();
        assert_eq!(NullAirQualitySource {}.sample(&at), Err(NoData));
    }

    #[test]
    fn fake_source_repeats() {
        let source = FakeAirQualitySource { sample: sample() };
        let at = GeoPoint::new(48.0, 10.0).unwrap();
        assert_eq!(source.sample(&at), Ok(sample()));
        assert_eq!(source.sample(&at), Ok(sample()));
    }
}
