//! Configuration, read once at startup and passed down explicitly.

use std::str::FromStr;

use crate::geo::GridShape;

/// Overrides [SurveySettings::radius_km].
pub const RADIUS_VAR: &str = "AIRMAP_RADIUS_KM";
/// Overrides [GridShape::rings].
pub const RINGS_VAR: &str = "AIRMAP_RINGS";
/// Overrides [GridShape::angles].
pub const ANGLES_VAR: &str = "AIRMAP_ANGLES";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}={value:?} is not a valid {expected}")]
    Malformed {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// How each click is sampled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurveySettings {
    /// Radius of the outermost ring.
    pub radius_km: f64,
    pub grid: GridShape,
}

impl Default for SurveySettings {
    fn default() -> Self {
        Self {
            radius_km: 10.0,
            grid: GridShape::default(),
        }
    }
}

/// Everything the application needs from its environment.
#[derive(Debug, Clone)]
pub struct Config {
    #[cfg(feature = "openweather")]
    pub openweather: owm::Settings,
    pub survey: SurveySettings,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut survey = SurveySettings::default();
        if let Some(radius) = parse(&lookup, RADIUS_VAR, "number of kilometers")? {
            survey.radius_km = radius;
        }
        if let Some(rings) = parse(&lookup, RINGS_VAR, "ring count")? {
            survey.grid.rings = rings;
        }
        if let Some(angles) = parse(&lookup, ANGLES_VAR, "angle count")? {
            survey.grid.angles = angles;
        }

        #[cfg(feature = "openweather")]
        let openweather = owm::Settings::from_lookup(&lookup);

        Ok(Config {
            #[cfg(feature = "openweather")]
            openweather,
            survey,
        })
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Malformed {
                var,
                value,
                expected,
            }),
    }
}
