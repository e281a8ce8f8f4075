//! Wire format of the air pollution response.
//!
//! ```json
//! {
//!   "coord": { "lon": 10.4515, "lat": 51.1657 },
//!   "list": [{
//!     "main": { "aqi": 2 },
//!     "components": { "co": 201.94, "no": 0.02, "no2": 0.77, "o3": 68.66,
//!                     "so2": 0.64, "pm2_5": 0.5, "pm10": 0.54, "nh3": 0.12 },
//!     "dt": 1606147200
//!   }]
//! }
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{Error, Sample};

#[derive(Debug, Deserialize)]
struct PollutionResponse {
    #[serde(default)]
    list: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    main: Main,
    #[serde(default)]
    components: BTreeMap<String, f64>,
    dt: i64,
}

#[derive(Debug, Deserialize)]
struct Main {
    aqi: u8,
}

/// Interpret a response body.
/// Only the first (current) entry is used.
pub fn parse(body: &str) -> Result<Sample, Error> {
    let response: PollutionResponse = serde_json::from_str(body)?;
    let entry = response.list.into_iter().next().ok_or(Error::Empty)?;
    if !(1..=5).contains(&entry.main.aqi) {
        return Err(Error::InvalidAqi(entry.main.aqi));
    }
    Ok(Sample {
        aqi: entry.main.aqi,
        components: entry.components,
        observed_at: entry.dt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "coord": { "lon": 10.4515, "lat": 51.1657 },
        "list": [{
            "main": { "aqi": 2 },
            "components": { "co": 201.94, "no": 0.02, "no2": 0.77, "o3": 68.66,
                            "so2": 0.64, "pm2_5": 12.5, "pm10": 20.1, "nh3": 0.12 },
            "dt": 1606147200
        }]
    }"#;

    #[test]
    fn parse_first_entry() {
        let sample = parse(BODY).expect("body should parse");
        assert_eq!(sample.aqi, 2);
        assert_eq!(sample.observed_at, 1606147200);
        assert_eq!(sample.components["pm2_5"], 12.5);
        assert_eq!(sample.components["pm10"], 20.1);
        assert_eq!(sample.components["o3"], 68.66);
    }

    #[test]
    fn empty_list() {
        let err = parse(r#"{"coord":{"lon":0,"lat":0},"list":[]}"#)
            .expect_err("empty list should not parse");
        assert!(matches!(err, Error::Empty));
    }

    #[test]
    fn aqi_out_of_range() {
        let err = parse(r#"{"list":[{"main":{"aqi":7},"components":{},"dt":0}]}"#)
            .expect_err("AQI 7 should be rejected");
        assert!(matches!(err, Error::InvalidAqi(7)));
    }

    #[test]
    fn malformed_body() {
        let err = parse("<html>502 Bad Gateway</html>").expect_err("HTML is not JSON");
        assert!(matches!(err, Error::Decode(_)));
    }
}
