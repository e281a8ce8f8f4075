//! Summary statistics over the readings of one click.

use crate::atmosphere::Reading;
use crate::classify::{classify, Band, Parameter};
use crate::geo::{GeoPoint, SamplePoint};

/// The summary of one click: the mean of `parameter` over every point that
/// returned a reading, plus each point's own value.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult {
    center: GeoPoint,
    parameter: Parameter,
    mean_value: Option<f64>,
    per_point_values: Vec<(SamplePoint, f64)>,
}

impl AggregateResult {
    pub fn center(&self) -> GeoPoint {
        self.center
    }

    pub fn parameter(&self) -> Parameter {
        self.parameter
    }

    /// Arithmetic mean over the successful readings.
    /// None when no reading succeeded: that is "no data", not zero.
    pub fn mean_value(&self) -> Option<f64> {
        self.mean_value
    }

    pub fn sample_count(&self) -> usize {
        self.per_point_values.len()
    }

    /// Each successful point with its value, in sample order.
    pub fn per_point_values(&self) -> &[(SamplePoint, f64)] {
        &self.per_point_values
    }

    /// Band of the mean value, if there is one.
    pub fn band(&self) -> Option<&'static Band> {
        self.mean_value.map(|mean| classify(self.parameter, mean))
    }
}

/// Summarize `readings` by `parameter`.
pub fn aggregate(center: GeoPoint, readings: &[Reading], parameter: Parameter) -> AggregateResult {
    let per_point_values: Vec<(SamplePoint, f64)> = readings
        .iter()
        .map(|r| (r.point.clone(), r.value(parameter)))
        .collect();

    let mean_value = if per_point_values.is_empty() {
        None
    } else {
        let sum: f64 = per_point_values.iter().map(|(_, v)| v).sum();
        Some(sum / per_point_values.len() as f64)
    };

    AggregateResult {
        center,
        parameter,
        mean_value,
        per_point_values,
    }
}
