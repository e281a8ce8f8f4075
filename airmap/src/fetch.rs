//! Fan-out of one fetch per sample point.
//!
//! Every point gets its own thread; there is no limit, batching, retry or
//! timeout beyond the transport's own. All fetches are joined before
//! returning, and failures only shrink the result.

use crate::atmosphere::{AirQualitySource, Reading};
use crate::context::Context;
use crate::geo::SamplePoint;

/// Fetch a reading for each point, keeping those that succeed.
///
/// Readings come back in the order of `points`. Points whose fetch fails are
/// logged and omitted. Once `ctx` is cancelled, fetches that have not started
/// yet are skipped.
pub fn fetch_readings<S>(ctx: &Context, source: &S, points: &[SamplePoint]) -> Vec<Reading>
where
    S: AirQualitySource + Sync,
{
    let readings: Vec<Reading> = std::thread::scope(|scope| {
        let handles: Vec<_> = points
            .iter()
            .map(|point| scope.spawn(move || fetch_one(ctx, source, point)))
            .collect();
        handles
            .into_iter()
            .zip(points)
            .filter_map(|(handle, point)| match handle.join() {
                Ok(reading) => reading,
                Err(e) => {
                    tracing::error!("fetch for {} panicked: {:?}", point.sample_id, e);
                    None
                }
            })
            .collect()
    });
    tracing::info!(
        "fetched {} of {} sample points",
        readings.len(),
        points.len()
    );
    readings
}

fn fetch_one<S>(ctx: &Context, source: &S, point: &SamplePoint) -> Option<Reading>
where
    S: AirQualitySource,
{
    if ctx.is_cancelled() {
        tracing::debug!("skipping {}: click superseded", point.sample_id);
        return None;
    }
    match source.sample(&point.point) {
        Ok(sample) => Some(Reading::new(point.clone(), sample)),
        Err(e) => {
            tracing::warn!(
                "failed to fetch data for {} at {}: {}",
                point.sample_id,
                point.point,
                e
            );
            None
        }
    }
}
