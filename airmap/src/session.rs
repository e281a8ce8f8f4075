//! The click state machine.
//!
//! ```text
//!            click                 all fetches settled
//!   Idle ──────────────▶ Loading ─────────────────────▶ Ready / Failed
//!     ▲                    ▲  │                             │
//!     │ clear              │  └────── newer click ──────────┤
//!     └────────────────────┴────────────────────────────────┘
//! ```
//!
//! Every click bumps a generation counter and cancels the previous click's
//! [Context]. A click whose generation is no longer current when its fetches
//! settle is discarded, so a slow older click never overwrites a newer one.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::aggregate::{aggregate, AggregateResult};
use crate::atmosphere::AirQualitySource;
use crate::classify::Parameter;
use crate::config::SurveySettings;
use crate::context::Context;
use crate::fetch::fetch_readings;
use crate::geo::{generate_sample_points, GeoError, GeoPoint};

/// Why a click produced no result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Failure {
    #[error("no data: every sample point failed")]
    NoData,
    #[error("invalid input: {0}")]
    InvalidInput(#[from] GeoError),
}

/// What the presentation layer should show.
#[derive(Debug, Clone, PartialEq)]
pub enum State {
    Idle,
    Loading { center: GeoPoint },
    Ready { center: GeoPoint, result: AggregateResult },
    Failed { center: GeoPoint, reason: Failure },
}

struct Inner {
    generation: u64,
    state: State,
    in_flight: Option<Context>,
}

/// A click in progress.
struct Ticket {
    generation: u64,
    ctx: Context,
}

/// One map's worth of clicks, against one data source.
pub struct Session<S> {
    source: S,
    settings: SurveySettings,
    inner: Mutex<Inner>,
}

impl<S> Session<S>
where
    S: AirQualitySource + Sync,
{
    pub fn new(source: S, settings: SurveySettings) -> Self {
        Session {
            source,
            settings,
            inner: Mutex::new(Inner {
                generation: 0,
                state: State::Idle,
                in_flight: None,
            }),
        }
    }

    pub fn settings(&self) -> &SurveySettings {
        &self.settings
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> State {
        self.lock().state.clone()
    }

    /// Forget any result and cancel any click in flight.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        if let Some(ctx) = inner.in_flight.take() {
            ctx.cancel();
        }
        inner.state = State::Idle;
    }

    /// Survey the area around `center`, blocking until every fetch settles.
    ///
    /// Returns the new state, or None if a newer click (or a clear) superseded
    /// this one while it was in flight.
    pub fn click(&self, center: GeoPoint, parameter: Parameter) -> Option<State> {
        let ticket = self.begin(center);
        let outcome = self.survey(&ticket.ctx, center, parameter);
        self.settle(ticket, center, outcome)
    }

    fn begin(&self, center: GeoPoint) -> Ticket {
        let mut inner = self.lock();
        inner.generation += 1;
        let ctx = Context::new();
        if let Some(previous) = inner.in_flight.replace(ctx.clone()) {
            previous.cancel();
        }
        inner.state = State::Loading { center };
        tracing::info!("click {} at {}", inner.generation, center);
        Ticket {
            generation: inner.generation,
            ctx,
        }
    }

    fn survey(
        &self,
        ctx: &Context,
        center: GeoPoint,
        parameter: Parameter,
    ) -> Result<AggregateResult, Failure> {
        let points = generate_sample_points(center, self.settings.radius_km, self.settings.grid)?;
        let readings = fetch_readings(ctx, &self.source, &points);
        let result = aggregate(center, &readings, parameter);
        if result.sample_count() == 0 {
            return Err(Failure::NoData);
        }
        Ok(result)
    }

    fn settle(
        &self,
        ticket: Ticket,
        center: GeoPoint,
        outcome: Result<AggregateResult, Failure>,
    ) -> Option<State> {
        let mut inner = self.lock();
        if inner.generation != ticket.generation {
            tracing::debug!(
                "discarding result of click {}; click {} is current",
                ticket.generation,
                inner.generation
            );
            return None;
        }
        inner.in_flight = None;
        inner.state = match outcome {
            Ok(result) => {
                tracing::info!(
                    "click {}: mean {} {:?} over {} points",
                    ticket.generation,
                    result.parameter(),
                    result.mean_value(),
                    result.sample_count()
                );
                State::Ready { center, result }
            }
            Err(reason) => {
                tracing::warn!("click {} failed: {}", ticket.generation, reason);
                State::Failed { center, reason }
            }
        };
        Some(inner.state.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::Utc;

    use super::*;
    use crate::atmosphere::{AirQualitySample, FakeAirQualitySource, NullAirQualitySource};
    use crate::geo::GridShape;

    fn pm2_5(value: f64) -> AirQualitySample {
        AirQualitySample {
            timestamp: Utc::now(),
            aqi: 3,
            components: BTreeMap::from([("pm2_5".to_owned(), value)]),
        }
    }

    fn germany() -> GeoPoint {
        GeoPoint::new(51.1657, 10.4515).unwrap()
    }

    #[test]
    fn uniform_area_end_to_end() {
        let session = Session::new(
            FakeAirQualitySource { sample: pm2_5(40.0) },
            SurveySettings::default(),
        );
        assert_eq!(session.state(), State::Idle);

        let state = session
            .click(germany(), Parameter::Pm2_5)
            .expect("only click should be current");
        let State::Ready { center, result } = state.clone() else {
            panic!("expected Ready, got {state:?}");
        };
        assert_eq!(center, germany());
        assert_eq!(result.sample_count(), 81);
        assert_eq!(result.mean_value(), Some(40.0));
        assert_eq!(result.band().map(|b| b.label), Some("Unhealthy"));
        assert_eq!(session.state(), State::Ready { center, result });
    }

    #[test]
    fn total_failure_is_no_data() {
        let session = Session::new(NullAirQualitySource {}, SurveySettings::default());
        let state = session.click(germany(), Parameter::Aqi);
        assert_eq!(
            state,
            Some(State::Failed {
                center: germany(),
                reason: Failure::NoData
            })
        );
    }

    #[test]
    fn invalid_radius_fails_fast() {
        let settings = SurveySettings {
            radius_km: 0.0,
            ..Default::default()
        };
        let session = Session::new(FakeAirQualitySource { sample: pm2_5(1.0) }, settings);
        let state = session.click(germany(), Parameter::Pm2_5);
        assert_eq!(
            state,
            Some(State::Failed {
                center: germany(),
                reason: Failure::InvalidInput(GeoError::Radius(0.0))
            })
        );
    }

    #[test]
    fn clear_returns_to_idle() {
        let session = Session::new(
            FakeAirQualitySource { sample: pm2_5(5.0) },
            SurveySettings::default(),
        );
        session.click(germany(), Parameter::Pm2_5);
        session.clear();
        assert_eq!(session.state(), State::Idle);
    }

    /// Blocks fetches north of 45°N until the gate is opened.
    struct Gated {
        gate: Context,
        sample: AirQualitySample,
    }

    impl AirQualitySource for Gated {
        type Error = std::convert::Infallible;

        fn sample(&self, at: &GeoPoint) -> Result<AirQualitySample, Self::Error> {
            if at.latitude() > 45.0 {
                self.gate.wait();
            }
            Ok(self.sample.clone())
        }
    }

    #[test]
    fn newer_click_supersedes_older() {
        let gate = Context::new();
        let settings = SurveySettings {
            radius_km: 5.0,
            grid: GridShape {
                rings: 1,
                angles: 4,
            },
        };
        let session = Arc::new(Session::new(
            Gated {
                gate: gate.clone(),
                sample: pm2_5(20.0),
            },
            settings,
        ));

        let north = germany();
        let south = GeoPoint::new(40.4168, -3.7038).unwrap();

        let older = {
            let session = session.clone();
            std::thread::spawn(move || session.click(north, Parameter::Pm2_5))
        };
        while session.state() != (State::Loading { center: north }) {
            std::thread::sleep(Duration::from_millis(1));
        }

        let newer = session.click(south, Parameter::Pm2_5);
        assert!(matches!(newer, Some(State::Ready { center, .. }) if center == south));

        gate.cancel();
        let older = older.join().expect("older click should finish");
        assert_eq!(older, None, "stale click should be discarded");

        let State::Ready { center, result } = session.state() else {
            panic!("expected Ready");
        };
        assert_eq!(center, south);
        assert_eq!(result.sample_count(), 5);
    }
}
