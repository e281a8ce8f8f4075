//! An air-quality map.
//!
//! Click a point; the area around it is sampled on a polar grid of
//! coordinates, each coordinate's current air quality is fetched, and the
//! results are summarized into a colored overlay:
//!
//! - [geo] lays out the grid,
//! - [fetch] queries an [atmosphere::AirQualitySource] for every point at once,
//! - [aggregate] and [classify] reduce the readings to a mean and severity band,
//! - [overlay] is what the map renderer draws,
//! - [session] ties a sequence of clicks together, discarding superseded ones.
//!
//! # Building
//! The `web` feature builds browser bindings (`wasm32-unknown-unknown`, with
//! `--no-default-features --features web`); the `openweather` feature fetches
//! from the OpenWeather air pollution service and builds the `airmap` binary.
//!

pub mod aggregate;
pub mod atmosphere;
pub mod classify;
pub mod compass;
pub mod config;
pub mod context;
pub mod fetch;
pub mod geo;
pub mod overlay;
pub mod session;

#[cfg(feature = "web")]
pub mod web;

pub use aggregate::{aggregate, AggregateResult};
pub use classify::Parameter;
pub use geo::{generate_sample_points, GeoPoint, GridShape, SamplePoint};
pub use session::{Session, State};
