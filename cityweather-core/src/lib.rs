//! Core library for the `cityweather` service.
//!
//! This crate defines:
//! - Configuration (area codes, upstream URL, refresh interval)
//! - The raw JMA forecast documents and their parser
//! - Normalization into one `CityWeather` record per area
//! - Aggregation, the shared snapshot store and the refresh scheduler
//!
//! The HTTP API in `cityweather-cli` only reads from [`SnapshotStore`].

pub mod aggregate;
pub mod config;
pub mod error;
pub mod forecast;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod scheduler;
pub mod store;

pub use aggregate::Aggregator;
pub use config::Config;
pub use error::{AreaError, DecodeError, FetchError};
pub use forecast::{ForecastDocument, parse_documents};
pub use model::{CityWeather, Snapshot, WeeklyWeather};
pub use normalize::normalize;
pub use provider::{ForecastSource, JmaClient};
pub use scheduler::Scheduler;
pub use store::{Published, SnapshotStore};
