//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client behind the [`WeatherProvider`] seam, with request pacing
//! - The SQLite weather log
//! - Session orchestration, statistics and report rendering
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod report;
pub mod session;
pub mod stats;
pub mod store;

pub use config::Config;
pub use error::{ApiHint, TransportFailure, WeatherError};
pub use model::{CurrentWeather, NewWeatherRecord, WeatherRecord};
pub use provider::{
    WeatherProvider, check_api_key, openweather::OpenWeatherClient, provider_from_config,
};
pub use session::{MultiSummary, WeatherSession};
pub use stats::LogStatistics;
pub use store::WeatherStore;
