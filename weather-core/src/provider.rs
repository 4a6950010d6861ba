use crate::{Config, CurrentWeather, WeatherError, provider::openweather::OpenWeatherClient};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;
pub mod pacing;

pub use pacing::Pacer;

/// A source of current weather observations for a named city.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_weather(&self, city: &str) -> Result<CurrentWeather, WeatherError>;
}

/// City looked up to prove that an API key works.
pub const KEY_CHECK_CITY: &str = "London";

/// Issue one lookup to check the credentials behind `provider`.
///
/// Any upstream answer other than an error status means the key was
/// accepted, so a payload with missing fields still passes.
pub async fn check_api_key<P: WeatherProvider + ?Sized>(provider: &P) -> Result<(), WeatherError> {
    match provider.current_weather(KEY_CHECK_CITY).await {
        Ok(_) | Err(WeatherError::IncompleteData { .. }) => Ok(()),
        Err(err) => Err(err),
    }
}

/// Construct the OpenWeather client from config.
///
/// Falls back to the built-in placeholder key when none is configured.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenWeatherClient> {
    if !config.has_api_key() {
        tracing::info!("no API key configured, using the built-in default key");
    }

    OpenWeatherClient::new(config.api_key().to_owned())
}
