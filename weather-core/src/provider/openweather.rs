use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{ApiHint, TransportFailure, WeatherError},
    model::CurrentWeather,
    provider::Pacer,
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Total time allowed for one request, body included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Minimum spacing between two consecutive requests.
pub const REQUEST_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
    pacer: Pacer,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http,
            pacer: Pacer::new(REQUEST_DELAY),
        })
    }

    /// Point the client at another endpoint serving the same API.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.pacer = Pacer::new(delay);
        self
    }

    /// Replace the total per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;
        Ok(self)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    async fn fetch_current(&self, city: &str) -> Result<CurrentWeather, WeatherError> {
        self.pacer.wait_turn().await;

        tracing::debug!(city, url = %self.base_url, "requesting current weather");

        let res = self
            .http
            .get(&self.base_url)
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await?;

        let status = res.status().as_u16();
        let body = res.text().await?;

        tracing::debug!(city, status, bytes = body.len(), "received OpenWeather response");

        interpret_response(status, &body, city)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current_weather(&self, city: &str) -> Result<CurrentWeather, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::InvalidInput);
        }

        let result = self.fetch_current(city).await;
        if let Err(err) = &result {
            tracing::warn!(city, error = %err, "weather lookup failed");
        }
        result
    }
}

/// Turn an HTTP status and body from the current-weather endpoint into a
/// normalized observation or a classified failure.
pub fn interpret_response(
    status: u16,
    body: &str,
    city: &str,
) -> Result<CurrentWeather, WeatherError> {
    let raw: Value = match serde_json::from_str(body) {
        Ok(raw) => raw,
        Err(err) if status == 200 => return Err(TransportFailure::MalformedBody(err).into()),
        Err(_) => return Err(api_error(status, &truncate_body(body))),
    };

    if status != 200 {
        return Err(api_error(status, message_of(&raw)));
    }

    // Only a numeric 200 counts as success.
    match raw.get("cod") {
        Some(Value::Number(n)) if n.as_i64() == Some(200) => {}
        Some(cod) => {
            let status = error_code(cod).and_then(|c| u16::try_from(c).ok()).unwrap_or(status);
            return Err(api_error(status, message_of(&raw)));
        }
        None => return Err(api_error(status, "Response carried no status code")),
    }

    let parsed = OwCurrentResponse::deserialize(&raw).map_err(TransportFailure::MalformedBody)?;
    parsed.into_current(city, raw)
}

fn api_error(status: u16, message: &str) -> WeatherError {
    WeatherError::Api { status, message: message.to_string(), hint: ApiHint::classify(message) }
}

fn message_of(raw: &Value) -> &str {
    raw.get("message").and_then(Value::as_str).unwrap_or("Unknown error")
}

/// `cod` is a number on success and a string on most errors.
fn error_code(cod: &Value) -> Option<i64> {
    match cod {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Default, Deserialize)]
struct OwMain {
    temp: Option<f64>,
    feels_like: Option<f64>,
    humidity: Option<Value>,
    pressure: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: Option<String>,
    main: Option<OwMain>,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: Option<OwWind>,
}

impl OwCurrentResponse {
    fn into_current(self, city: &str, raw: Value) -> Result<CurrentWeather, WeatherError> {
        let main = self.main.unwrap_or_default();
        let description = self.weather.into_iter().next().and_then(|w| w.description);
        let humidity = main.humidity.as_ref().and_then(humidity_percent);

        let mut missing = Vec::new();
        if main.temp.is_none() {
            missing.push("main.temp");
        }
        if humidity.is_none() {
            missing.push("main.humidity");
        }
        if description.is_none() {
            missing.push("weather[0].description");
        }

        let (Some(temp), Some(humidity), Some(description)) = (main.temp, humidity, description)
        else {
            return Err(WeatherError::IncompleteData { missing });
        };

        let location_name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| city.to_string());

        Ok(CurrentWeather {
            location_name,
            temperature_c: temp,
            feels_like_c: main.feels_like.unwrap_or(temp),
            humidity_pct: humidity,
            pressure_hpa: main.pressure,
            wind_speed_mps: self.wind.and_then(|w| w.speed),
            description,
            raw,
        })
    }
}

/// A whole percentage in 0..=100; anything else is unusable.
fn humidity_percent(value: &Value) -> Option<u8> {
    let value = value.as_f64()?;
    (value.fract() == 0.0 && (0.0..=100.0).contains(&value)).then_some(value as u8)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
