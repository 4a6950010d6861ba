use serde::{Deserialize, Serialize};

/// Normalized result of a successful current-weather lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub location_name: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: Option<f64>,
    pub wind_speed_mps: Option<f64>,
    /// Upstream description as received, e.g. "light rain".
    pub description: String,
    /// The full upstream payload, kept for the audit column.
    pub raw: serde_json::Value,
}

impl CurrentWeather {
    /// Description with every word capitalized, e.g. "Light Rain".
    pub fn condition_title(&self) -> String {
        title_case(&self.description)
    }

    /// Build the row that gets logged for `city`.
    pub fn to_record(&self, city: &str) -> NewWeatherRecord {
        NewWeatherRecord {
            city: city.to_string(),
            temperature: self.temperature_c,
            humidity: self.humidity_pct,
            condition: self.description.clone(),
            api_response: self.raw.to_string(),
        }
    }
}

/// A row about to be appended to the log. The store stamps the time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWeatherRecord {
    pub city: String,
    pub temperature: f64,
    pub humidity: u8,
    pub condition: String,
    pub api_response: String,
}

/// A persisted log row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub id: i64,
    pub city: String,
    pub temperature: f64,
    pub humidity: u8,
    pub condition: String,
    /// Local time of the write, `%Y-%m-%d %H:%M:%S`.
    pub timestamp: String,
    pub api_response: String,
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;

    for ch in text.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }

    out
}
