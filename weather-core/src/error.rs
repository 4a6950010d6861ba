use std::{fmt, path::PathBuf};

use thiserror::Error;

/// Failures of a single lookup, store operation or session action.
///
/// None of these are fatal to an interactive session: the session prints
/// the message and returns control to the caller.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("City name cannot be empty")]
    InvalidInput,

    #[error(transparent)]
    Transport(#[from] TransportFailure),

    #[error("API returned status {status}: {message}")]
    Api {
        status: u16,
        message: String,
        hint: Option<ApiHint>,
    },

    #[error("Database error while trying to {operation}: {source}")]
    Storage {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Failed to create database directory '{0}'")]
    StorageIo(PathBuf, #[source] std::io::Error),

    #[error("Incomplete weather data: missing {}", .missing.join(", "))]
    IncompleteData { missing: Vec<&'static str> },
}

impl WeatherError {
    pub(crate) fn storage(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| WeatherError::Storage { operation, source }
    }

    /// Classified hint attached to an upstream API error, if any.
    pub fn hint(&self) -> Option<ApiHint> {
        match self {
            WeatherError::Api { hint, .. } => *hint,
            _ => None,
        }
    }
}

/// Network-level failures talking to the weather service.
#[derive(Debug, Error)]
pub enum TransportFailure {
    #[error("Connection error: please check your internet connection ({0})")]
    Connect(#[source] reqwest::Error),

    #[error("Request timeout: the API took too long to respond")]
    Timeout(#[source] reqwest::Error),

    #[error("Malformed response body: {0}")]
    MalformedBody(#[source] serde_json::Error),

    #[error("API request failed: {0}")]
    Request(#[source] reqwest::Error),
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key.
        let err = err.without_url();
        if err.is_timeout() {
            TransportFailure::Timeout(err)
        } else if err.is_connect() {
            TransportFailure::Connect(err)
        } else {
            TransportFailure::Request(err)
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        WeatherError::Transport(err.into())
    }
}

/// Non-authoritative suggestion derived from an upstream error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiHint {
    CheckSpelling,
    CheckApiKey,
    RateLimited,
}

impl ApiHint {
    /// Recognize well-known substrings of an upstream error message.
    pub fn classify(message: &str) -> Option<Self> {
        let lower = message.to_lowercase();

        if lower.contains("city not found") {
            Some(ApiHint::CheckSpelling)
        } else if lower.contains("invalid api key") {
            Some(ApiHint::CheckApiKey)
        } else if lower.contains("limit") {
            Some(ApiHint::RateLimited)
        } else {
            None
        }
    }

    pub fn suggestion(&self) -> &'static str {
        match self {
            ApiHint::CheckSpelling => "Check the city name spelling or try a different city",
            ApiHint::CheckApiKey => "Check your API key is correct (run `weather configure`)",
            ApiHint::RateLimited => {
                "You may have exceeded API rate limits. Wait a moment and try again"
            }
        }
    }
}

impl fmt::Display for ApiHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suggestion())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_messages() {
        assert_eq!(ApiHint::classify("city not found"), Some(ApiHint::CheckSpelling));
        assert_eq!(
            ApiHint::classify("Invalid API key. Please see https://openweathermap.org/faq"),
            Some(ApiHint::CheckApiKey)
        );
        assert_eq!(
            ApiHint::classify("Your account is temporary blocked due to exceeding of requests limitation"),
            Some(ApiHint::RateLimited)
        );
        assert_eq!(ApiHint::classify("Internal error"), None);
    }

    #[test]
    fn spelling_hint_mentions_spelling() {
        assert!(ApiHint::CheckSpelling.suggestion().contains("spelling"));
    }

    #[test]
    fn incomplete_data_lists_fields() {
        let err = WeatherError::IncompleteData { missing: vec!["main.temp", "main.humidity"] };
        assert_eq!(err.to_string(), "Incomplete weather data: missing main.temp, main.humidity");
    }

    #[test]
    fn hint_only_present_on_api_errors() {
        let err = WeatherError::Api {
            status: 404,
            message: "city not found".into(),
            hint: ApiHint::classify("city not found"),
        };
        assert_eq!(err.hint(), Some(ApiHint::CheckSpelling));
        assert_eq!(WeatherError::InvalidInput.hint(), None);
    }
}
