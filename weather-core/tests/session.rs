use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;
use tempfile::TempDir;
use weather_core::{
    CurrentWeather, NewWeatherRecord, WeatherError, WeatherProvider, WeatherSession, WeatherStore,
    provider::openweather::interpret_response,
};

const LONDON: &str = r#"{"cod":200,"name":"London","main":{"temp":15.2,"feels_like":14.1,"humidity":70,"pressure":1009},"weather":[{"description":"light rain"}],"wind":{"speed":5.7}}"#;
const PARIS: &str = r#"{"cod":200,"name":"Paris","main":{"temp":21.0,"humidity":40},"weather":[{"description":"clear sky"}]}"#;
const TOKYO: &str = r#"{"cod":200,"name":"Tokyo","main":{"temp":27.5,"humidity":80},"weather":[{"description":"few clouds"}]}"#;
const NOT_FOUND: &str = r#"{"cod":"404","message":"city not found"}"#;

/// Replays canned HTTP replies through the real response interpretation.
#[derive(Debug, Default)]
struct ScriptedProvider {
    replies: Mutex<VecDeque<(u16, String)>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn with(replies: &[(u16, &str)]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|(s, b)| (*s, b.to_string())).collect()),
            calls: Mutex::default(),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherProvider for ScriptedProvider {
    async fn current_weather(&self, city: &str) -> Result<CurrentWeather, WeatherError> {
        self.calls.lock().unwrap().push(city.to_string());
        let (status, body) = self.replies.lock().unwrap().pop_front().expect("unexpected lookup");
        interpret_response(status, &body, city)
    }
}

fn session(replies: &[(u16, &str)]) -> (TempDir, WeatherSession<ScriptedProvider, Vec<u8>>) {
    let dir = tempfile::tempdir().unwrap();
    let store = WeatherStore::new(dir.path().join("weather.db"));
    store.initialize().unwrap();
    (dir, WeatherSession::new(ScriptedProvider::with(replies), store, Vec::new()))
}

fn output<P: WeatherProvider>(session: &WeatherSession<P, Vec<u8>>) -> String {
    String::from_utf8_lossy(session.output()).into_owned()
}

#[tokio::test]
async fn successful_lookup_is_displayed_and_logged() {
    let (_dir, mut session) = session(&[(200, LONDON)]);

    assert!(session.process_city("London").await.unwrap());

    let rows = session.store().recent(10).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].city, "London");
    assert_eq!(rows[0].temperature, 15.2);
    assert_eq!(rows[0].humidity, 70);
    assert_eq!(rows[0].condition, "light rain");

    let raw: serde_json::Value = serde_json::from_str(&rows[0].api_response).unwrap();
    assert_eq!(raw["name"], "London");

    let text = output(&session);
    assert!(text.contains("Temp: 15.2°C"));
    assert!(text.contains("Humidity: 70%"));
    assert!(text.contains("Weather data for London logged successfully!"));
}

#[tokio::test]
async fn city_name_is_trimmed_before_lookup() {
    let (_dir, mut session) = session(&[(200, LONDON)]);

    assert!(session.process_city("  London \n").await.unwrap());
    assert_eq!(session.provider().calls(), vec!["London"]);
    assert_eq!(session.store().recent(1).unwrap()[0].city, "London");
}

#[tokio::test]
async fn unknown_city_is_not_logged_and_hints_at_spelling() {
    let (_dir, mut session) = session(&[(404, NOT_FOUND)]);

    assert!(!session.process_city("Nowhereville").await.unwrap());
    assert_eq!(session.total_logged().unwrap(), 0);

    let text = output(&session);
    assert!(text.contains("city not found"));
    assert!(text.contains("Suggestion: Check the city name spelling"));
    assert!(text.contains("Failed to get weather data for Nowhereville"));
}

#[tokio::test]
async fn blank_input_makes_no_lookup() {
    let (_dir, mut session) = session(&[]);

    for input in ["", "   ", "\t\n"] {
        assert!(!session.process_city(input).await.unwrap());
    }

    assert!(session.provider().calls().is_empty());
    assert_eq!(session.total_logged().unwrap(), 0);
    assert!(output(&session).contains("City name cannot be empty!"));
}

#[tokio::test]
async fn incomplete_payload_is_never_logged() {
    let body = r#"{"cod":200,"main":{"temp":9.0},"weather":[{"description":"fog"}]}"#;
    let (_dir, mut session) = session(&[(200, body)]);

    assert!(!session.process_city("Dublin").await.unwrap());
    assert_eq!(session.total_logged().unwrap(), 0);
    assert!(output(&session).contains("missing main.humidity"));
}

#[tokio::test]
async fn multiple_cities_skip_blank_entries() {
    let (_dir, mut session) = session(&[(200, PARIS), (200, TOKYO)]);

    let summary = session.process_multiple("Paris, , Tokyo").await.unwrap();

    assert_eq!(session.provider().calls(), vec!["Paris", "Tokyo"]);
    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(session.total_logged().unwrap(), 2);
    assert!(output(&session).contains("Summary: 2 out of 2 cities processed successfully!"));
}

#[tokio::test]
async fn count_tracks_only_successful_lookups() {
    let (_dir, mut session) = session(&[(200, PARIS), (404, NOT_FOUND), (200, TOKYO)]);

    let summary = session.process_multiple("Paris,Atlantis,Tokyo").await.unwrap();

    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.attempted, 3);
    assert_eq!(session.total_logged().unwrap(), 2);
}

#[tokio::test]
async fn only_commas_attempts_nothing() {
    let (_dir, mut session) = session(&[]);

    let summary = session.process_multiple(" , ,").await.unwrap();

    assert_eq!(summary.attempted, 0);
    assert!(session.provider().calls().is_empty());
    assert!(output(&session).contains("No valid city names found!"));
}

#[tokio::test]
async fn storage_failure_is_reported_after_display() {
    let dir = tempfile::tempdir().unwrap();
    // Never initialized: the table does not exist.
    let store = WeatherStore::new(dir.path().join("weather.db"));
    let mut session = WeatherSession::new(ScriptedProvider::with(&[(200, LONDON)]), store, Vec::new());

    assert!(!session.process_city("London").await.unwrap());

    let text = output(&session);
    assert!(text.contains("Temp: 15.2°C"));
    assert!(text.contains("Database error while trying to log weather data"));
}

fn seed(store: &WeatherStore, rows: &[(&str, f64, u8)]) {
    for (i, (city, temperature, humidity)) in rows.iter().enumerate() {
        let record = NewWeatherRecord {
            city: city.to_string(),
            temperature: *temperature,
            humidity: *humidity,
            condition: "clear sky".to_string(),
            api_response: "{}".to_string(),
        };
        store.append_at(&record, &format!("2024-05-01 10:00:{i:02}")).unwrap();
    }
}

#[test]
fn statistics_over_logged_rows() {
    let (_dir, mut session) = session(&[]);
    seed(session.store(), &[("A", 10.0, 50), ("A", 20.0, 60), ("B", 30.0, 70)]);

    assert!(session.show_statistics().unwrap());

    let text = output(&session);
    assert!(text.contains("Total weather entries: 3"));
    assert!(text.contains("Different cities tracked: 2"));
    assert!(text.contains("Most searched city: A (2 times)"));
    assert!(text.contains("Average temperature: 20.0°C"));
    assert!(text.contains("Average humidity: 60.0%"));
}

#[test]
fn statistics_on_empty_log() {
    let (_dir, mut session) = session(&[]);

    assert!(session.show_statistics().unwrap());
    assert!(output(&session).contains("No data available for statistics."));
}

#[test]
fn view_recent_lists_newest_first() {
    let (_dir, mut session) = session(&[]);
    seed(session.store(), &[("Oslo", 1.0, 80), ("Rome", 25.0, 30)]);

    assert!(session.view_recent().unwrap());

    let text = output(&session);
    assert!(text.contains("Showing latest 2 of 2 total entries"));
    let rome = text.find("Rome").unwrap();
    let oslo = text.find("Oslo").unwrap();
    assert!(rome < oslo);
    assert!(text.contains("10:00"));
}

#[test]
fn view_recent_on_empty_log() {
    let (_dir, mut session) = session(&[]);

    assert!(session.view_recent().unwrap());
    assert!(output(&session).contains("No weather logs found in the database!"));
}

#[test]
fn clear_requires_explicit_yes() {
    let (_dir, mut session) = session(&[]);
    seed(session.store(), &[("A", 1.0, 1), ("B", 2.0, 2)]);

    assert!(!session.clear_all("no").unwrap());
    assert!(!session.clear_all("y").unwrap());
    assert_eq!(session.total_logged().unwrap(), 2);
    assert!(output(&session).contains("Operation cancelled."));

    assert!(session.clear_all("YES").unwrap());
    assert_eq!(session.total_logged().unwrap(), 0);
    assert!(session.store().recent(100).unwrap().is_empty());
}
