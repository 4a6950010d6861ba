//! Append-only SQLite log of successful lookups.
//!
//! A connection is opened per operation and dropped when it returns, so no
//! transaction is ever held between calls.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::Local;
use rusqlite::{Connection, Row, params};

use crate::{
    error::WeatherError,
    model::{NewWeatherRecord, WeatherRecord},
};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS weather_logs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        city TEXT NOT NULL,
        temperature REAL NOT NULL,
        humidity INTEGER NOT NULL,
        weather_condition TEXT NOT NULL,
        timestamp TEXT NOT NULL,
        api_response TEXT NOT NULL
    )";

#[derive(Debug, Clone)]
pub struct WeatherStore {
    path: PathBuf,
}

impl WeatherStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the database file and table if missing. Safe to call repeatedly.
    pub fn initialize(&self) -> Result<(), WeatherError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|err| WeatherError::StorageIo(parent.to_path_buf(), err))?;
        }

        let conn = self.open("initialize the database")?;
        conn.execute(CREATE_TABLE, [])
            .map_err(WeatherError::storage("create the weather_logs table"))?;

        tracing::debug!(path = %self.path.display(), "weather log initialized");
        Ok(())
    }

    /// Insert one row stamped with the current local time.
    pub fn append(&self, record: &NewWeatherRecord) -> Result<i64, WeatherError> {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.append_at(record, &timestamp)
    }

    /// Insert one row with an explicit timestamp string.
    pub fn append_at(&self, record: &NewWeatherRecord, timestamp: &str) -> Result<i64, WeatherError> {
        let conn = self.open("log weather data")?;

        conn.execute(
            "INSERT INTO weather_logs
                (city, temperature, humidity, weather_condition, timestamp, api_response)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.city,
                record.temperature,
                record.humidity,
                record.condition,
                timestamp,
                record.api_response,
            ],
        )
        .map_err(WeatherError::storage("log weather data"))?;

        let id = conn.last_insert_rowid();
        tracing::info!(id, city = %record.city, "weather record appended");
        Ok(id)
    }

    /// Up to `limit` rows, newest first. Rows written within the same second
    /// come back in reverse insertion order.
    pub fn recent(&self, limit: usize) -> Result<Vec<WeatherRecord>, WeatherError> {
        let conn = self.open("read weather logs")?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let mut stmt = conn
            .prepare(
                "SELECT id, city, temperature, humidity, weather_condition, timestamp, api_response
                 FROM weather_logs
                 ORDER BY timestamp DESC, id DESC
                 LIMIT ?1",
            )
            .map_err(WeatherError::storage("read weather logs"))?;

        let rows = stmt
            .query_map([limit], record_from_row)
            .map_err(WeatherError::storage("read weather logs"))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(WeatherError::storage("read weather logs"))
    }

    pub fn count(&self) -> Result<u64, WeatherError> {
        let conn = self.open("count weather logs")?;

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM weather_logs", [], |row| row.get(0))
            .map_err(WeatherError::storage("count weather logs"))?;

        Ok(count.max(0) as u64)
    }

    /// Delete every row. Confirmation is the caller's job.
    pub fn clear(&self) -> Result<u64, WeatherError> {
        let conn = self.open("clear weather logs")?;

        let deleted = conn
            .execute("DELETE FROM weather_logs", [])
            .map_err(WeatherError::storage("clear weather logs"))?;

        tracing::info!(deleted, "weather log cleared");
        Ok(deleted as u64)
    }

    fn open(&self, operation: &'static str) -> Result<Connection, WeatherError> {
        Connection::open(&self.path).map_err(WeatherError::storage(operation))
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<WeatherRecord> {
    Ok(WeatherRecord {
        id: row.get(0)?,
        city: row.get(1)?,
        temperature: row.get(2)?,
        humidity: row.get(3)?,
        condition: row.get(4)?,
        timestamp: row.get(5)?,
        api_response: row.get(6)?,
    })
}
