//! One user action at a time: look up, display, log, list, summarize, clear.
//!
//! Every failure is printed where it happens and reported back as `false`;
//! only a failing output sink surfaces as an `Err`.

use std::{fmt, io::Write};

use chrono::Local;

use crate::{
    error::WeatherError,
    provider::WeatherProvider,
    report::{LogTable, StatisticsReport, WeatherReport},
    stats::LogStatistics,
    store::{TIMESTAMP_FORMAT, WeatherStore},
};

/// Rows shown by [`WeatherSession::view_recent`].
pub const VIEW_LIMIT: usize = 20;

/// Rows considered by [`WeatherSession::show_statistics`].
pub const STATS_LIMIT: usize = 1000;

/// Split a comma separated list, trimming names and dropping empty ones.
pub fn parse_city_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|city| !city.is_empty())
        .map(str::to_string)
        .collect()
}

/// Only an explicit `yes` (any case) clears the log.
pub fn confirmation_accepted(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("yes")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MultiSummary {
    pub succeeded: usize,
    pub attempted: usize,
}

impl fmt::Display for MultiSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} out of {} cities processed successfully!",
            self.succeeded, self.attempted
        )
    }
}

#[derive(Debug)]
pub struct WeatherSession<P, W> {
    provider: P,
    store: WeatherStore,
    out: W,
}

impl<P: WeatherProvider, W: Write> WeatherSession<P, W> {
    pub fn new(provider: P, store: WeatherStore, out: W) -> Self {
        Self { provider, store, out }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn store(&self) -> &WeatherStore {
        &self.store
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Look up one city, print the report and log it.
    ///
    /// Nothing is logged unless the lookup produced every required field.
    pub async fn process_city(&mut self, name: &str) -> std::io::Result<bool> {
        let city = name.trim();
        if city.is_empty() {
            writeln!(self.out, "City name cannot be empty!")?;
            return Ok(false);
        }

        writeln!(self.out, "Fetching weather data for: {city}")?;

        let weather = match self.provider.current_weather(city).await {
            Ok(weather) => weather,
            Err(err) => {
                self.report_lookup_failure(city, &err)?;
                return Ok(false);
            }
        };

        let fetched_at = Local::now().format(TIMESTAMP_FORMAT).to_string();
        write!(self.out, "{}", WeatherReport { city, weather: &weather, fetched_at: &fetched_at })?;

        match self.store.append(&weather.to_record(city)) {
            Ok(_) => {
                writeln!(self.out, "Weather data for {city} logged successfully!")?;
                Ok(true)
            }
            Err(err) => {
                tracing::warn!(city, error = %err, "failed to log weather data");
                writeln!(self.out, "{err}")?;
                Ok(false)
            }
        }
    }

    fn report_lookup_failure(&mut self, city: &str, err: &WeatherError) -> std::io::Result<()> {
        writeln!(self.out, "{err}")?;
        if let Some(hint) = err.hint() {
            writeln!(self.out, "Suggestion: {hint}")?;
        }
        writeln!(self.out, "Failed to get weather data for {city}")
    }

    /// Process every city of a comma separated list in turn.
    pub async fn process_multiple(&mut self, input: &str) -> std::io::Result<MultiSummary> {
        let cities = parse_city_list(input);

        if cities.is_empty() {
            writeln!(self.out, "No valid city names found!")?;
            return Ok(MultiSummary::default());
        }

        writeln!(self.out, "Fetching weather for {} cities...", cities.len())?;

        let mut summary = MultiSummary { succeeded: 0, attempted: cities.len() };
        for city in &cities {
            if self.process_city(city).await? {
                summary.succeeded += 1;
            }
        }

        writeln!(self.out)?;
        writeln!(self.out, "Summary: {summary}")?;
        Ok(summary)
    }

    /// Print the most recent rows and the total count.
    pub fn view_recent(&mut self) -> std::io::Result<bool> {
        let loaded = self.store.recent(VIEW_LIMIT).and_then(|rows| Ok((rows, self.store.count()?)));

        match loaded {
            Ok((rows, _)) if rows.is_empty() => {
                writeln!(self.out, "No weather logs found in the database!")?;
                Ok(true)
            }
            Ok((rows, total)) => {
                write!(self.out, "{}", LogTable { records: &rows, total })?;
                Ok(true)
            }
            Err(err) => {
                writeln!(self.out, "Error retrieving logs: {err}")?;
                Ok(false)
            }
        }
    }

    pub fn show_statistics(&mut self) -> std::io::Result<bool> {
        let rows = match self.store.recent(STATS_LIMIT) {
            Ok(rows) => rows,
            Err(err) => {
                writeln!(self.out, "Error generating statistics: {err}")?;
                return Ok(false);
            }
        };

        match LogStatistics::from_records(&rows) {
            Some(stats) => write!(self.out, "{}", StatisticsReport(&stats))?,
            None => writeln!(self.out, "No data available for statistics.")?,
        }
        Ok(true)
    }

    /// Clear the log if `confirmation` is an explicit yes.
    pub fn clear_all(&mut self, confirmation: &str) -> std::io::Result<bool> {
        if !confirmation_accepted(confirmation) {
            writeln!(self.out, "Operation cancelled.")?;
            return Ok(false);
        }

        match self.store.clear() {
            Ok(deleted) => {
                writeln!(self.out, "All logs cleared successfully! ({deleted} entries removed)")?;
                Ok(true)
            }
            Err(err) => {
                writeln!(self.out, "Failed to clear logs: {err}")?;
                Ok(false)
            }
        }
    }

    pub fn total_logged(&self) -> Result<u64, WeatherError> {
        self.store.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_list_drops_blank_entries() {
        assert_eq!(parse_city_list("Paris, , Tokyo"), vec!["Paris", "Tokyo"]);
        assert_eq!(parse_city_list("  Rome  "), vec!["Rome"]);
        assert!(parse_city_list(" , ,, ").is_empty());
        assert!(parse_city_list("").is_empty());
    }

    #[test]
    fn confirmation_requires_exact_yes() {
        assert!(confirmation_accepted("yes"));
        assert!(confirmation_accepted(" YES "));
        assert!(confirmation_accepted("Yes"));
        assert!(!confirmation_accepted("y"));
        assert!(!confirmation_accepted("yes please"));
        assert!(!confirmation_accepted(""));
    }

    #[test]
    fn summary_reads_as_ratio() {
        let summary = MultiSummary { succeeded: 1, attempted: 2 };
        assert_eq!(summary.to_string(), "1 out of 2 cities processed successfully!");
    }
}
