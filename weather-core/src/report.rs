//! Human-readable renderings of lookups, log listings and statistics.

use std::fmt;

use crate::{
    model::{CurrentWeather, WeatherRecord},
    stats::LogStatistics,
};

const WIDE_RULE: usize = 90;
const RULE: usize = 60;
const NARROW_RULE: usize = 50;

/// How many cities the frequency list shows.
pub const TOP_CITIES: usize = 10;

struct Rule(char, usize);

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.1 {
            write!(f, "{}", self.0)?;
        }
        Ok(())
    }
}

/// Keep same-day rows compact: `HH:MM` when the timestamp carries a date.
pub fn display_time(timestamp: &str) -> &str {
    if timestamp.chars().count() > 16 {
        timestamp.get(11..16).unwrap_or(timestamp)
    } else {
        timestamp
    }
}

/// Full report for one lookup. The same inputs always render the same text.
#[derive(Debug)]
pub struct WeatherReport<'a> {
    pub city: &'a str,
    pub weather: &'a CurrentWeather,
    pub fetched_at: &'a str,
}

impl fmt::Display for WeatherReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w = self.weather;

        writeln!(f)?;
        writeln!(f, "{}", Rule('=', RULE))?;
        writeln!(f, "  WEATHER INFORMATION FOR {}", self.city.to_uppercase())?;
        writeln!(f, "{}", Rule('=', RULE))?;
        writeln!(f, "City: {}", self.city)?;
        if w.location_name != self.city {
            writeln!(f, "Reported as: {}", w.location_name)?;
        }
        writeln!(f, "Temp: {:.1}°C", w.temperature_c)?;
        writeln!(f, "Feels like: {:.1}°C", w.feels_like_c)?;
        writeln!(f, "Humidity: {}%", w.humidity_pct)?;
        match w.pressure_hpa {
            Some(p) => writeln!(f, "Pressure: {p} hPa")?,
            None => writeln!(f, "Pressure: N/A")?,
        }
        match w.wind_speed_mps {
            Some(s) => writeln!(f, "Wind Speed: {s} m/s")?,
            None => writeln!(f, "Wind Speed: N/A")?,
        }
        writeln!(f, "Condition: {}", w.condition_title())?;
        writeln!(f, "Fetched at: {}", self.fetched_at)?;
        writeln!(f, "{}", Rule('=', RULE))
    }
}

/// Fixed-width listing of recent rows.
#[derive(Debug)]
pub struct LogTable<'a> {
    pub records: &'a [WeatherRecord],
    pub total: u64,
}

impl fmt::Display for LogTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", Rule('=', WIDE_RULE))?;
        writeln!(
            f,
            " WEATHER DATA LOGS (Showing latest {} of {} total entries)",
            self.records.len(),
            self.total
        )?;
        writeln!(f, "{}", Rule('=', WIDE_RULE))?;
        writeln!(
            f,
            "{:<3} {:<15} {:<10} {:<9} {:<18} Time",
            "ID", "City", "Temp (°C)", "Humidity", "Condition"
        )?;
        writeln!(f, "{}", Rule('-', WIDE_RULE))?;

        for r in self.records {
            writeln!(
                f,
                "{:<3} {:<15} {:<10.1} {:<9} {:<18} {}",
                r.id,
                r.city,
                r.temperature,
                r.humidity,
                r.condition,
                display_time(&r.timestamp)
            )?;
        }

        writeln!(f, "{}", Rule('=', WIDE_RULE))
    }
}

#[derive(Debug)]
pub struct StatisticsReport<'a>(pub &'a LogStatistics);

impl fmt::Display for StatisticsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.0;

        writeln!(f)?;
        writeln!(f, "{}", Rule('=', NARROW_RULE))?;
        writeln!(f, " WEATHER DATA STATISTICS")?;
        writeln!(f, "{}", Rule('=', NARROW_RULE))?;
        writeln!(f, "Total weather entries: {}", stats.total_entries)?;
        writeln!(f, "Different cities tracked: {}", stats.distinct_cities())?;
        let (city, count) = stats.most_frequent().unwrap_or(("None", 0));
        writeln!(f, "Most searched city: {city} ({count} times)")?;
        writeln!(f, "Average temperature: {:.1}°C", stats.average_temperature)?;
        writeln!(f, "Average humidity: {:.1}%", stats.average_humidity)?;
        writeln!(f, "{}", Rule('=', NARROW_RULE))?;

        writeln!(f)?;
        writeln!(f, " Cities frequency:")?;
        for (city, count) in stats.top_cities(TOP_CITIES) {
            writeln!(f, "  {city}: {count} entries")?;
        }
        Ok(())
    }
}
