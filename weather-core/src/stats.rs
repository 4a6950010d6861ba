use std::collections::HashMap;

use crate::model::WeatherRecord;

/// Aggregates over a slice of log rows.
#[derive(Debug, Clone, PartialEq)]
pub struct LogStatistics {
    pub total_entries: usize,
    /// Entries per city, in order of first appearance.
    pub city_frequency: Vec<(String, usize)>,
    pub average_temperature: f64,
    pub average_humidity: f64,
}

impl LogStatistics {
    /// `None` when there is nothing to summarize.
    pub fn from_records(records: &[WeatherRecord]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }

        let mut city_frequency: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut temp_sum = 0.0;
        let mut humidity_sum = 0.0;

        for record in records {
            match index.get(record.city.as_str()) {
                Some(&i) => city_frequency[i].1 += 1,
                None => {
                    index.insert(&record.city, city_frequency.len());
                    city_frequency.push((record.city.clone(), 1));
                }
            }

            temp_sum += record.temperature;
            humidity_sum += f64::from(record.humidity);
        }

        let total = records.len() as f64;

        Some(Self {
            total_entries: records.len(),
            city_frequency,
            average_temperature: temp_sum / total,
            average_humidity: humidity_sum / total,
        })
    }

    pub fn distinct_cities(&self) -> usize {
        self.city_frequency.len()
    }

    /// City with the most entries; ties go to the one seen first.
    pub fn most_frequent(&self) -> Option<(&str, usize)> {
        self.city_frequency.iter().fold(None, |best, (city, count)| match best {
            Some((_, best_count)) if best_count >= *count => best,
            _ => Some((city.as_str(), *count)),
        })
    }

    /// Up to `n` cities by descending count, ties kept in first-seen order.
    pub fn top_cities(&self, n: usize) -> Vec<(&str, usize)> {
        let mut ranked: Vec<_> =
            self.city_frequency.iter().map(|(city, count)| (city.as_str(), *count)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}
