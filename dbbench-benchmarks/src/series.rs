//! Normalized series and run summaries
//!
//! Every payload shape is reduced to the same category/engine-value table.
//! An engine value is either a number or absent; absent is never the same
//! thing as zero and is kept distinct all the way into the chart.

use dbbench_common::Engine;
use serde::{Deserialize, Serialize};

/// Per-engine values of one category
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineValues {
    pub engine_a: Option<f64>,
    pub engine_b: Option<f64>,
}

impl EngineValues {
    pub fn new(engine_a: Option<f64>, engine_b: Option<f64>) -> Self {
        Self { engine_a, engine_b }
    }

    pub fn absent() -> Self {
        Self::default()
    }

    pub fn get(&self, engine: Engine) -> Option<f64> {
        match engine {
            Engine::A => self.engine_a,
            Engine::B => self.engine_b,
        }
    }

    pub fn set(&mut self, engine: Engine, value: Option<f64>) {
        match engine {
            Engine::A => self.engine_a = value,
            Engine::B => self.engine_b = value,
        }
    }

    /// Only `engine` carries a value, the other slot stays absent
    pub fn only(engine: Engine, value: Option<f64>) -> Self {
        let mut values = Self::absent();
        values.set(engine, value);
        values
    }
}

/// One category of a normalized series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesEntry {
    pub category: String,
    pub values: EngineValues,
}

impl SeriesEntry {
    pub fn new(category: impl Into<String>, values: EngineValues) -> Self {
        Self {
            category: category.into(),
            values,
        }
    }
}

/// Ordered category/engine-value table produced by extraction.
///
/// Order is significant: it becomes the horizontal axis of a snapshot chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedSeries {
    entries: Vec<SeriesEntry>,
}

impl NormalizedSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: SeriesEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[SeriesEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.category.as_str())
    }

    /// Values of one engine in category order
    pub fn values_for(&self, engine: Engine) -> Vec<Option<f64>> {
        self.entries.iter().map(|e| e.values.get(engine)).collect()
    }

    /// Average of every present value of `engine`, absent if there is none
    pub fn average(&self, engine: Engine) -> Option<f64> {
        mean(self.entries.iter().filter_map(|e| e.values.get(engine)))
    }

    /// Collapse the series into the single point a trend chart grows by.
    ///
    /// A one-entry series is its own point. Longer series join their
    /// categories and average each engine over the present values.
    pub fn trend_point(&self) -> Option<SeriesEntry> {
        match self.entries.as_slice() {
            [] => None,
            [single] => Some(single.clone()),
            entries => {
                let category = entries
                    .iter()
                    .map(|e| e.category.as_str())
                    .collect::<Vec<_>>()
                    .join(" / ");
                Some(SeriesEntry::new(
                    category,
                    EngineValues::new(self.average(Engine::A), self.average(Engine::B)),
                ))
            }
        }
    }
}

impl FromIterator<SeriesEntry> for NormalizedSeries {
    fn from_iter<I: IntoIterator<Item = SeriesEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Headline value per engine for the latest run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub last_engine_a_time: Option<f64>,
    pub last_engine_b_time: Option<f64>,
}

impl RunSummary {
    /// Both headline values unavailable
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn new(last_engine_a_time: Option<f64>, last_engine_b_time: Option<f64>) -> Self {
        Self {
            last_engine_a_time,
            last_engine_b_time,
        }
    }

    /// Average each engine across the series entries that carry a value
    pub fn from_series(series: &NormalizedSeries) -> Self {
        Self::new(series.average(Engine::A), series.average(Engine::B))
    }

    pub fn get(&self, engine: Engine) -> Option<f64> {
        match engine {
            Engine::A => self.last_engine_a_time,
            Engine::B => self.last_engine_b_time,
        }
    }

    pub fn as_values(&self) -> EngineValues {
        EngineValues::new(self.last_engine_a_time, self.last_engine_b_time)
    }
}

pub(crate) fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> NormalizedSeries {
        vec![
            SeriesEntry::new("Without index", EngineValues::only(Engine::B, Some(12.0))),
            SeriesEntry::new("With index", EngineValues::only(Engine::B, Some(7.0))),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_average_skips_absent_values() {
        let s = series();
        assert_eq!(s.average(Engine::A), None);
        assert_eq!(s.average(Engine::B), Some(9.5));
    }

    #[test]
    fn test_summary_keeps_absent_as_unavailable() {
        let summary = RunSummary::from_series(&series());
        assert_eq!(summary.last_engine_a_time, None);
        assert_eq!(summary.last_engine_b_time, Some(9.5));
    }

    #[test]
    fn test_trend_point_collapses_multi_entry_series() {
        let point = series().trend_point().unwrap();
        assert_eq!(point.category, "Without index / With index");
        assert_eq!(point.values, EngineValues::new(None, Some(9.5)));

        assert!(NormalizedSeries::new().trend_point().is_none());
    }

    #[test]
    fn test_values_for_preserves_order() {
        assert_eq!(series().values_for(Engine::B), vec![Some(12.0), Some(7.0)]);
        assert_eq!(series().values_for(Engine::A), vec![None, None]);
    }
}
