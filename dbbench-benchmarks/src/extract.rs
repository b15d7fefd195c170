//! Result extraction
//!
//! Turns a raw payload into a [`NormalizedSeries`] using the shape family the
//! catalog fixed for its kind. Extraction only fails when the payload is not
//! a record at all; anything else that looks wrong is reported as a
//! [`DataQualityIssue`] and the affected slot degrades, while every
//! well-formed entry is kept.

use dbbench_common::{Engine, EngineProfile, EngineProfiles};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

use crate::catalog::{FieldPair, ShapeFamily};
use crate::series::{mean, EngineValues, NormalizedSeries, RunSummary, SeriesEntry};
use crate::source::RawResult;

/// Fatal extraction failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("payload is not a JSON object (found {found})")]
    NotARecord { found: &'static str },
}

/// Non-fatal problem found while extracting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum DataQualityIssue {
    MissingField { category: String, field: String },
    NonNumericField {
        category: String,
        field: String,
        found: &'static str,
    },
    MalformedTrial { category: String, found: &'static str },
}

impl fmt::Display for DataQualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataQualityIssue::MissingField { category, field } => {
                write!(f, "{}: field '{}' is missing", category, field)
            }
            DataQualityIssue::NonNumericField { category, field, found } => {
                write!(f, "{}: field '{}' is {}, expected a number", category, field, found)
            }
            DataQualityIssue::MalformedTrial { category, found } => {
                write!(f, "{}: trial is {}, expected an object", category, found)
            }
        }
    }
}

/// Output of a successful extraction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub series: NormalizedSeries,
    pub issues: Vec<DataQualityIssue>,
}

impl Extraction {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Extract a normalized series from `raw` according to `shape`
pub fn extract(shape: &ShapeFamily, raw: &RawResult) -> Result<Extraction, ExtractError> {
    let record = as_record(raw)?;
    let mut reader = FieldReader::default();

    let series: NormalizedSeries = match shape {
        ShapeFamily::KeyedTrials { fields } => record
            .iter()
            .map(|(trial, value)| match value {
                Value::Object(trial_record) => SeriesEntry::new(
                    trial.as_str(),
                    reader.pair(trial_record, trial, fields, Some(0.0)),
                ),
                other => {
                    reader.issues.push(DataQualityIssue::MalformedTrial {
                        category: trial.clone(),
                        found: json_type(other),
                    });
                    SeriesEntry::new(trial.as_str(), EngineValues::absent())
                }
            })
            .collect(),
        ShapeFamily::PrefixAggregated { metrics } => metrics
            .iter()
            .map(|metric| {
                SeriesEntry::new(
                    metric.label,
                    reader.pair(record, metric.label, &metric.fields, None),
                )
            })
            .collect(),
        ShapeFamily::SinglePair { category, fields } => {
            std::iter::once(SeriesEntry::new(*category, reader.pair(record, category, fields, None)))
                .collect()
        }
        ShapeFamily::AsymmetricEngine { engine, conditions } => conditions
            .iter()
            .map(|condition| {
                let value = reader.value(record, condition.label, condition.field, None);
                SeriesEntry::new(condition.label, EngineValues::only(*engine, value))
            })
            .collect(),
    };

    Ok(Extraction {
        series,
        issues: reader.issues,
    })
}

/// Derive the headline values of a run.
///
/// Prefix-aggregated payloads are averaged over every numeric field whose
/// name matches an engine's prefix, independent of the fixed chart metrics.
/// Every other family averages the extracted series.
pub fn summarize(
    shape: &ShapeFamily,
    raw: &RawResult,
    series: &NormalizedSeries,
    engines: &EngineProfiles,
) -> RunSummary {
    match (shape, raw) {
        (ShapeFamily::PrefixAggregated { .. }, Value::Object(record)) => RunSummary::new(
            average_by_prefix(record, engines.get(Engine::A)),
            average_by_prefix(record, engines.get(Engine::B)),
        ),
        _ => RunSummary::from_series(series),
    }
}

/// Average of every numeric field that belongs to `profile`
pub fn average_by_prefix(record: &Map<String, Value>, profile: &EngineProfile) -> Option<f64> {
    mean(
        record
            .iter()
            .filter(|(key, _)| profile.matches(key))
            .filter_map(|(_, value)| value.as_f64()),
    )
}

fn as_record(raw: &RawResult) -> Result<&Map<String, Value>, ExtractError> {
    match raw {
        Value::Object(record) => Ok(record),
        other => Err(ExtractError::NotARecord {
            found: json_type(other),
        }),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Default)]
struct FieldReader {
    issues: Vec<DataQualityIssue>,
}

impl FieldReader {
    fn pair(
        &mut self,
        record: &Map<String, Value>,
        category: &str,
        fields: &FieldPair,
        missing: Option<f64>,
    ) -> EngineValues {
        let mut values = EngineValues::absent();
        for engine in Engine::ALL {
            values.set(engine, self.value(record, category, fields.get(engine), missing));
        }
        values
    }

    /// Read one numeric field; `missing` is substituted when it is absent or null
    fn value(
        &mut self,
        record: &Map<String, Value>,
        category: &str,
        field: &str,
        missing: Option<f64>,
    ) -> Option<f64> {
        match record.get(field) {
            None | Some(Value::Null) => {
                self.issues.push(DataQualityIssue::MissingField {
                    category: category.to_string(),
                    field: field.to_string(),
                });
                missing
            }
            Some(value) => match value.as_f64() {
                Some(number) => Some(number),
                None => {
                    self.issues.push(DataQualityIssue::NonNumericField {
                        category: category.to_string(),
                        field: field.to_string(),
                        found: json_type(value),
                    });
                    None
                }
            },
        }
    }
}
