use indexmap::IndexMap;
use log::{Log, Metadata, Record as LogRecord};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Simple logger implementation writing diagnostics to stderr
pub struct SimpleLogger;

impl Log for SimpleLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &LogRecord) {
        eprintln!("[{}] {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

/// One field value of a record.
///
/// Input JSON is heterogeneous (strings, numbers, the occasional nested value),
/// and the corrector can turn an unparseable numeric string into an explicit
/// not-a-number sentinel. Every exporter renders each variant explicitly instead
/// of relying on an implicit to-string coercion.
///
/// The untagged representation keeps the JSON shape of the input: `Text` is a
/// string, `Number` a number, `NotANumber` serializes as `null` (like the
/// original data source did for failed conversions) and deserializes back from
/// `null`, and `Other` covers booleans, arrays and objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(serde_json::Number),
    NotANumber,
    Other(serde_json::Value),
}

impl FieldValue {
    /// Renders the value as human-readable text for the CSV and PDF exporters.
    ///
    /// `Text` is passed through as-is, `Number` uses its decimal display,
    /// `NotANumber` renders as `NaN`, and `Other` falls back to compact JSON.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Number(number) => number.to_string(),
            FieldValue::NotANumber => "NaN".to_string(),
            FieldValue::Other(value) => value.to_string(),
        }
    }
}

/// One flat key-value entry in a dataset.
///
/// Field order is preserved from the input file through every output, which is
/// what lets the CSV exporter derive its column order from the first record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub fields: IndexMap<String, FieldValue>,
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Record {
            fields: iter.into_iter().collect(),
        }
    }
}

/// An ordered sequence of records, read from one input file.
pub type Dataset = Vec<Record>;

/// Closed tag selecting which field-correction rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    Vehicles,
    Brands,
}

/// Per-entry progress through the pipeline.
///
/// `Aborted` is terminal and entered when the loader returns no data; exporter
/// failures do not demote a reached `Exported` state, they only degrade the
/// output to a partial set of files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Loaded,
    Corrected,
    Exported,
    Aborted,
}

/// One unit of batch work: an input file, the rules to apply, a report title.
#[derive(Debug, Clone)]
pub struct JobEntry {
    pub input: PathBuf,
    pub kind: DatasetKind,
    pub title: String,
}

impl JobEntry {
    pub fn new(input: impl Into<PathBuf>, kind: DatasetKind, title: &str) -> Self {
        Self {
            input: input.into(),
            kind,
            title: title.to_string(),
        }
    }

    /// The fixed batch this tool exists for: two broken database dumps, one of
    /// vehicles and one of brands, expected next to the working directory.
    pub fn default_batch() -> Vec<JobEntry> {
        vec![
            JobEntry::new(
                "broken_database_1.json",
                DatasetKind::Vehicles,
                "Relatório de Veículos",
            ),
            JobEntry::new(
                "broken_database_2.json",
                DatasetKind::Brands,
                "Relatório de Marcas",
            ),
        ]
    }
}
