use crate::core::MatchError;
use crate::models::{AttributeValue, Population, Record};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when reading or writing tabular datasets
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Row {row} has no '{field}' field")]
    MissingId { row: usize, field: String },

    #[error("Row {row} has an id that is neither a string nor an integer: {value}")]
    InvalidId { row: usize, value: String },

    #[error("Row {row}, attribute '{attribute}': unsupported value {value}")]
    InvalidAttribute {
        row: usize,
        attribute: String,
        value: String,
    },

    #[error("Expected a JSON array of objects")]
    NotATable,

    #[error(transparent)]
    Population(#[from] MatchError),
}

/// Loads populations from JSON tables and writes result tables back out
///
/// A table is a JSON array of flat objects, one per record. `id_field`
/// names the column holding each record's unique identifier.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    id_field: String,
}

impl DatasetStore {
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
        }
    }

    /// Read a population from a JSON file
    pub fn load_population<P: AsRef<Path>>(&self, path: P) -> Result<Population, DatasetError> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let json: Value = serde_json::from_reader(reader)?;
        self.parse_population(json)
    }

    /// Convert an already parsed JSON table into a population
    pub fn parse_population(&self, json: Value) -> Result<Population, DatasetError> {
        let rows = match json {
            Value::Array(rows) => rows,
            _ => return Err(DatasetError::NotATable),
        };

        let mut records = Vec::with_capacity(rows.len());
        for (row, value) in rows.into_iter().enumerate() {
            match value {
                Value::Object(obj) => records.push(self.parse_record(row, obj)?),
                _ => return Err(DatasetError::NotATable),
            }
        }

        tracing::debug!("Parsed {} records", records.len());
        Ok(Population::new(records)?)
    }

    fn parse_record(&self, row: usize, mut obj: Map<String, Value>) -> Result<Record, DatasetError> {
        let id = match obj.remove(&self.id_field) {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) if n.is_i64() || n.is_u64() => n.to_string(),
            Some(other) => {
                return Err(DatasetError::InvalidId {
                    row,
                    value: other.to_string(),
                })
            }
            None => {
                return Err(DatasetError::MissingId {
                    row,
                    field: self.id_field.clone(),
                })
            }
        };

        let mut attributes = BTreeMap::new();
        for (attribute, value) in obj {
            let parsed = parse_attribute(&value).ok_or_else(|| DatasetError::InvalidAttribute {
                row,
                attribute: attribute.clone(),
                value: value.to_string(),
            })?;
            attributes.insert(attribute, parsed);
        }

        Ok(Record { id, attributes })
    }

    /// Write any serializable table as pretty JSON
    pub fn write_table<P, T>(&self, path: P, table: &T) -> Result<(), DatasetError>
    where
        P: AsRef<Path>,
        T: Serialize + ?Sized,
    {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer_pretty(&mut writer, table)?;
        writer.flush()?;
        tracing::info!("Wrote {}", path.as_ref().display());
        Ok(())
    }
}

impl Default for DatasetStore {
    fn default() -> Self {
        Self::new("id")
    }
}

/// Flat JSON value → attribute; arrays of strings become comma-separated tags
fn parse_attribute(value: &Value) -> Option<AttributeValue> {
    match value {
        Value::Null => Some(AttributeValue::Null),
        Value::Bool(b) => Some(AttributeValue::Bool(*b)),
        Value::Number(n) => n.as_f64().map(AttributeValue::Number),
        Value::String(s) => Some(AttributeValue::Text(s.clone())),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(|tags| AttributeValue::Text(tags.join(", "))),
        Value::Object(_) => None,
    }
}
