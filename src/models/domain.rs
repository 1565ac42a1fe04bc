use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::core::error::MatchError;

/// Stable identifier of a record within its population
pub type RecordId = String;

/// A single attribute value on a record
///
/// Values are heterogeneous, mirroring the columns of a spreadsheet row.
/// Equality and ordering are total so values can take part in partition keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl AttributeValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            AttributeValue::Null => 0,
            AttributeValue::Bool(_) => 1,
            AttributeValue::Number(_) => 2,
            AttributeValue::Text(_) => 3,
        }
    }
}

impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AttributeValue {}

impl PartialOrd for AttributeValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AttributeValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (AttributeValue::Null, AttributeValue::Null) => Ordering::Equal,
            (AttributeValue::Bool(a), AttributeValue::Bool(b)) => a.cmp(b),
            (AttributeValue::Number(a), AttributeValue::Number(b)) => a.total_cmp(b),
            (AttributeValue::Text(a), AttributeValue::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Null => write!(f, "null"),
            AttributeValue::Bool(b) => write!(f, "{}", b),
            AttributeValue::Number(n) => write!(f, "{}", n),
            AttributeValue::Text(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Number(value as f64)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

/// One row of either population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Record {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }
}

/// Ordered, uniquely indexed collection of records
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Population {
    records: Vec<Record>,
}

impl Population {
    /// Build a population, rejecting duplicate ids
    pub fn new(records: Vec<Record>) -> Result<Self, MatchError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id.as_str()) {
                return Err(MatchError::DuplicateRecordId {
                    id: record.id.clone(),
                });
            }
        }
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, position: usize) -> Option<&Record> {
        self.records.get(position)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.id.as_str())
    }

    /// Sub-population made of the records at `positions`, in the given order.
    ///
    /// Ids stay unique because the parent's are.
    pub fn subset(&self, positions: &[usize]) -> Population {
        Population {
            records: positions
                .iter()
                .filter_map(|&p| self.records.get(p).cloned())
                .collect(),
        }
    }
}

/// Tuple of attribute values shared by every record of one partition
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PartitionKey(pub Vec<AttributeValue>);

impl PartitionKey {
    /// Key of `record` over `features`; absent attributes read as null
    pub fn of(record: &Record, features: &[String]) -> Self {
        PartitionKey(
            features
                .iter()
                .map(|f| match record.get(f) {
                    // -0.0 and 0.0 are the same key
                    Some(AttributeValue::Number(n)) if *n == 0.0 => AttributeValue::Number(0.0),
                    Some(value) => value.clone(),
                    None => AttributeValue::Null,
                })
                .collect(),
        )
    }
}

impl std::hash::Hash for AttributeValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            AttributeValue::Null => {}
            AttributeValue::Bool(b) => b.hash(state),
            AttributeValue::Number(n) => n.to_bits().hash(state),
            AttributeValue::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, ")")
    }
}

/// Dense cost table labelled by record (or group) ids
///
/// `values[r][c]` is the cost of pairing row `r` with column `c`; smaller
/// means more similar.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    pub row_ids: Vec<String>,
    pub column_ids: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CostMatrix {
    pub fn rows(&self) -> usize {
        self.row_ids.len()
    }

    pub fn columns(&self) -> usize {
        self.column_ids.len()
    }

    #[inline]
    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.values[row][column]
    }

    /// Copy of the matrix restricted to the given column positions
    pub fn select_columns(&self, columns: &[usize]) -> CostMatrix {
        CostMatrix {
            row_ids: self.row_ids.clone(),
            column_ids: columns.iter().map(|&c| self.column_ids[c].clone()).collect(),
            values: self
                .values
                .iter()
                .map(|row| columns.iter().map(|&c| row[c]).collect())
                .collect(),
        }
    }
}
