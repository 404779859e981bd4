//! Record, filter and ordering types shared by record store implementations

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::domain::DomainError;

/// A stored record: a flat JSON object
pub type Record = serde_json::Map<String, Value>;

/// Conjunction of field equality conditions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    /// A filter matching every record
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single equality condition
    pub fn by(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new().eq(field, value)
    }

    /// Add an equality condition (builder pattern)
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Check whether a record satisfies every condition
    pub fn matches(&self, record: &Record) -> bool {
        self.conditions
            .iter()
            .all(|(field, expected)| record.get(field) == Some(expected))
    }

    /// The filter as a JSON object, for stores that support containment queries
    pub fn to_object(&self) -> Record {
        self.conditions.iter().cloned().collect()
    }
}

/// Sort direction for `find_many`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Ordering applied to `find_many` results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Compare two records on the ordering field, honouring the direction.
    /// Records missing the field sort first in ascending order.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let ordering = compare_values(a.get(&self.field), b.get(&self.field));

        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => {
            // RFC 3339 strings with differing fractional precision do not sort lexically
            match (
                DateTime::<FixedOffset>::parse_from_rfc3339(x),
                DateTime::<FixedOffset>::parse_from_rfc3339(y),
            ) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

/// A typed record living in a named collection
pub trait CollectionRecord: Serialize + DeserializeOwned + Sized {
    /// Collection name in the record store
    const COLLECTION: &'static str;

    fn to_record(&self) -> Result<Record, DomainError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(DomainError::internal(format!(
                "Record for '{}' must serialize to an object, got {}",
                Self::COLLECTION,
                other
            ))),
            Err(e) => Err(DomainError::internal(format!(
                "Failed to serialize '{}' record: {}",
                Self::COLLECTION,
                e
            ))),
        }
    }

    fn from_record(record: Record) -> Result<Self, DomainError> {
        serde_json::from_value(Value::Object(record)).map_err(|e| {
            DomainError::storage(format!(
                "Failed to deserialize '{}' record: {}",
                Self::COLLECTION,
                e
            ))
        })
    }
}
