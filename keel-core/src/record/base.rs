//! Base implementation of records.
use crate::error::KeelError;
use chrono::prelude::{DateTime, Local};
use std::collections::{
    hash_map::{IntoIter, Iter, Keys},
    HashMap,
};

/// Represents possible types of values that can be stored in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// A single floating-point value, typically used for metrics like loss.
    Scalar(f32),

    /// A timestamp with local timezone.
    DateTime(DateTime<Local>),

    /// A 1-dimensional array of floating-point values.
    Array1(Vec<f32>),

    /// A text value.
    String(String),
}

impl RecordValue {
    /// Returns the value formatted as a single CSV cell.
    ///
    /// Elements of [`RecordValue::Array1`] are separated by spaces.
    pub fn to_cell(&self) -> String {
        match self {
            Self::Scalar(v) => format!("{}", v),
            Self::DateTime(v) => v.to_rfc3339(),
            Self::Array1(v) => v
                .iter()
                .map(|e| format!("{}", e))
                .collect::<Vec<_>>()
                .join(" "),
            Self::String(s) => s.clone(),
        }
    }
}

/// A container for storing key-value pairs of various data types.
///
/// # Examples
///
/// ```rust
/// use keel_core::record::{Record, RecordValue};
///
/// let mut record = Record::from_scalar("QfLoss", 0.5);
/// record.insert("PolLoss", RecordValue::Scalar(-1.2));
/// assert_eq!(record.get_scalar("QfLoss").unwrap(), 0.5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Creates a record containing a single scalar value.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        Self(HashMap::from([(name.into(), RecordValue::Scalar(value))]))
    }

    /// Creates a record from a slice of key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Returns an iterator over the keys in the record.
    pub fn keys(&self) -> Keys<String, RecordValue> {
        self.0.keys()
    }

    /// Inserts a key-value pair into the record.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Returns an iterator over the key-value pairs in the record.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Returns an iterator that consumes the record.
    pub fn into_iter_in_record(self) -> IntoIter<String, RecordValue> {
        self.0.into_iter()
    }

    /// Gets a reference to the value associated with the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Merges two records, consuming both.
    ///
    /// If both records contain the same key, the value of `record` wins.
    pub fn merge(self, record: Record) -> Self {
        Record(self.0.into_iter().chain(record.0).collect())
    }

    /// Merges another record into this one in place.
    pub fn merge_inplace(&mut self, record: Record) {
        for (k, v) in record.into_iter_in_record() {
            self.0.insert(k, v);
        }
    }

    /// Gets a scalar value from the record.
    pub fn get_scalar(&self, k: &str) -> Result<f32, KeelError> {
        match self.0.get(k) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            Some(_) => Err(KeelError::RecordValueTypeError("Scalar".to_string())),
            None => Err(KeelError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a 1-dimensional array from the record.
    pub fn get_array1(&self, k: &str) -> Result<Vec<f32>, KeelError> {
        match self.0.get(k) {
            Some(RecordValue::Array1(v)) => Ok(v.clone()),
            Some(_) => Err(KeelError::RecordValueTypeError("Array1".to_string())),
            None => Err(KeelError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a string value from the record.
    pub fn get_string(&self, k: &str) -> Result<String, KeelError> {
        match self.0.get(k) {
            Some(RecordValue::String(s)) => Ok(s.clone()),
            Some(_) => Err(KeelError::RecordValueTypeError("String".to_string())),
            None => Err(KeelError::RecordKeyError(k.to_string())),
        }
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks if the record is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overwrites() {
        let r1 = Record::from_slice(&[
            ("a", RecordValue::Scalar(1.0)),
            ("b", RecordValue::Scalar(2.0)),
        ]);
        let r2 = Record::from_scalar("b", 3.0);
        let r = r1.merge(r2);
        assert_eq!(r.get_scalar("a").unwrap(), 1.0);
        assert_eq!(r.get_scalar("b").unwrap(), 3.0);
    }

    #[test]
    fn test_get_errors() {
        let mut r = Record::from_scalar("a", 1.0);
        r.insert("s", RecordValue::String("x".into()));
        assert!(matches!(
            r.get_scalar("missing"),
            Err(KeelError::RecordKeyError(_))
        ));
        assert!(matches!(
            r.get_scalar("s"),
            Err(KeelError::RecordValueTypeError(_))
        ));
        assert_eq!(r.get_string("s").unwrap(), "x");

        r.insert("v", RecordValue::Array1(vec![1.0, 2.0]));
        assert_eq!(r.get_array1("v").unwrap(), vec![1.0, 2.0]);
        assert!(matches!(
            r.get_array1("a"),
            Err(KeelError::RecordValueTypeError(_))
        ));
    }

    #[test]
    fn test_to_cell() {
        assert_eq!(RecordValue::Scalar(0.5).to_cell(), "0.5");
        assert_eq!(RecordValue::Array1(vec![1.0, -2.5]).to_cell(), "1 -2.5");
    }
}
