//! Record storage and aggregation.
//!
//! Scalars stored under the same key are summarized as
//! `<key>Average`, `<key>Std`, `<key>Median`, `<key>Min` and `<key>Max`.
//! For other value types, the most recent value is kept.
use super::{Record, RecordValue};
use crate::error::KeelError;
use std::collections::HashSet;
use xxhash_rust::xxh3::Xxh3Builder;

/// A storage of records with aggregation.
#[derive(Default)]
pub struct RecordStorage {
    data: Vec<Record>,
}

fn min(vs: &[f32]) -> f32 {
    vs.iter().copied().fold(f32::INFINITY, f32::min)
}

fn max(vs: &[f32]) -> f32 {
    vs.iter().copied().fold(f32::NEG_INFINITY, f32::max)
}

fn mean(vs: &[f32]) -> f32 {
    vs.iter().sum::<f32>() / vs.len() as f32
}

/// Population standard deviation.
fn std(vs: &[f32]) -> f32 {
    let m = mean(vs);
    (vs.iter().map(|v| (v - m).powi(2)).sum::<f32>() / vs.len() as f32).sqrt()
}

/// Median, averaging the two middle elements for even lengths.
fn median(vs: &[f32]) -> f32 {
    let mut vs = vs.to_vec();
    vs.sort_by(|x, y| x.total_cmp(y));
    let n = vs.len();
    match n % 2 {
        0 => 0.5 * (vs[n / 2 - 1] + vs[n / 2]),
        _ => vs[n / 2],
    }
}

/// Returns summary statistics of `vs` keyed by `key` with suffixes.
///
/// Returns an empty record if `vs` is empty.
pub(crate) fn misc_stat(key: &str, vs: &[f32]) -> Record {
    if vs.is_empty() {
        return Record::empty();
    }
    Record::from_slice(&[
        (format!("{}Average", key), RecordValue::Scalar(mean(vs))),
        (format!("{}Std", key), RecordValue::Scalar(std(vs))),
        (format!("{}Median", key), RecordValue::Scalar(median(vs))),
        (format!("{}Min", key), RecordValue::Scalar(min(vs))),
        (format!("{}Max", key), RecordValue::Scalar(max(vs))),
    ])
}

impl RecordStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self { data: vec![] }
    }

    /// Stores a record.
    pub fn store(&mut self, record: Record) {
        self.data.push(record);
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if no record is stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn get_keys(&self) -> HashSet<String, Xxh3Builder> {
        let mut keys = HashSet::<String, Xxh3Builder>::default();
        for record in self.data.iter() {
            for k in record.keys() {
                keys.insert(k.clone());
            }
        }
        keys
    }

    fn latest(&self, key: &str) -> Option<&RecordValue> {
        self.data.iter().rev().find_map(|record| record.get(key))
    }

    fn scalars(&self, key: &str) -> Result<Vec<f32>, KeelError> {
        self.data
            .iter()
            .filter_map(|record| record.get(key))
            .map(|v| match v {
                RecordValue::Scalar(v) => Ok(*v),
                _ => Err(KeelError::RecordValueTypeError(format!(
                    "Expect Scalar for {}",
                    key
                ))),
            })
            .collect()
    }

    /// Aggregates all stored records and clears the storage.
    pub fn aggregate(&mut self) -> Result<Record, KeelError> {
        let mut record = Record::empty();

        for key in self.get_keys().iter() {
            match self.latest(key) {
                Some(RecordValue::Scalar(..)) => {
                    record.merge_inplace(misc_stat(key, &self.scalars(key)?));
                }
                Some(value) => record.insert(key.clone(), value.clone()),
                None => {}
            }
        }

        self.data.clear();

        Ok(record)
    }
}
