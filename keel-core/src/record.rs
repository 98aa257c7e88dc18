//! Types and traits for recording training metrics.
//!
//! * [`Record`] - A container for key-value pairs of various data types
//! * [`RecordValue`] - An enum representing the types of values that can be stored
//! * [`Recorder`] - A trait for writing records to an output destination
//! * [`RecordStorage`] - Aggregates a number of records into summary statistics
//! * [`CsvRecorder`] - Appends records as rows of a CSV file
//! * [`NullRecorder`] - Discards all records
//!
//! # Basic Usage
//!
//! ```rust
//! use keel_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("TotalStep", RecordValue::Scalar(200.0));
//! record.insert("Obs", RecordValue::Array1(vec![1.0, 0.0, -0.5]));
//! assert_eq!(record.get_scalar("TotalStep").unwrap(), 200.0);
//! ```
mod base;
mod csv_recorder;
mod null_recorder;
mod recorder;
mod storage;
pub use base::{Record, RecordValue};
pub use csv_recorder::CsvRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
pub use storage::RecordStorage;
pub(crate) use storage::misc_stat;
