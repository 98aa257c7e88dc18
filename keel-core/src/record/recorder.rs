use super::Record;
use anyhow::Result;

/// Writes records to an output destination.
pub trait Recorder {
    /// Writes a record.
    fn write(&mut self, record: Record) -> Result<()>;

    /// Stores a record to be aggregated at the next [`Recorder::flush`].
    fn store(&mut self, record: Record);

    /// Writes values aggregated from the stored records.
    ///
    /// `step` is added to the aggregated record, keyed by the name the recorder
    /// uses for its step column.
    fn flush(&mut self, step: i64) -> Result<()>;
}
