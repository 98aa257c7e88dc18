use super::{Record, Recorder};
use anyhow::Result;

/// A recorder that ignores any record.
#[derive(Default)]
pub struct NullRecorder {}

impl Recorder for NullRecorder {
    fn write(&mut self, _record: Record) -> Result<()> {
        Ok(())
    }

    fn store(&mut self, _record: Record) {}

    fn flush(&mut self, _step: i64) -> Result<()> {
        Ok(())
    }
}
