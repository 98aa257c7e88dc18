use super::{Record, RecordStorage, RecordValue, Recorder};
use anyhow::Result;
use log::{info, warn};
use std::{
    fs::File,
    path::{Path, PathBuf},
};

/// Writes records as rows of a CSV file.
///
/// The columns are fixed by the keys of the first record, sorted by name.
/// Missing values in later records are written as empty cells and keys that
/// were not in the first record are dropped.
pub struct CsvRecorder {
    path: PathBuf,
    writer: csv::Writer<File>,
    header: Option<Vec<String>>,
    storage: RecordStorage,
    step_key: String,
}

impl CsvRecorder {
    /// Creates the CSV file at `path`, truncating an existing one.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        info!("Writes progress to {:?}", &path);
        Ok(Self {
            path,
            writer: csv::WriterBuilder::new().from_writer(file),
            header: None,
            storage: RecordStorage::new(),
            step_key: "Iteration".to_string(),
        })
    }

    /// Returns the path of the CSV file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the column names, available after the first record was written.
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }
}

impl Recorder for CsvRecorder {
    fn write(&mut self, record: Record) -> Result<()> {
        if self.header.is_none() {
            let mut keys = record.keys().cloned().collect::<Vec<_>>();
            keys.sort();
            self.writer.write_record(&keys)?;
            self.header = Some(keys);
        }

        let header = match self.header.as_ref() {
            Some(header) => header,
            None => return Ok(()),
        };
        for k in record.keys().filter(|k| !header.contains(k)) {
            warn!("Column {} is not in {:?}, dropped", k, &self.path);
        }
        let row = header
            .iter()
            .map(|k| record.get(k).map(|v| v.to_cell()).unwrap_or_default())
            .collect::<Vec<_>>();
        self.writer.write_record(&row)?;
        self.writer.flush()?;

        Ok(())
    }

    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) -> Result<()> {
        let mut record = self.storage.aggregate()?;
        record.insert(self.step_key.clone(), RecordValue::Scalar(step as f32));
        self.write(record)
    }
}
