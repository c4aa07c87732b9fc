use anyhow::{anyhow, Context, Result};
use csv::{Reader, ReaderBuilder, StringRecord};
use std::{fs::File, io::Read, path::Path};

use crate::transform::FlatRecord;

/// Lazy, header-driven sequence of rows from a delimited file. Finite and
/// not restartable: once a row has been pulled it is gone.
///
/// Short rows are accepted; their missing trailing cells are absent, same as
/// empty ones.
/// A row with more fields than the header is an error.
pub struct CsvRowSource<R: Read> {
    reader: Reader<R>,
    headers: StringRecord,
    record: StringRecord,
    position: u64,
    done: bool,
}

impl CsvRowSource<File> {
    pub fn open<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open input file: {}", path.display()))?;
        Self::from_reader(file, delimiter)
            .with_context(|| format!("Failed to read CSV header of {}", path.display()))
    }
}

impl<R: Read> CsvRowSource<R> {
    pub fn from_reader(rdr: R, delimiter: u8) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(rdr);
        let headers = reader.headers().context("CSV header row")?.clone();

        Ok(Self {
            reader,
            headers,
            record: StringRecord::new(),
            position: 0,
            done: false,
        })
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }
}

impl<R: Read> Iterator for CsvRowSource<R> {
    type Item = Result<FlatRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        self.position += 1;
        match self.reader.read_record(&mut self.record) {
            Ok(true) if self.record.len() > self.headers.len() => {
                self.done = true;
                Some(Err(anyhow!(
                    "CSV parse error at data row {}: expected at most {} fields, found {}",
                    self.position,
                    self.headers.len(),
                    self.record.len()
                )))
            }
            Ok(true) => Some(Ok(FlatRecord::from_csv(&self.headers, &self.record))),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(e) => {
                // the csv reader may not resync after a bad record, so stop here
                self.done = true;
                Some(Err(e).with_context(|| format!("CSV parse error at data row {}", self.position)))
            }
        }
    }
}
