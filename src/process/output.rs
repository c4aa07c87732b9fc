use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::PathBuf,
};
use tracing::info;

use crate::transform::ProcessedRecord;

/// Destination for the buffered results of a run.
pub trait OutputSink {
    /// Replace the artifact with `records`.
    fn write_all(&mut self, records: &[ProcessedRecord]) -> Result<()>;
}

/// Pretty-printed JSON array on disk, rewritten in full on every flush.
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OutputSink for JsonFileSink {
    fn write_all(&mut self, records: &[ProcessedRecord]) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating output directory `{}`", dir.display()))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let file = File::create(&tmp)
            .with_context(|| format!("could not create temporary file `{}`", tmp.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, records)
            .with_context(|| format!("serializing {} records", records.len()))?;
        writer
            .flush()
            .with_context(|| format!("flushing `{}`", tmp.display()))?;
        drop(writer);

        fs::rename(&tmp, &self.path).with_context(|| {
            format!(
                "failed to rename `{}` to `{}`",
                tmp.display(),
                self.path.display()
            )
        })?;

        info!(records = records.len(), "JSON data written to {}", self.path.display());
        Ok(())
    }
}
