// src/process/mod.rs
use anyhow::Result;
use tracing::info;

pub mod driver;
pub mod output;
pub mod source;

pub use driver::{BatchDriver, DriverConfig, DriverState, Outcome, RowAction, RunSummary};
pub use output::{JsonFileSink, OutputSink};
pub use source::CsvRowSource;

use crate::config::Config;
use crate::history::FileCursorStore;

/// Convert `config.input_path` into the enhanced JSON artifact, resuming from
/// the cursor at `config.progress_path` if one is present.
#[tracing::instrument(level = "info", skip(config), fields(input = %config.input_path.display()))]
pub fn run(config: &Config) -> Result<RunSummary> {
    let driver_config = DriverConfig::new(config.batch_size, config.max_rows_to_process)?;
    let source = CsvRowSource::open(&config.input_path, config.delimiter_byte()?)?;
    info!(columns = source.headers().len(), "opened input");

    let mut driver = BatchDriver::new(
        driver_config,
        FileCursorStore::new(&config.progress_path),
        JsonFileSink::new(&config.output_path),
    );
    driver.run(source)
}
