use anyhow::{bail, Context, Result};
use tracing::{debug, error, info, instrument};

use super::output::OutputSink;
use crate::history::{CursorStore, Progress};
use crate::transform::{transform, FlatRecord, ProcessedRecord};

/// Knobs for one run of the batch driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DriverConfig {
    /// Rows processed between cursor checkpoints.
    pub batch_size: u64,
    /// Hard cap on rows processed in one run; 0 means no cap.
    pub max_rows_to_process: u64,
}

impl DriverConfig {
    pub fn new(batch_size: u64, max_rows_to_process: u64) -> Result<Self> {
        if batch_size == 0 {
            bail!("batch_size must be at least 1");
        }
        Ok(Self {
            batch_size,
            max_rows_to_process,
        })
    }
}

/// What to do with a row that has just been pulled from the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowAction {
    /// Already handled by an earlier run.
    Skip,
    Process,
}

/// Counters owned by the driver for the duration of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DriverState {
    /// Cursor loaded at start of run.
    pub resume_from: u64,
    /// Rows consumed so far, skipped ones included. This is what gets persisted.
    pub rows_processed: u64,
    /// Rows processed since the last checkpoint.
    pub current_batch_count: u64,
    pub processed_this_run: u64,
}

impl DriverState {
    pub fn resume_from(progress: Progress) -> Self {
        DriverState {
            resume_from: progress.last_processed_row,
            ..Default::default()
        }
    }

    pub fn rows_skipped(&self) -> u64 {
        self.rows_processed - self.processed_this_run
    }

    /// True once this run has processed its quota. Checked before pulling
    /// the next row, so the row past the cap is never read.
    pub fn cap_reached(&self, config: &DriverConfig) -> bool {
        config.max_rows_to_process > 0 && self.processed_this_run >= config.max_rows_to_process
    }

    /// Classify the next row, consuming it immediately if it is a skip.
    pub fn step(&mut self) -> RowAction {
        if self.rows_processed < self.resume_from {
            self.rows_processed += 1;
            RowAction::Skip
        } else {
            RowAction::Process
        }
    }

    /// Count a processed row. Returns `true` when a checkpoint is due.
    pub fn commit(&mut self, config: &DriverConfig) -> bool {
        self.rows_processed += 1;
        self.processed_this_run += 1;
        self.current_batch_count += 1;
        if self.current_batch_count >= config.batch_size {
            self.current_batch_count = 0;
            true
        } else {
            false
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Source exhausted.
    Completed,
    /// Row cap hit; source closed early.
    Capped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub outcome: Outcome,
    /// Final cursor value for this run.
    pub rows_processed: u64,
    pub rows_skipped: u64,
    pub records_written: u64,
    pub checkpoints: u64,
}

/// Drives one pass over a row source: skip already-committed rows,
/// transform the rest, checkpoint every `batch_size` rows, flush at the end.
pub struct BatchDriver<C: CursorStore, O: OutputSink> {
    config: DriverConfig,
    cursor: C,
    sink: O,
}

impl<C: CursorStore, O: OutputSink> BatchDriver<C, O> {
    pub fn new(config: DriverConfig, cursor: C, sink: O) -> Self {
        Self {
            config,
            cursor,
            sink,
        }
    }

    pub fn into_parts(self) -> (C, O) {
        (self.cursor, self.sink)
    }

    #[instrument(level = "info", skip_all, fields(batch_size = self.config.batch_size, max_rows = self.config.max_rows_to_process))]
    pub fn run<I>(&mut self, rows: I) -> Result<RunSummary>
    where
        I: IntoIterator<Item = Result<FlatRecord>>,
    {
        let mut state = DriverState::resume_from(self.cursor.load());
        let mut results: Vec<ProcessedRecord> = Vec::new();
        let mut checkpoints = 0u64;
        info!(resume_from = state.resume_from, "starting run");

        let mut rows = rows.into_iter();
        let outcome = loop {
            if state.cap_reached(&self.config) {
                break Outcome::Capped;
            }
            let row = match rows.next() {
                None => break Outcome::Completed,
                Some(Ok(row)) => row,
                Some(Err(e)) => {
                    error!(error = %format!("{:#}", e), "Error processing CSV");
                    // keep what we have; the cursor stays at the last checkpoint
                    self.sink
                        .write_all(&results)
                        .context("writing partial results after source error")?;
                    return Err(e.context(format!(
                        "row source failed after {} rows",
                        state.rows_processed
                    )));
                }
            };

            if state.step() == RowAction::Skip {
                continue;
            }
            results.push(transform(&row));
            if state.commit(&self.config) {
                self.cursor.save(&Progress::at(state.rows_processed))?;
                checkpoints += 1;
                debug!(rows = state.rows_processed, "checkpoint");
            }
        };

        if outcome == Outcome::Capped {
            // close the source; nothing more is read from it
            drop(rows);
            info!(
                max_rows = self.config.max_rows_to_process,
                "row cap reached, source closed"
            );
        }

        self.cursor.save(&Progress::at(state.rows_processed))?;
        self.flush(&results)?;
        if outcome == Outcome::Completed {
            info!("Processing complete.");
        }

        let summary = RunSummary {
            outcome,
            rows_processed: state.rows_processed,
            rows_skipped: state.rows_skipped(),
            records_written: results.len() as u64,
            checkpoints,
        };
        info!(
            rows = summary.rows_processed,
            skipped = summary.rows_skipped,
            written = summary.records_written,
            checkpoints = summary.checkpoints,
            "run finished"
        );
        Ok(summary)
    }

    /// Write every buffered record, then drop the cursor.
    fn flush(&mut self, results: &[ProcessedRecord]) -> Result<()> {
        self.sink.write_all(results)?;
        self.cursor.clear()
    }
}
