use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/// How many input rows have been consumed, across runs of one job.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub last_processed_row: u64,
}

impl Progress {
    pub fn at(row: u64) -> Self {
        Progress {
            last_processed_row: row,
        }
    }
}

/// Where the resume cursor lives between runs.
pub trait CursorStore {
    /// Current cursor; anything unreadable counts as no prior progress.
    fn load(&self) -> Progress;
    fn save(&mut self, progress: &Progress) -> Result<()>;
    /// Forget the cursor. Clearing an absent cursor is a no-op.
    fn clear(&mut self) -> Result<()>;
}

/// Cursor persisted as a small JSON document on disk.
pub struct FileCursorStore {
    path: PathBuf,
}

impl FileCursorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "progress.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CursorStore for FileCursorStore {
    fn load(&self) -> Progress {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Progress::default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot open cursor, starting from 0");
                return Progress::default();
            }
        };
        match serde_json::from_reader(io::BufReader::new(file)) {
            Ok(p) => p,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "corrupt cursor, starting from 0");
                Progress::default()
            }
        }
    }

    fn save(&mut self, progress: &Progress) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating cursor directory `{}`", dir.display()))?;
        }

        // write to "<name>.tmp" then rename, so a crash never leaves half a cursor
        let tmp = self.tmp_path();
        let file = File::create(&tmp)
            .with_context(|| format!("could not create temporary file `{}`", tmp.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, progress).context("serializing cursor")?;
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
        debug!(row = progress.last_processed_row, "cursor saved");
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "cursor cleared");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("failed to delete `{}`", self.path.display()))
            }
        }
    }
}
