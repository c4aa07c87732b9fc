// src/config.rs

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::info;

/// Env var naming a YAML file to load settings from.
pub const CONFIG_ENV: &str = "CCOD_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub progress_path: PathBuf,
    /// Rows between cursor checkpoints.
    pub batch_size: u64,
    /// 0 processes the whole file.
    pub max_rows_to_process: u64,
    pub delimiter: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input_path: PathBuf::from("data/CCOD.csv"),
            output_path: PathBuf::from("data/CCOD_enhanced.json"),
            progress_path: PathBuf::from("progress.json"),
            batch_size: 100,
            max_rows_to_process: 50,
            delimiter: ",".to_string(),
        }
    }
}

impl Config {
    /// Defaults, or the YAML file named by `CCOD_CONFIG` when set.
    pub fn load() -> Result<Self> {
        match env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => {
                let cfg = Config::default();
                cfg.validate()?;
                Ok(cfg)
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let cfg: Config = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        cfg.validate()?;
        info!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }
        self.delimiter_byte()?;
        Ok(())
    }

    /// The delimiter as the single byte the CSV reader wants.
    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => bail!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            ),
        }
    }
}
