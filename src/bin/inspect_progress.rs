use anyhow::{Context, Result};
use ccod_json::{
    config::Config,
    history::{CursorStore, FileCursorStore},
};
use serde_json::Value;
use std::{fs::File, io::BufReader, path::Path, process::exit};

fn main() {
    if let Err(e) = inspect() {
        eprintln!("Error: {:#}", e);
        exit(1);
    }
}

/// Print the resume cursor and a short summary of the current output artifact.
fn inspect() -> Result<()> {
    let config = Config::load()?;

    // 1) Cursor
    let store = FileCursorStore::new(&config.progress_path);
    if store.path().exists() {
        println!(
            "Cursor ({}): lastProcessedRow = {}",
            store.path().display(),
            store.load().last_processed_row
        );
    } else {
        println!(
            "Cursor ({}): none, next run starts from row 0",
            store.path().display()
        );
    }

    // 2) Output artifact
    match count_records(&config.output_path)? {
        Some((records, with_proprietors)) => println!(
            "Output ({}): {} records, {} with proprietors",
            config.output_path.display(),
            records,
            with_proprietors
        ),
        None => println!("Output ({}): not written yet", config.output_path.display()),
    }
    Ok(())
}

fn count_records(path: &Path) -> Result<Option<(usize, usize)>> {
    if !path.exists() {
        return Ok(None);
    }
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let records: Vec<Value> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))?;
    let with_proprietors = records
        .iter()
        .filter(|r| r.get("proprietors").is_some())
        .count();
    Ok(Some((records.len(), with_proprietors)))
}
