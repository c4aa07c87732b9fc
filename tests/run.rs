use anyhow::Result;
use ccod_json::{
    config::Config,
    process::{self, Outcome},
};
use serde_json::{json, Value};
use std::{fs, path::Path};
use tempfile::tempdir;

const HEADER: &str = "Title Number,Tenure,Proprietor Name (1),Company Registration No. (1),Proprietorship Category (1),Proprietor (1) Address (1),Proprietor Name (2),Proprietor (2) Address (1)";

fn write_csv(path: &Path, rows: usize) -> Result<()> {
    let mut text = String::from(HEADER);
    text.push('\n');
    for i in 1..=rows {
        let second = if i % 2 == 0 { "Second Owner" } else { "" };
        text.push_str(&format!(
            "T{i},Freehold,OWNER {i} LTD,{i:08},Limited Company or Public Limited Company,\"{i} High St, Town\",{second},\n"
        ));
    }
    fs::write(path, text)?;
    Ok(())
}

fn config_in(dir: &Path, max_rows: u64) -> Config {
    Config {
        input_path: dir.join("CCOD.csv"),
        output_path: dir.join("data").join("CCOD_enhanced.json"),
        progress_path: dir.join("progress.json"),
        batch_size: 3,
        max_rows_to_process: max_rows,
        ..Config::default()
    }
}

fn read_output(cfg: &Config) -> Result<Vec<Value>> {
    Ok(serde_json::from_str(&fs::read_to_string(&cfg.output_path)?)?)
}

fn titles(records: &[Value]) -> Vec<&str> {
    records
        .iter()
        .map(|r| r["Title Number"].as_str().unwrap())
        .collect()
}

#[test]
fn test_full_run_writes_nested_records() -> Result<()> {
    let dir = tempdir()?;
    let cfg = config_in(dir.path(), 0);
    write_csv(&cfg.input_path, 4)?;

    let summary = process::run(&cfg)?;
    assert_eq!(summary.outcome, Outcome::Completed);
    assert_eq!(summary.rows_processed, 4);
    assert_eq!(summary.checkpoints, 1);
    assert!(!cfg.progress_path.exists());

    let records = read_output(&cfg)?;
    assert_eq!(records.len(), 4);
    assert_eq!(
        records[1],
        json!({
            "Title Number": "T2",
            "Tenure": "Freehold",
            "proprietors": [
                {
                    "name": "OWNER 2 LTD",
                    "category": "Limited Company or Public Limited Company",
                    "companiesHouseNumber": "00000002",
                    "address1": "2 High St, Town"
                },
                { "name": "Second Owner" }
            ]
        })
    );
    assert_eq!(records[0]["proprietors"].as_array().unwrap().len(), 1);

    let raw = fs::read_to_string(&cfg.output_path)?;
    assert!(raw.starts_with("[\n  {\n    \"Title Number\": \"T1\""));
    Ok(())
}

#[test]
fn test_resume_from_saved_cursor() -> Result<()> {
    let dir = tempdir()?;
    let cfg = config_in(dir.path(), 0);
    write_csv(&cfg.input_path, 10)?;
    fs::write(&cfg.progress_path, r#"{"lastProcessedRow":4}"#)?;

    let summary = process::run(&cfg)?;
    assert_eq!(summary.rows_processed, 10);
    assert_eq!(summary.rows_skipped, 4);
    assert!(!cfg.progress_path.exists());

    let records = read_output(&cfg)?;
    assert_eq!(titles(&records), vec!["T5", "T6", "T7", "T8", "T9", "T10"]);
    Ok(())
}

#[test]
fn test_row_cap() -> Result<()> {
    let dir = tempdir()?;
    let cfg = config_in(dir.path(), 3);
    write_csv(&cfg.input_path, 10)?;

    let summary = process::run(&cfg)?;
    assert_eq!(summary.outcome, Outcome::Capped);
    assert_eq!(summary.rows_processed, 3);
    assert!(!cfg.progress_path.exists());

    let records = read_output(&cfg)?;
    assert_eq!(titles(&records), vec!["T1", "T2", "T3"]);
    Ok(())
}

#[test]
fn test_malformed_row_keeps_partial_output_and_cursor() -> Result<()> {
    let dir = tempdir()?;
    let cfg = config_in(dir.path(), 0);
    write_csv(&cfg.input_path, 5)?;
    let mut text = fs::read_to_string(&cfg.input_path)?;
    text.push_str("T6,Freehold,X,,,,,,extra\nT7,Freehold,X,,,,,\n");
    fs::write(&cfg.input_path, text)?;

    let err = process::run(&cfg).unwrap_err();
    assert!(format!("{:#}", err).contains("data row 6"));

    // checkpoint after row 3 survives, rows 4 and 5 will be redone
    let cursor: Value = serde_json::from_str(&fs::read_to_string(&cfg.progress_path)?)?;
    assert_eq!(cursor, json!({ "lastProcessedRow": 3 }));

    let records = read_output(&cfg)?;
    assert_eq!(titles(&records), vec!["T1", "T2", "T3", "T4", "T5"]);
    Ok(())
}

#[test]
fn test_short_row_omits_missing_cells() -> Result<()> {
    let dir = tempdir()?;
    let cfg = config_in(dir.path(), 0);
    let text = format!(
        "{HEADER}\nT1,Freehold,ALICE LTD,00000001\nT2,Leasehold\nT3,Freehold,CAROL LTD,,Individual,1 Lane,,\n"
    );
    fs::write(&cfg.input_path, text)?;

    let summary = process::run(&cfg)?;
    assert_eq!(summary.outcome, Outcome::Completed);
    assert_eq!(summary.records_written, 3);

    let records = read_output(&cfg)?;
    assert_eq!(
        records,
        vec![
            json!({
                "Title Number": "T1",
                "Tenure": "Freehold",
                "proprietors": [{ "name": "ALICE LTD", "companiesHouseNumber": "00000001" }]
            }),
            json!({ "Title Number": "T2", "Tenure": "Leasehold" }),
            json!({
                "Title Number": "T3",
                "Tenure": "Freehold",
                "proprietors": [{
                    "name": "CAROL LTD",
                    "category": "Individual",
                    "address1": "1 Lane"
                }]
            }),
        ]
    );
    Ok(())
}

#[test]
fn test_missing_input_is_an_error() {
    let dir = tempdir().unwrap();
    let cfg = config_in(dir.path(), 0);
    assert!(process::run(&cfg).is_err());
    assert!(!cfg.output_path.exists());
}
