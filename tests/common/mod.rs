//! Common test utilities for unlock-bench integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// Body comfortably above the default soft-block threshold
pub fn unlocked_page() -> String {
    format!(
        "<html><body>{}</body></html>",
        "<div class=\"product\">in stock</div>".repeat(600)
    )
}

/// Write a `url,category` target list and return its path
pub fn write_targets(dir: &Path, name: &str, rows: &[(String, &str)]) -> PathBuf {
    let mut text = String::from("url,category\n");
    for (url, category) in rows {
        text.push_str(&format!("{url},{category}\n"));
    }
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}

/// Read a report written by the harness: checks the BOM, returns header and data rows
pub fn read_report(path: &Path) -> (Vec<String>, Vec<csv::StringRecord>) {
    let bytes = std::fs::read(path).unwrap();
    assert_eq!(&bytes[..3], b"\xEF\xBB\xBF", "report must start with a UTF-8 BOM");

    let mut reader = csv::Reader::from_reader(&bytes[3..]);
    let header = reader
        .headers()
        .unwrap()
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader.records().map(|r| r.unwrap()).collect();
    (header, rows)
}

/// Lines of a dataset's error.log, empty when the log was never created
pub fn read_error_log(dataset_dir: &Path) -> Vec<String> {
    match std::fs::read_to_string(dataset_dir.join("error.log")) {
        Ok(text) => text.lines().map(str::to_string).collect(),
        Err(_) => Vec::new(),
    }
}
