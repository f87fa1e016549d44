//! Target list loading.
//!
//! Target lists are delimited files with a header row. They come from many hands and
//! many editors, so the encoding is sniffed rather than assumed: UTF-8 (with or without
//! BOM), UTF-16 with BOM, and legacy encodings such as GBK all decode to the same targets.

use crate::config::InputConfig;
use crate::error::{Error, Result};
use crate::types::Target;
use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use std::path::Path;

/// Load targets from a delimited file
///
/// The URL column is required; the category column is optional and blank categories
/// fall back to [`DEFAULT_CATEGORY`](crate::types::DEFAULT_CATEGORY). Rows with a blank
/// URL are skipped. Duplicate URLs are kept: each row is benchmarked on its own.
pub async fn load_targets(path: &Path, input: &InputConfig) -> Result<Vec<Target>> {
    let raw = tokio::fs::read(path).await?;
    let text = decode(&raw);
    parse_targets(&text, input).map_err(|message| Error::InvalidInput {
        path: path.to_path_buf(),
        message,
    })
}

/// Decode raw bytes to UTF-8, sniffing the encoding
pub fn decode(raw: &[u8]) -> String {
    // A BOM is authoritative; otherwise let chardetng guess from the content
    let encoding = match Encoding::for_bom(raw) {
        Some((encoding, _)) => encoding,
        None => {
            let mut detector = EncodingDetector::new();
            detector.feed(raw, true);
            detector.guess(None, true)
        }
    };

    let (text, used, had_errors) = encoding.decode(raw);
    if had_errors {
        tracing::warn!(
            encoding = used.name(),
            "target list contained malformed sequences, replaced"
        );
    } else {
        tracing::debug!(encoding = used.name(), "decoded target list");
    }
    text.into_owned()
}

/// Parse decoded text into targets; errors are plain messages, wrapped by the caller
fn parse_targets(text: &str, input: &InputConfig) -> std::result::Result<Vec<Target>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| format!("failed to read header row: {e}"))?
        .clone();

    let url_idx = headers
        .iter()
        .position(|h| h == input.url_column)
        .ok_or_else(|| format!("missing required column '{}'", input.url_column))?;
    let category_idx = headers.iter().position(|h| h == input.category_column);

    let mut targets = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| format!("row {}: {e}", row + 2))?;

        let url = record.get(url_idx).unwrap_or_default();
        if url.is_empty() {
            tracing::warn!(row = row + 2, "skipping row with empty URL");
            continue;
        }
        let category = category_idx.and_then(|idx| record.get(idx));
        targets.push(Target::new(url, category));
    }

    Ok(targets)
}
