//! Form validation and result formatting for the console

use std::ops::RangeInclusive;
use std::path::Path;

use ragdex_core::{Error, IndexSummary, Result, SearchHit};

pub const CHUNK_SIZE_RANGE: RangeInclusive<usize> = 50..=1000;
pub const TOP_K_RANGE: RangeInclusive<usize> = 1..=20;

pub const DEFAULT_TEXT_CHUNK_SIZE: usize = 200;
pub const DEFAULT_FILE_CHUNK_SIZE: usize = 500;
pub const DEFAULT_TOP_K: usize = 3;

/// Trimmed value of a field that must not be blank
pub fn required<'a>(label: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::InvalidInput(format!("{} is required", label)));
    }
    Ok(value)
}

/// Parse a number within `range`; blank input takes the default
pub fn parse_bounded(
    label: &str,
    input: &str,
    default: usize,
    range: RangeInclusive<usize>,
) -> Result<usize> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(default);
    }

    let value: usize = input
        .parse()
        .map_err(|_| Error::InvalidInput(format!("{} must be a whole number", label)))?;

    if !range.contains(&value) {
        return Err(Error::InvalidInput(format!(
            "{} must be between {} and {}",
            label,
            range.start(),
            range.end()
        )));
    }
    Ok(value)
}

pub fn parse_chunk_size(input: &str, default: usize) -> Result<usize> {
    parse_bounded("chunk size", input, default, CHUNK_SIZE_RANGE)
}

pub fn parse_top_k(input: &str) -> Result<usize> {
    parse_bounded("result count", input, DEFAULT_TOP_K, TOP_K_RANGE)
}

/// Only `.txt` and `.docx` files may be uploaded
pub fn check_upload(path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match extension.as_deref() {
        Some("txt") | Some("docx") => Ok(()),
        _ => Err(Error::UnsupportedFormat(format!(
            "{} is not a .txt or .docx file",
            path.display()
        ))),
    }
}

pub fn format_hit(hit: &SearchHit) -> String {
    format!("{} (score: {:.3})", hit.content, hit.score)
}

pub fn format_document(hit: &SearchHit) -> String {
    format!(
        "Description: {}\nContent: {}\nScore: {:.3}",
        hit.description, hit.content, hit.score
    )
}

pub fn format_index(summary: &IndexSummary) -> String {
    if summary.description.is_empty() {
        summary.index.clone()
    } else {
        format!("{} - {}", summary.index, summary.description)
    }
}
