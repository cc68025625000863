//! Fixed-size character chunking

use crate::{Error, Result};

/// Normalize line endings to `\n` and trim surrounding whitespace
pub fn normalize_text(text: &str) -> String {
    text.replace("\r\n", "\n").trim().to_string()
}

/// Split text into non-overlapping windows of `size` characters.
///
/// The text is normalized first. Windows are counted in Unicode scalar values,
/// so multi-byte characters are never split. The last window may be shorter.
/// Empty text yields no chunks.
pub fn chunk_text(text: &str, size: usize) -> Result<Vec<String>> {
    if size == 0 {
        return Err(Error::InvalidInput(
            "chunk_size must be greater than zero".to_string(),
        ));
    }

    let normalized = normalize_text(text);
    let chars: Vec<char> = normalized.chars().collect();

    Ok(chars
        .chunks(size)
        .map(|window| window.iter().collect())
        .collect())
}
