//! Upload validation and filename sanitization.
//!
//! Checks run in a fixed order so the first failing rule determines the
//! error: filename present, extension supported, non-empty, within size.

use crate::error::{Error, Result};

/// Maximum stored filename length in bytes.
const MAX_FILENAME_LEN: usize = 255;

/// Extension of `filename`: the segment after the last dot, lowercased.
///
/// A name without a dot is treated as its own extension, so
/// `"README"` yields `"readme"` and is rejected by any allow-list that does
/// not contain it. `"."` and `"name."` yield an empty string.
pub fn file_extension(filename: &str) -> String {
    filename
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Validate an upload before extraction.
///
/// `allowed_extensions` are lowercase, without the leading dot.
pub fn validate_upload(
    filename: &str,
    size_bytes: u64,
    allowed_extensions: &[&str],
    max_size_bytes: u64,
) -> Result<()> {
    if filename.trim().is_empty() {
        return Err(Error::InvalidInput("No file uploaded".to_string()));
    }

    let ext = file_extension(filename.trim());
    if ext.is_empty() {
        return Err(Error::InvalidInput(
            "A file was not specified for upload".to_string(),
        ));
    }

    if !allowed_extensions.contains(&ext.as_str()) {
        return Err(Error::UnsupportedFileType(format!(
            "Invalid file type fileExtension: '{}'",
            ext
        )));
    }

    if size_bytes == 0 {
        return Err(Error::InvalidInput("Uploaded file is empty".to_string()));
    }

    if size_bytes > max_size_bytes {
        return Err(Error::InvalidInput(format!(
            "File exceeds maximum size of {} bytes",
            max_size_bytes
        )));
    }

    Ok(())
}

/// Sanitize filename for safe storage and display.
pub fn sanitize_filename(filename: &str) -> String {
    // Remove path components
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let sanitized = sanitized.trim();
    if sanitized.is_empty() {
        return "unnamed_file".to_string();
    }

    if sanitized.len() <= MAX_FILENAME_LEN {
        return sanitized.to_string();
    }

    // Truncate on a char boundary, preserving the extension
    let ext = sanitized
        .rfind('.')
        .map(|pos| &sanitized[pos..])
        .filter(|ext| ext.len() < MAX_FILENAME_LEN)
        .unwrap_or("");
    let mut cut = MAX_FILENAME_LEN - ext.len();
    while !sanitized.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}{}", &sanitized[..cut], ext)
}
