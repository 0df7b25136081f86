//! Filename generation.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

/// Timestamp layout used in filenames; sorts lexicographically in time order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d__%H_%M";

/// Make a name safe on every common filesystem.
///
/// Spaces become underscores and `<>:"/\|?*` plus control characters are
/// dropped. Names that end up empty or as `.`/`..` are rejected.
pub fn safe_name(name: &str) -> Result<String> {
    let sanitized: String = name
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('_'),
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => None,
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect();

    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        return Err(Error::InvalidFilename(format!(
            "'{}' has no usable characters",
            name
        )));
    }

    Ok(sanitized)
}

/// Format a creation time for use in a filename.
pub fn format_timestamp(created: &DateTime<Utc>) -> String {
    created.format(TIMESTAMP_FORMAT).to_string()
}

/// `<timestamp>__<title>__<id>.<extension>`, sanitized as a whole.
pub fn media_file_name(
    created: &DateTime<Utc>,
    title: &str,
    id: &str,
    extension: &str,
) -> Result<String> {
    safe_name(&format!(
        "{}__{}__{}.{}",
        format_timestamp(created),
        title,
        id,
        extension
    ))
}

/// Subtitle file next to its media file: `<media stem>.<language>.<extension>`.
///
/// Players pick these up automatically, and the language part keeps several
/// tracks of one item apart.
pub fn subtitle_file_name(
    media_file_name: &str,
    language: &str,
    extension: &str,
) -> Result<String> {
    let stem = media_file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(media_file_name);
    safe_name(&format!("{}.{}.{}", stem, language, extension))
}

/// Extension of the last path segment of a URL, without query or fragment.
pub fn url_extension(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let last = path.rsplit('/').next()?;
    let (_, ext) = last.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}
