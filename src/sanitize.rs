//! Output filename sanitization and collision handling.

use std::path::{Path, PathBuf};

/// Used when a title sanitizes down to nothing.
pub const PLACEHOLDER_NAME: &str = "untitled";

/// Longest sanitized name, in characters. Leaves room for the ordinal
/// prefix, collision suffix and extension.
pub const MAX_NAME_CHARS: usize = 200;

const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Turn an arbitrary title into a name that is safe on common filesystems.
///
/// Sanitizing an already sanitized name returns it unchanged.
///
/// # Example
/// ```
/// use chapsplit::sanitize::sanitize_filename;
///
/// assert_eq!(sanitize_filename("Part 1: Who/What?"), "Part 1_ Who_What_");
/// assert_eq!(sanitize_filename("con"), "_con");
/// assert_eq!(sanitize_filename(" .. "), "untitled");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .filter(|c| !is_control(*c))
        .map(|c| if RESERVED_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_NAME_CHARS)
        .collect();

    let trimmed = replaced.trim_matches(|c: char| c == '.' || c == ' ');

    if trimmed.is_empty() {
        return PLACEHOLDER_NAME.to_string();
    }

    if RESERVED_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(trimmed))
    {
        return format!("_{}", trimmed);
    }

    trimmed.to_string()
}

/// C0 and C1 controls, plus DEL.
fn is_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{1F}' | '\u{7F}'..='\u{9F}')
}

/// Return `path` if it is free, otherwise the first free `<stem>_<n>.<ext>`.
pub fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1u64..)
        .map(|n| path.with_file_name(format!("{}_{}{}", stem, n, ext)))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}
