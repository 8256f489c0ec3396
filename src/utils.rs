use crate::error::{PageError, Result};
use crate::log_debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Cut `text` to at most `max_chars` characters, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Collapse runs of whitespace (including the newlines a rendered element
/// carries between inline children) into single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Read every `*.html` snapshot in `dir`, ordered by the trailing number in
/// the file name (`timeline-2.html` before `timeline-10.html`).
pub fn read_html_snapshots(dir: &Path) -> Result<Vec<(PathBuf, String)>> {
    let pattern = dir.join("*.html");
    let pattern = pattern.to_string_lossy();

    let paths = glob::glob(&pattern)
        .map_err(|e| PageError::HandleUnavailable(format!("bad snapshot pattern: {}", e)))?;

    let mut files = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| {
            PageError::HandleUnavailable(format!("unreadable snapshot entry: {}", e))
        })?;
        let content = fs::read_to_string(&path).map_err(|e| {
            PageError::HandleUnavailable(format!("read snapshot {:?}: {}", path, e))
        })?;
        log_debug!("[utils] Loaded snapshot {:?} ({} bytes)", path, content.len());
        files.push((path, content));
    }

    files.sort_by(|(a_path, _), (b_path, _)| {
        let a_num = extract_page_number(a_path).unwrap_or(0);
        let b_num = extract_page_number(b_path).unwrap_or(0);
        a_num.cmp(&b_num).then_with(|| a_path.cmp(b_path))
    });

    Ok(files)
}

fn extract_page_number(path: &Path) -> Option<usize> {
    path.file_stem()
        .and_then(|n| n.to_str())
        .and_then(|stem| stem.rsplit('-').next())
        .and_then(|num| num.parse().ok())
}
