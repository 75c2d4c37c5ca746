//! Prompt rendering and scaffold stripping around the model call.

use std::sync::LazyLock;

use regex::Regex;

use crate::profile::ProfileRecord;

const SUMMARY_MARKER: &str = "summary:";

static USER_ATTRIBUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\buser\s+attributes\s*:\s*").expect("user attributes pattern is valid")
});

/// Renders queued records into deterministic `key: value` lines.
///
/// Keys are sorted within each record, list values are comma-joined and
/// records are separated by one blank line.
#[must_use]
pub fn render_block(records: &[ProfileRecord]) -> String {
    let mut lines = Vec::new();
    for record in records {
        for (key, value) in record {
            lines.push(format!("{key}: {value}"));
        }
        lines.push(String::new());
    }
    lines.join("\n").trim().to_owned()
}

/// Wraps the attribute block in the base prompt and output scaffold.
#[must_use]
pub fn compose_prompt(base_prompt: &str, block: &str) -> String {
    format!("{}\n\nUser attributes:\n{block}\n\nSummary:", base_prompt.trim())
}

/// Strips echoed scaffolding from model output.
///
/// Everything after the last `summary:` (any case) wins. Without one, a
/// leading `user attributes:` preamble is dropped. Otherwise the trimmed text
/// is returned as is.
#[must_use]
pub fn extract_summary(text: &str) -> String {
    let text = text.trim();

    // ASCII lowering keeps byte offsets aligned with `text`.
    let lowered = text.to_ascii_lowercase();
    if let Some(idx) = lowered.rfind(SUMMARY_MARKER) {
        return text[idx + SUMMARY_MARKER.len()..].trim().to_owned();
    }

    if let Some(found) = USER_ATTRIBUTES.find(text) {
        return text[found.end()..].trim().to_owned();
    }

    text.to_owned()
}
