//! Internal helpers for text normalization and validation.
//!
//! These utilities are **not** part of the public API. They centralize the
//! folding rules so searching and sorting agree on what "equal" means.

use std::cmp::Ordering;

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{EngineError, ResultEngine};

/// Folds a string for case- and accent-insensitive comparison.
///
/// NFKD decomposition, combining marks dropped, lowercased. Whitespace is
/// kept as is so substring searches still see word boundaries.
pub(crate) fn fold(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        out.extend(ch.to_lowercase());
    }
    out
}

/// Locale-aware ordering of two labels: folded keys first, raw text breaks
/// ties so the order stays total.
pub(crate) fn collate(a: &str, b: &str) -> Ordering {
    fold(a).cmp(&fold(b)).then_with(|| a.cmp(b))
}

/// Trim a user-provided name and reject empty values.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim optional free text, mapping blank input to `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Validate a single collection path segment (user id, farm id, ...).
pub(crate) fn validate_segment(value: &str, label: &str) -> ResultEngine<()> {
    if value.is_empty() || value.contains('/') {
        return Err(EngineError::InvalidId(format!("invalid {label} id")));
    }
    Ok(())
}
