//! Screenshot file naming
//!
//! Filenames combine a fixed prefix, a filesystem-safe ISO-8601 timestamp and a
//! slugified profile name, so two visits to the same profile at different times
//! never collide while error screenshots intentionally overwrite per profile.

use chrono::{DateTime, SecondsFormat, Utc};

/// Reduce a profile name to a filesystem-safe token.
///
/// Lowercases the name and collapses every run of non-alphanumeric characters
/// into a single `-`, with no leading or trailing separator.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}

/// ISO-8601 timestamp with the path-unsafe `:` and `.` replaced by `-`.
pub fn timestamp_token(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace(':', "-")
        .replace('.', "-")
}

/// Filename for a regular visit screenshot.
pub fn screenshot_filename(prefix: &str, at: DateTime<Utc>, profile_name: &str) -> String {
    format!(
        "{}-{}-{}.png",
        prefix,
        timestamp_token(at),
        slugify(profile_name)
    )
}

/// Filename for an error screenshot. Fixed per profile, overwritten on
/// repeated errors.
pub fn error_screenshot_filename(error_prefix: &str, prefix: &str, profile_name: &str) -> String {
    format!("{}-{}-{}.png", error_prefix, prefix, slugify(profile_name))
}
