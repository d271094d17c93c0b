//! Slug validation and deterministic fallback generation.
//!
//! The validator is the single authority on slug syntax: every candidate,
//! whether user-supplied, AI-suggested, or fallback-derived, passes through
//! [`validate_slug`] before it reaches the link store.

use crate::error::AppError;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde_json::json;
use url::Url;

/// Maximum slug length in characters.
pub const MAX_SLUG_LEN: usize = 50;

/// Length of the random disambiguation suffix appended on collisions.
const SUFFIX_LEN: usize = 4;

/// Validates slug syntax.
///
/// # Rules
///
/// - 1–50 characters
/// - Only `[A-Za-z0-9.-]`
/// - No `..` sequence
/// - No leading or trailing `.`
///
/// Pure and total; never touches storage.
///
/// # Errors
///
/// Returns [`AppError::Validation`] naming the violated rule.
pub fn validate_slug(candidate: &str) -> Result<(), AppError> {
    if candidate.is_empty() {
        return Err(AppError::bad_request(
            "Slug must not be empty",
            json!({ "slug": candidate }),
        ));
    }

    if candidate.chars().count() > MAX_SLUG_LEN {
        return Err(AppError::bad_request(
            "Slug must be at most 50 characters",
            json!({ "slug": candidate, "length": candidate.chars().count() }),
        ));
    }

    if !candidate
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(AppError::bad_request(
            "Slug may only contain letters, digits, dots, and hyphens",
            json!({ "slug": candidate }),
        ));
    }

    if candidate.contains("..") {
        return Err(AppError::bad_request(
            "Slug must not contain consecutive dots",
            json!({ "slug": candidate }),
        ));
    }

    if candidate.starts_with('.') || candidate.ends_with('.') {
        return Err(AppError::bad_request(
            "Slug must not start or end with a dot",
            json!({ "slug": candidate }),
        ));
    }

    Ok(())
}

/// Derives a deterministic slug from a URL when the suggestion collaborator
/// is unavailable.
///
/// Keywords take priority when the caller supplied them; otherwise the slug
/// is built from the host (www-stripped) plus path tokens, lower-cased and
/// joined with dots. Always produces a candidate accepted by
/// [`validate_slug`].
pub fn fallback_slug(url: &Url, keywords: &[String]) -> String {
    let tokens: Vec<String> = if keywords.is_empty() {
        let mut parts = Vec::new();
        if let Some(host) = url.host_str() {
            let host = host.strip_prefix("www.").unwrap_or(host);
            parts.push(host.to_ascii_lowercase());
        }
        parts.extend(
            url.path_segments()
                .into_iter()
                .flatten()
                .filter(|s| !s.is_empty())
                .map(sanitize_token),
        );
        parts
    } else {
        keywords.iter().map(|k| sanitize_token(k)).collect()
    };

    let joined = tokens
        .into_iter()
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(".");

    let slug = truncate_clean(&joined, MAX_SLUG_LEN);

    if slug.is_empty() {
        // Unparseable paths still need a valid slug.
        return "link".to_string();
    }

    slug
}

/// Appends a random lowercase alphanumeric suffix for collision retry,
/// shortening the base so the result stays within the length limit.
pub fn disambiguate(base: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();

    let budget = MAX_SLUG_LEN - SUFFIX_LEN - 1;
    let base = truncate_clean(base, budget);

    if base.is_empty() {
        suffix
    } else {
        format!("{base}.{suffix}")
    }
}

/// Lower-cases a token and replaces characters outside the slug alphabet
/// with hyphens, collapsing runs.
fn sanitize_token(token: impl AsRef<str>) -> String {
    let mut out = String::new();
    let mut last_sep = true;
    for c in token.as_ref().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_sep = false;
        } else if !last_sep {
            out.push('-');
            last_sep = true;
        }
    }
    out.trim_matches('-').to_string()
}

/// Truncates to `max` characters without leaving a trailing dot or hyphen.
fn truncate_clean(s: &str, max: usize) -> String {
    let truncated: String = s.chars().take(max).collect();
    truncated.trim_end_matches(['.', '-']).to_string()
}
