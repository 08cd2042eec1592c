//! Request validation
//!
//! Everything here runs before the store is touched. The review table's
//! check constraints repeat the numeric ranges as a backstop.

use crate::{ApiError, ApiResult};
use std::ops::RangeInclusive;

pub const RATING_RANGE: RangeInclusive<i64> = 1..=5;
pub const WORKLOAD_RANGE: RangeInclusive<i64> = 0..=168;
pub const MIN_COMMENT_CHARS: usize = 10;
pub const MIN_COMMENT_WORDS: usize = 5;
pub const MAX_TAG_CHARS: usize = 50;

const SEASONS: [&str; 4] = ["Fall", "Winter", "Spring", "Summer"];

/// Reject `value` outside `range`, naming the field in the message
pub fn check_range(field: &str, value: i64, range: &RangeInclusive<i64>) -> ApiResult<i64> {
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(ApiError::BadRequest(format!(
            "{} must be between {} and {}, got {}",
            field,
            range.start(),
            range.end(),
            value
        )))
    }
}

/// Canonical course code: uppercase letters immediately followed by digits
///
/// Accepts `csc365`, `CSC 365`, `CSC365`; rejects anything else.
pub fn normalize_course_code(raw: &str) -> ApiResult<String> {
    let words: Vec<&str> = raw.split_whitespace().collect();
    let (letters, digits) = match words.as_slice() {
        [single] => {
            let split = single
                .find(|c: char| !c.is_ascii_alphabetic())
                .unwrap_or(single.len());
            single.split_at(split)
        }
        [letters, digits] => (*letters, *digits),
        _ => ("", ""),
    };

    let well_formed = !letters.is_empty()
        && !digits.is_empty()
        && letters.chars().all(|c| c.is_ascii_alphabetic())
        && digits.chars().all(|c| c.is_ascii_digit());

    if well_formed {
        Ok(format!("{}{}", letters.to_ascii_uppercase(), digits))
    } else {
        Err(ApiError::BadRequest(format!(
            "Invalid course code '{}': expected letters followed by digits, e.g. CSC365",
            raw
        )))
    }
}

/// Canonical term: `<Season> <Year>`, e.g. `Spring 2025`
pub fn normalize_term(raw: &str) -> ApiResult<String> {
    let invalid = || {
        ApiError::BadRequest(format!(
            "Invalid term '{}': expected '<Fall|Winter|Spring|Summer> <year>'",
            raw
        ))
    };

    let mut parts = raw.split_whitespace();
    let (season, year) = match (parts.next(), parts.next(), parts.next()) {
        (Some(season), Some(year), None) => (season, year),
        _ => return Err(invalid()),
    };

    let season = SEASONS
        .iter()
        .find(|s| s.eq_ignore_ascii_case(season))
        .ok_or_else(invalid)?;

    if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    Ok(format!("{} {}", season, year))
}

/// Comments need some substance: a minimum length and word count
pub fn check_comments(comments: &str) -> ApiResult<String> {
    let trimmed = comments.trim();

    if trimmed.chars().count() < MIN_COMMENT_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Comments must be at least {} characters",
            MIN_COMMENT_CHARS
        )));
    }
    if trimmed.split_whitespace().count() < MIN_COMMENT_WORDS {
        return Err(ApiError::BadRequest(format!(
            "Comments must be at least {} words",
            MIN_COMMENT_WORDS
        )));
    }

    Ok(trimmed.to_string())
}

/// Trim tags, reject empty or oversized ones, collapse duplicates (first wins)
pub fn normalize_tags(tags: &[String]) -> ApiResult<Vec<String>> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());

    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(ApiError::BadRequest("Tags cannot be empty".to_string()));
        }
        if tag.chars().count() > MAX_TAG_CHARS {
            return Err(ApiError::BadRequest(format!(
                "Tag '{}' exceeds {} characters",
                tag, MAX_TAG_CHARS
            )));
        }
        if !normalized.iter().any(|t| t == tag) {
            normalized.push(tag.to_string());
        }
    }

    Ok(normalized)
}

/// Non-empty after trimming
pub fn require_text(field: &str, value: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ApiError::BadRequest(format!("{} cannot be empty", field)))
    } else {
        Ok(trimmed.to_string())
    }
}
