//! Interactive Environment Selection
//!
//! Resolves the user's 1-based answer to the "which environment" prompt.

use thiserror::Error;

/// Reasons a typed selection cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("{choice} is outside 1..={count}")]
    OutOfRange { choice: String, count: usize },
}

/// Maps a 1-based selection onto `envs`.
///
/// Surrounding whitespace (including the trailing newline) is ignored.
/// Zero, negative numbers and indices past the end are out of range.
pub fn resolve_selection<'a>(envs: &'a [String], input: &str) -> Result<&'a str, SelectionError> {
    let trimmed = input.trim();

    let choice: i64 = trimmed
        .parse()
        .map_err(|_| SelectionError::NotANumber(trimmed.to_string()))?;

    let out_of_range = || SelectionError::OutOfRange {
        choice: trimmed.to_string(),
        count: envs.len(),
    };

    let index = usize::try_from(choice)
        .ok()
        .and_then(|n| n.checked_sub(1))
        .ok_or_else(out_of_range)?;

    envs.get(index).map(String::as_str).ok_or_else(out_of_range)
}
