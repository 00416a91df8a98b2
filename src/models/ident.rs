//! Sequential human-readable identifiers (`PREFIX` + zero-padded counter).

use crate::{AppError, Result};

/// Prefix and zero-padding width for one identifier sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdScheme {
    /// Fixed alphabetic prefix, e.g. `SUB` or `TASK`.
    pub prefix: String,
    /// Minimum digit count; longer numbers are rendered in full.
    pub width: usize,
}

impl IdScheme {
    /// Build a scheme from its parts.
    #[must_use]
    pub fn new(prefix: &str, width: usize) -> Self {
        Self {
            prefix: prefix.to_owned(),
            width,
        }
    }

    /// Render the identifier for sequence number `n`.
    #[must_use]
    pub fn render(&self, n: u64) -> String {
        format!("{}{:0width$}", self.prefix, n, width = self.width)
    }

    /// Compute the identifier that follows `last`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if `last` was not produced by this scheme.
    pub fn next_after(&self, last: Option<&str>) -> Result<String> {
        next_identifier(&self.prefix, self.width, last)
    }
}

/// Produce the identifier following `last` in the `prefix` sequence.
///
/// With no prior identifier the sequence starts at 1. Once the counter
/// outgrows `width` the identifier simply gets longer.
///
/// # Errors
///
/// Returns `AppError::Validation` if `last` lacks the prefix or its suffix is
/// not a plain decimal number.
pub fn next_identifier(prefix: &str, width: usize, last: Option<&str>) -> Result<String> {
    let Some(last) = last else {
        return Ok(format!("{prefix}{:0width$}", 1));
    };

    let digits = last
        .strip_prefix(prefix)
        .ok_or_else(|| AppError::Validation(format!("identifier {last} lacks prefix {prefix}")))?;

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::Validation(format!(
            "identifier {last} has a non-numeric suffix"
        )));
    }

    let n: u64 = digits
        .parse()
        .map_err(|err| AppError::Validation(format!("identifier {last} out of range: {err}")))?;
    let next = n
        .checked_add(1)
        .ok_or_else(|| AppError::Validation(format!("identifier {last} cannot be incremented")))?;

    Ok(format!("{prefix}{next:0width$}"))
}
