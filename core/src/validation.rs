//! Input validation shared by the catalog, ledger and identity layers.
//!
//! All helpers return [`BookingError::Validation`] and trim their input.

use crate::error::{BookingError, Result};

/// Shortest accepted class, instructor or contact name.
pub const MIN_NAME_LEN: usize = 2;
/// Longest accepted class, instructor or contact name.
pub const MAX_NAME_LEN: usize = 120;
/// Largest capacity a single class may be created with.
pub const MAX_CAPACITY: i64 = 500;

/// Validate a trimmed text field's length in characters.
///
/// # Errors
///
/// Returns `Validation` if the trimmed value is shorter than `min` or longer
/// than `max` characters.
pub fn text_field(field: &str, value: &str, min: usize, max: usize) -> Result<String> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len < min || len > max {
        return Err(BookingError::Validation(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Validate a class, instructor or contact name.
///
/// # Errors
///
/// Returns `Validation` if the length is outside `2..=120`.
pub fn name(field: &str, value: &str) -> Result<String> {
    text_field(field, value, MIN_NAME_LEN, MAX_NAME_LEN)
}

/// Validate a class capacity and convert it to a seat count.
///
/// # Errors
///
/// Returns `Validation` unless `1 <= capacity <= 500`.
pub fn capacity(capacity: i64) -> Result<u32> {
    if capacity <= 0 {
        return Err(BookingError::Validation(
            "Capacity must be greater than zero".to_string(),
        ));
    }
    if capacity > MAX_CAPACITY {
        return Err(BookingError::Validation(format!(
            "Capacity must not exceed {MAX_CAPACITY}"
        )));
    }
    u32::try_from(capacity)
        .map_err(|_| BookingError::Validation("Capacity out of range".to_string()))
}

/// Validate email address format.
///
/// Basic structural checks:
/// - Length between 3 and 255 characters
/// - Exactly one `@` with non-empty local and domain parts
/// - Domain contains a `.` that is neither first nor last
/// - No whitespace
///
/// Returns the trimmed, lowercased address.
///
/// # Errors
///
/// Returns `Validation` if any check fails.
///
/// # Examples
///
/// ```
/// use fitbook_core::validation::email;
///
/// assert_eq!(email(" Asha@Example.com ").unwrap(), "asha@example.com");
/// assert!(email("not-an-email").is_err());
/// assert!(email("user@localhost").is_err());
/// ```
pub fn email(value: &str) -> Result<String> {
    let invalid = || BookingError::Validation("Invalid email address".to_string());
    let trimmed = value.trim();

    if trimmed.len() < 3 || trimmed.len() > 255 {
        return Err(invalid());
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let mut parts = trimmed.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };
    if local.is_empty() || domain.is_empty() {
        return Err(invalid());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid());
    }

    Ok(trimmed.to_lowercase())
}
