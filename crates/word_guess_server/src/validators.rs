//! Input validation for account credentials and report dates.

use chrono::NaiveDate;
use tracing::instrument;

/// Characters of which a password must contain at least one.
pub const PASSWORD_SPECIAL_CHARACTERS: [char; 4] = ['$', '%', '*', '@'];

const MIN_USERNAME_LENGTH: usize = 5;
const MIN_PASSWORD_LENGTH: usize = 5;

/// Checks a username: at least 5 characters with both upper- and lowercase letters.
///
/// # Errors
///
/// Returns the reason the username was rejected.
#[instrument(level = "debug")]
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.chars().count() < MIN_USERNAME_LENGTH {
        return Err("Username must be at least 5 characters long".to_string());
    }
    if !username.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Username must contain at least one uppercase letter".to_string());
    }
    if !username.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Username must contain at least one lowercase letter".to_string());
    }
    Ok(())
}

/// Checks a password: at least 5 characters with a letter, a digit and one of
/// [`PASSWORD_SPECIAL_CHARACTERS`].
///
/// # Errors
///
/// Returns the reason the password was rejected.
#[instrument(level = "debug", skip_all)]
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err("Password must be at least 5 characters long".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err("Password must contain alphabetic characters".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain numeric characters".to_string());
    }
    if !password.chars().any(|c| PASSWORD_SPECIAL_CHARACTERS.contains(&c)) {
        return Err(
            "Password must contain at least one special character ($, %, *, @)".to_string(),
        );
    }
    Ok(())
}

/// Parses a `YYYY-MM-DD` report date.
///
/// # Errors
///
/// Returns a message naming the expected format.
#[instrument(level = "debug")]
pub fn parse_report_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| "Date must be in YYYY-MM-DD format".to_string())
}
