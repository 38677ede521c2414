//! Input validation for the event and user collaborator modules.

use crate::error::CoreError;

/// Smallest capacity an event may declare.
pub const MIN_MAX_ATTENDEES: i32 = 1;

/// Largest capacity an event may declare.
pub const MAX_MAX_ATTENDEES: i32 = 100;

/// Bounds for event titles and locations (characters).
pub const MIN_NAME_LEN: usize = 3;
pub const MAX_NAME_LEN: usize = 255;

/// Maximum event description length (characters).
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Bounds for usernames (characters).
pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 50;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Validate an event capacity.
pub fn validate_max_attendees(max_attendees: i32) -> Result<(), CoreError> {
    if !(MIN_MAX_ATTENDEES..=MAX_MAX_ATTENDEES).contains(&max_attendees) {
        return Err(CoreError::Validation(format!(
            "max_attendees must be between {MIN_MAX_ATTENDEES} and {MAX_MAX_ATTENDEES}, got {max_attendees}"
        )));
    }
    Ok(())
}

/// Validate a bounded free-text field such as a title or location.
pub fn validate_name(field: &str, value: &str) -> Result<(), CoreError> {
    let len = value.trim().chars().count();
    if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len) {
        return Err(CoreError::Validation(format!(
            "{field} must be between {MIN_NAME_LEN} and {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate an event description.
pub fn validate_description(value: &str) -> Result<(), CoreError> {
    if value.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(CoreError::Validation(format!(
            "description must not exceed {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Validate a username.
pub fn validate_username(value: &str) -> Result<(), CoreError> {
    let len = value.trim().chars().count();
    if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&len) {
        return Err(CoreError::Validation(format!(
            "username must be between {MIN_USERNAME_LEN} and {MAX_USERNAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Minimal email sanity check: `local@domain` with a dot in the domain.
pub fn validate_email(value: &str) -> Result<(), CoreError> {
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(CoreError::Validation(format!("invalid email address '{value}'")));
    }
    Ok(())
}
