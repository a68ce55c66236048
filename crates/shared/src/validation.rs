//! Common validation utilities.

use validator::ValidationError;

lazy_static::lazy_static! {
    static ref WALL_CLOCK_REGEX: regex::Regex =
        regex::Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").unwrap();
}

/// Fixed purpose list offered by the pre-approval form. "Other" admits
/// free text, so an arbitrary non-empty purpose is also accepted.
pub const VISIT_PURPOSES: &[&str] = &[
    "Business Meeting",
    "Interview",
    "Delivery",
    "Maintenance",
    "Training",
    "Conference",
    "Other",
];

/// Validates a wall-clock time in "HH:MM" 24-hour format.
pub fn validate_wall_clock_time(value: &str) -> Result<(), ValidationError> {
    if WALL_CLOCK_REGEX.is_match(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("wall_clock_time");
        err.message = Some("Time must be in HH:MM 24-hour format".into());
        Err(err)
    }
}

/// Validates that a purpose is non-empty after trimming.
///
/// The fixed list is a UI affordance; any free-text purpose entered via
/// "Other" is legal, so only emptiness is rejected server-side.
pub fn validate_purpose(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("purpose");
        err.message = Some("Purpose must not be empty".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates that a start/end pair forms a non-empty time window.
pub fn validate_time_window(start: &str, end: &str) -> Result<(), ValidationError> {
    validate_wall_clock_time(start)?;
    validate_wall_clock_time(end)?;
    if start < end {
        Ok(())
    } else {
        let mut err = ValidationError::new("time_window");
        err.message = Some("End time must be after start time".into());
        Err(err)
    }
}
