use crate::utils::error::{RentalError, Result};
use chrono::NaiveDate;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(RentalError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(RentalError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_amount(field_name: &str, value: i64) -> Result<()> {
    if value <= 0 {
        return Err(RentalError::validation(
            field_name,
            format!("{} must be positive, got {}", field_name, value),
        ));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RentalError::validation(
            field_name,
            format!("{} cannot be empty or whitespace-only", field_name),
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(RentalError::validation(
            field_name,
            format!("{} must be between {} and {}, got {}", field_name, min, max, value),
        ));
    }
    Ok(())
}

/// Parses an ISO-8601 calendar date (`YYYY-MM-DD`). A blank value is reported
/// as a missing field rather than a malformed one.
pub fn parse_iso_date(field_name: &str, value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RentalError::validation(
            field_name,
            format!("{} required", field_name.replace('_', " ")),
        ));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|e| {
        RentalError::validation(
            field_name,
            format!("'{}' is not a valid date (YYYY-MM-DD): {}", trimmed, e),
        )
    })
}

pub fn validate_not_before(field_name: &str, date: NaiveDate, earliest: NaiveDate) -> Result<()> {
    if date < earliest {
        return Err(RentalError::validation(
            field_name,
            format!("{} must be {} or later", field_name.replace('_', " "), earliest),
        ));
    }
    Ok(())
}
