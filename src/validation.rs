use crate::error::ApiError;

pub const MAX_AUDIT_DAYS: u32 = 365;

pub fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), ApiError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(ApiError::BadRequest(format!(
            "{field} must be between {min} and {max} characters (got {len})"
        )));
    }
    Ok(())
}

/// One `@` with a non-empty local part and domain, no whitespace.
pub fn check_email(value: &str) -> Result<(), ApiError> {
    check_length("email", value, 3, 254)?;
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    };
    if !valid || value.chars().any(char::is_whitespace) {
        return Err(ApiError::BadRequest("invalid email address".into()));
    }
    Ok(())
}

pub fn check_display_name(value: &str) -> Result<(), ApiError> {
    check_length("name", value.trim(), 1, 255)?;
    if value.chars().any(char::is_control) {
        return Err(ApiError::BadRequest(
            "name must not contain control characters".into(),
        ));
    }
    Ok(())
}

pub fn check_job_name(value: &str) -> Result<(), ApiError> {
    check_length("job name", value, 1, 255)?;
    if value.contains('\0') || value.contains("..") {
        return Err(ApiError::BadRequest(
            "job name must not contain '..' or null bytes".into(),
        ));
    }
    Ok(())
}

pub fn check_days(days: u32) -> Result<(), ApiError> {
    if !(1..=MAX_AUDIT_DAYS).contains(&days) {
        return Err(ApiError::BadRequest(format!(
            "days must be between 1 and {MAX_AUDIT_DAYS} (got {days})"
        )));
    }
    Ok(())
}
