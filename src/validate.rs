use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

/// Field-level validation failure with a message fit for direct display.
/// Validation runs in the caller before any store call is attempted; the
/// store itself never validates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Name is required")]
    NameRequired,
    #[error("Name must be at least 2 characters long")]
    NameTooShort,
    #[error("Name must be less than 100 characters")]
    NameTooLong,
    #[error("Invalid email format")]
    EmailInvalid,
    #[error("Phone number must contain at least 10 digits")]
    PhoneTooShort,
    #[error("{0} is required")]
    Required(String),
}

/// Name is the one mandatory field; length limits keep the table usable.
pub fn validate_name(name: &str) -> Result<(), FieldError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FieldError::NameRequired);
    }
    if name.chars().count() < 2 {
        return Err(FieldError::NameTooShort);
    }
    if name.chars().count() > 100 {
        return Err(FieldError::NameTooLong);
    }
    Ok(())
}

/// Empty email is allowed; a non-empty one must look like an address.
pub fn validate_email(email: &str) -> Result<(), FieldError> {
    let email = email.trim();
    if email.is_empty() {
        return Ok(());
    }
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(FieldError::EmailInvalid)
    }
}

/// Empty phone is allowed; a non-empty one needs at least 10 digits in
/// any formatting.
pub fn validate_phone(phone: &str) -> Result<(), FieldError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Ok(());
    }
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if digits >= 10 {
        Ok(())
    } else {
        Err(FieldError::PhoneTooShort)
    }
}

pub fn validate_required(value: &str, field_name: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::Required(field_name.to_string()));
    }
    Ok(())
}
