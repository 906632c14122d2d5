//! Input validation helpers
//!
//! Centralized text length constants and validation functions shared by the
//! CRUD handlers. PostgreSQL TEXT has no built-in length enforcement.

use shared::error::{AppError, ErrorCode};

/// Entity names: product, raw material, customer, store, category
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions, notification messages
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone, SKU, unit, bill numbers
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// Minimum password length
pub const MIN_PASSWORD_LEN: usize = 8;

/// URLs / image paths
pub const MAX_URL_LEN: usize = 2048;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

/// Maximum monetary amount accepted on any input (Rp 10 billion)
pub const MAX_AMOUNT: f64 = 10_000_000_000.0;

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(
            AppError::with_message(ErrorCode::RequiredField, format!("{field} is required"))
                .with_detail("field", field),
        );
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate a money/quantity value: finite, non-negative, bounded.
pub fn validate_amount(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 || value > MAX_AMOUNT {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("{field} must be a finite number between 0 and {MAX_AMOUNT}"),
        )
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate an optional money/quantity value.
pub fn validate_optional_amount(value: Option<f64>, field: &str) -> Result<(), AppError> {
    match value {
        Some(v) => validate_amount(v, field),
        None => Ok(()),
    }
}

/// Lowercase + trim an email and check its shape.
pub fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    validate_required_text(&email, "email", MAX_EMAIL_LEN)?;
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(AppError::with_message(
            ErrorCode::InvalidFormat,
            "email is not a valid address",
        ));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_rejects_blank() {
        let err = validate_required_text("  ", "name", MAX_NAME_LEN).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
        assert!(validate_required_text("Kopi Susu", "name", MAX_NAME_LEN).is_ok());
    }

    #[test]
    fn text_length_limits() {
        let long = "x".repeat(MAX_SHORT_TEXT_LEN + 1);
        assert!(validate_required_text(&long, "sku", MAX_SHORT_TEXT_LEN).is_err());
        assert!(validate_optional_text(&Some(long), "sku", MAX_SHORT_TEXT_LEN).is_err());
        assert!(validate_optional_text(&None, "sku", MAX_SHORT_TEXT_LEN).is_ok());
    }

    #[test]
    fn amounts_must_be_finite_and_non_negative() {
        assert!(validate_amount(0.0, "price").is_ok());
        assert!(validate_amount(18_000.0, "price").is_ok());
        assert_eq!(
            validate_amount(-1.0, "price").unwrap_err().code,
            ErrorCode::ValueOutOfRange
        );
        assert!(validate_amount(f64::NAN, "price").is_err());
        assert!(validate_amount(f64::INFINITY, "price").is_err());
        assert!(validate_optional_amount(None, "cost").is_ok());
    }

    #[test]
    fn email_is_normalized() {
        assert_eq!(
            normalize_email("  Owner@Toko.ID ").unwrap(),
            "owner@toko.id".to_string()
        );
        assert_eq!(
            normalize_email("no-at-sign").unwrap_err().code,
            ErrorCode::InvalidFormat
        );
        assert!(normalize_email("a@localhost").is_err());
    }
}
