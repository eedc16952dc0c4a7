//! Input validation helpers.
//!
//! Failures are reported as [`CoreError::InvalidFields`] so the API can
//! surface one message per offending field.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::consumption::MAX_CONSUMPTION_KWH;
use crate::error::CoreError;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum username length.
pub const MAX_USERNAME_LENGTH: usize = 150;

/// A single field-level violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Run `validator` rules on `input`, flattening failures into field violations.
///
/// Violations are sorted by field name so responses are stable.
pub fn validate_input<T: Validate>(input: &T) -> Result<(), CoreError> {
    ensure_valid(field_violations(input))
}

/// `Ok` when `violations` is empty, `InvalidFields` otherwise.
pub fn ensure_valid(violations: Vec<FieldViolation>) -> Result<(), CoreError> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(CoreError::InvalidFields(violations))
    }
}

/// Like [`validate_input`] but returns the raw violations so callers can
/// append their own checks before failing.
pub fn field_violations<T: Validate>(input: &T) -> Vec<FieldViolation> {
    let Err(errors) = input.validate() else {
        return Vec::new();
    };

    let mut violations: Vec<FieldViolation> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid ({})", e.code));
                FieldViolation::new(&field, message)
            })
        })
        .collect();
    violations.sort_by(|a, b| a.field.cmp(&b.field));
    violations
}

/// Password rules: minimum length, at least one uppercase letter and one digit.
///
/// Returns every rule the password breaks, attributed to `field`.
pub fn password_violations(password: &str, field: &str) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        violations.push(FieldViolation::new(
            field,
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters long"),
        ));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        violations.push(FieldViolation::new(
            field,
            "Password must contain at least one uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push(FieldViolation::new(
            field,
            "Password must contain at least one digit",
        ));
    }
    violations
}

/// Like [`password_violations`] but as a `Result`.
pub fn validate_password_rules(password: &str, field: &str) -> Result<(), CoreError> {
    ensure_valid(password_violations(password, field))
}

/// Reject negative or non-finite quantities (watts, kWh).
pub fn validate_non_negative(value: f64, field: &str) -> Result<(), CoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::field(
            field,
            format!("{field} must be a non-negative number, got {value}"),
        ));
    }
    Ok(())
}

/// A non-negative reading no larger than [`MAX_CONSUMPTION_KWH`].
pub fn validate_consumption(value: f64, field: &str) -> Result<(), CoreError> {
    validate_non_negative(value, field)?;
    if value > MAX_CONSUMPTION_KWH {
        return Err(CoreError::field(
            field,
            format!("{field} must be at most {MAX_CONSUMPTION_KWH} kWh"),
        ));
    }
    Ok(())
}

/// Violations for a required, trimmed name of at most `max_len` characters.
pub fn name_violations(value: &str, field: &str, max_len: usize) -> Vec<FieldViolation> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        vec![FieldViolation::new(field, format!("{field} must not be blank"))]
    } else if trimmed.chars().count() > max_len {
        vec![FieldViolation::new(
            field,
            format!("{field} must be at most {max_len} characters"),
        )]
    } else {
        Vec::new()
    }
}

/// Trim and reject blank names.
pub fn require_name(value: &str, field: &str, max_len: usize) -> Result<String, CoreError> {
    ensure_valid(name_violations(value, field, max_len))?;
    Ok(value.trim().to_string())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use validator::Validate;

    use super::*;

    #[derive(Validate)]
    struct Signup {
        #[validate(email(message = "Enter a valid email address"))]
        email: String,
        #[validate(length(min = 1, max = 5))]
        name: String,
    }

    #[test]
    fn validate_input_collects_each_failing_field() {
        let input = Signup {
            email: "nope".into(),
            name: "too-long-name".into(),
        };
        let err = validate_input(&input).unwrap_err();
        assert_matches!(err, CoreError::InvalidFields(fields) => {
            assert_eq!(fields.len(), 2);
            assert_eq!(fields[0].field, "email");
            assert_eq!(fields[0].message, "Enter a valid email address");
            assert_eq!(fields[1].field, "name");
        });
    }

    #[test]
    fn validate_input_accepts_valid_values() {
        let input = Signup {
            email: "ok@example.com".into(),
            name: "ok".into(),
        };
        assert!(validate_input(&input).is_ok());
    }

    #[test]
    fn password_rules_report_every_broken_rule() {
        let v = password_violations("abc", "password");
        assert_eq!(v.len(), 3);
        assert!(v.iter().all(|f| f.field == "password"));
    }

    #[test]
    fn password_rules_accept_strong_password() {
        assert!(validate_password_rules("Secret123", "password").is_ok());
    }

    #[test]
    fn password_rules_require_digit() {
        let v = password_violations("NoDigitsHere", "new_password");
        assert_eq!(v.len(), 1);
        assert!(v[0].message.contains("digit"));
    }

    #[test]
    fn non_negative_rejects_negative_and_nan() {
        assert!(validate_non_negative(0.0, "watts").is_ok());
        assert!(validate_non_negative(12.5, "watts").is_ok());
        assert!(validate_non_negative(-1.0, "watts").is_err());
        assert!(validate_non_negative(f64::NAN, "watts").is_err());
    }

    #[test]
    fn consumption_is_bounded_above() {
        assert!(validate_consumption(MAX_CONSUMPTION_KWH, "consumption_kwh").is_ok());
        let err = validate_consumption(1e200, "consumption_kwh").unwrap_err();
        assert_matches!(err, CoreError::InvalidFields(fields) => {
            assert_eq!(fields[0].field, "consumption_kwh");
        });
        assert!(validate_consumption(-0.5, "consumption_kwh").is_err());
    }

    #[test]
    fn whitespace_only_name_is_blank() {
        let v = name_violations("   ", "username", 150);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].field, "username");
        assert!(name_violations(" alice ", "username", 150).is_empty());
    }

    #[test]
    fn require_name_trims_and_bounds() {
        assert_eq!(require_name("  Lab  ", "name", 100).unwrap(), "Lab");
        assert!(require_name("   ", "name", 100).is_err());
        assert!(require_name(&"x".repeat(101), "name", 100).is_err());
    }
}
