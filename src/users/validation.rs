//! Field predicates shared by the handlers (early rejection) and the entity
//! store (full record checks). No trimming or case folding happens here.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::AppError;

pub const INVALID_MOBILE: &str = "Invalid mobile number format";
pub const INVALID_EMAIL: &str = "Invalid email format";

lazy_static! {
    static ref MOBILE_RE: Regex = Regex::new(r"^[0-9]{10}$").expect("mobile regex");
    static ref EMAIL_RE: Regex = Regex::new(r"^\S+@\S+\.\S+$").expect("email regex");
}

/// Exactly ten ASCII digits.
pub fn is_valid_mobile(mobile: &str) -> bool {
    MOBILE_RE.is_match(mobile)
}

/// `<non-space>@<non-space>.<non-space>`
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Absent counts as invalid.
pub fn check_mobile(mobile: Option<&str>) -> Result<(), AppError> {
    match mobile {
        Some(m) if is_valid_mobile(m) => Ok(()),
        _ => Err(AppError::Validation(INVALID_MOBILE.into())),
    }
}

/// Absent counts as invalid.
pub fn check_email(email: Option<&str>) -> Result<(), AppError> {
    match email {
        Some(e) if is_valid_email(e) => Ok(()),
        _ => Err(AppError::Validation(INVALID_EMAIL.into())),
    }
}

/// Collects every field problem of one record before failing.
#[derive(Debug, Default)]
pub struct FieldErrors(Vec<String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a "required" error when the value is absent; passes it through otherwise.
    pub fn require<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.push(field, &format!("Path `{field}` is required."));
        }
        value
    }

    pub fn require_text(&mut self, field: &str, value: Option<String>) -> Option<String> {
        match value {
            Some(v) if !v.is_empty() => Some(v),
            _ => {
                self.push(field, &format!("Path `{field}` is required."));
                None
            }
        }
    }

    /// Present-but-empty strings are rejected; absent ones are fine.
    pub fn non_empty(&mut self, field: &str, value: Option<&str>) {
        if value.is_some_and(str::is_empty) {
            self.push(field, &format!("Path `{field}` must not be empty."));
        }
    }

    pub fn mobile(&mut self, value: Option<&str>) {
        if value.is_some_and(|m| !is_valid_mobile(m)) {
            self.push("mobile", INVALID_MOBILE);
        }
    }

    pub fn email(&mut self, value: Option<&str>) {
        if value.is_some_and(|e| !is_valid_email(e)) {
            self.push("email", INVALID_EMAIL);
        }
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "User validation failed: {}",
                self.0.join(", ")
            )))
        }
    }

    fn push(&mut self, field: &str, msg: &str) {
        self.0.push(format!("{field}: {msg}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mobile_accepts_exactly_ten_digits() {
        assert!(is_valid_mobile("1234567890"));
        assert!(is_valid_mobile("0000000000"));
    }

    #[test]
    fn mobile_rejects_wrong_length_or_non_digits() {
        assert!(!is_valid_mobile("12345"));
        assert!(!is_valid_mobile("12345678901"));
        assert!(!is_valid_mobile(""));
        assert!(!is_valid_mobile("12345 7890"));
        assert!(!is_valid_mobile("+123456789"));
        assert!(!is_valid_mobile("123456789a"));
        assert!(!is_valid_mobile("1234567890\n"));
    }

    #[test]
    fn mobile_rejects_non_ascii_digits() {
        // Arabic-Indic digits
        assert!(!is_valid_mobile("١٢٣٤٥٦٧٨٩٠"));
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("john.doe@mail.example.org"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a@.com"));
        assert!(!is_valid_email("a@b."));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn email_is_not_normalised() {
        assert!(!is_valid_email(" a@b.com"));
        assert!(is_valid_email("A@B.COM"));
    }

    #[test]
    fn absent_values_fail_checks() {
        assert!(matches!(check_mobile(None), Err(AppError::Validation(ref m)) if m == INVALID_MOBILE));
        assert!(matches!(check_email(None), Err(AppError::Validation(ref m)) if m == INVALID_EMAIL));
        assert!(check_mobile(Some("9876543210")).is_ok());
        assert!(check_email(Some("x@y.io")).is_ok());
    }

    #[test]
    fn field_errors_collects_all_problems() {
        let mut errs = FieldErrors::new();
        assert_eq!(errs.require_text("name", Some(String::new())), None);
        errs.require::<u8>("dob", None);
        errs.mobile(Some("12"));
        errs.email(Some("nope"));
        errs.non_empty("city", Some(""));
        errs.non_empty("state", None);

        let Err(AppError::Validation(msg)) = errs.finish() else {
            panic!("expected validation error");
        };
        assert!(msg.starts_with("User validation failed: "));
        assert!(msg.contains("name: Path `name` is required."));
        assert!(msg.contains("dob: Path `dob` is required."));
        assert!(msg.contains(INVALID_MOBILE));
        assert!(msg.contains(INVALID_EMAIL));
        assert!(msg.contains("city"));
        assert!(!msg.contains("state"));
    }

    #[test]
    fn empty_collector_passes() {
        assert!(FieldErrors::new().finish().is_ok());
    }
}
