//! Input rules for user-supplied fields.
//!
//! Plain predicates ([`is_valid_phone`], [`is_strong_password`]) plus
//! `validator`-compatible wrappers used by `#[validate(custom(...))]` on the
//! transport's request DTOs.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use validator::ValidationError;

/// Minimum length of a display name, in characters.
pub const NAME_MIN_LEN: u64 = 3;
/// Maximum length of a display name, in characters.
pub const NAME_MAX_LEN: u64 = 60;
/// Minimum password length, in characters.
pub const PASSWORD_MIN_LEN: usize = 6;
/// Maximum password length, in characters.
pub const PASSWORD_MAX_LEN: usize = 64;

/// Indonesian country code followed by 10 to 13 digits.
pub const PHONE_PATTERN: &str = r"^\+62[0-9]{10,13}$";

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PHONE_PATTERN).expect("valid regex"));

/// Returns `true` if `phone` matches [`PHONE_PATTERN`].
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// Returns `true` if `password` is 6–64 characters long and contains at
/// least one ASCII uppercase letter, one digit, and one character that is
/// not an ASCII letter or digit.
pub fn is_strong_password(password: &str) -> bool {
    let len = password.chars().count();
    if !(PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len) {
        return false;
    }
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_ascii_alphanumeric());
    has_upper && has_digit && has_special
}

/// `validator` hook for phone fields.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if is_valid_phone(phone) {
        return Ok(());
    }
    Err(ValidationError::new("phone").with_message(Cow::Borrowed(
        "must start with the Indonesia country code +62 followed by 10 to 13 digits",
    )))
}

/// `validator` hook for password fields.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if is_strong_password(password) {
        return Ok(());
    }
    Err(ValidationError::new("password").with_message(Cow::Borrowed(
        "must be 6 to 64 characters and contain at least 1 capital letter, \
         1 number and 1 special (non-alphanumeric) character",
    )))
}
