//! Brazilian phone number formatting.
//!
//! Numbers are stored the way the registration screen masks them:
//! `+55 (DD) NNNNN-NNNN` for mobiles and `+55 (DD) NNNN-NNNN` for landlines.
//! Partial input is formatted as far as it goes, so the same function backs
//! both the live input mask and server-side normalization.

use std::borrow::Cow;
use validator::ValidationError;

pub const COUNTRY_PREFIX: &str = "+55 ";
const COUNTRY_CODE: &str = "55";
pub const MAX_DIGITS: usize = 11;
/// Area code plus an eight-digit landline number.
pub const MIN_DIGITS: usize = 10;

/// Digits of `input` with the country code removed, capped at [`MAX_DIGITS`].
pub fn national_digits(input: &str) -> String {
    let mut digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if digits.starts_with(COUNTRY_CODE) {
        digits.replace_range(..COUNTRY_CODE.len(), "");
    }
    digits.truncate(MAX_DIGITS);
    digits
}

/// Field rule for phone inputs: at least [`MIN_DIGITS`] national digits,
/// whatever punctuation surrounds them.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if national_digits(phone).len() >= MIN_DIGITS {
        return Ok(());
    }
    let mut error = ValidationError::new("phone");
    error.message = Some(Cow::Borrowed("Telefone inválido"));
    Err(error)
}

pub fn format_br_phone(input: &str) -> String {
    let digits = national_digits(input);
    // ASCII only from here on, byte slicing is safe.
    let body = match digits.len() {
        len if len > 10 => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
        len if len > 6 => format!("({}) {}-{}", &digits[..2], &digits[2..6], &digits[6..]),
        len if len > 2 => format!("({}) {}", &digits[..2], &digits[2..]),
        _ => format!("({}", digits),
    };
    format!("{}{}", COUNTRY_PREFIX, body)
}
