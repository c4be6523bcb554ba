//! Phone number normalization.
//!
//! Phone numbers are stored as 10-digit integers without a country code.

use thiserror::Error;

/// Minimum length of a raw inbound phone string (e.g. `+1` plus 8 digits is
/// already too short to be a 10-digit number).
pub const MIN_RAW_LENGTH: usize = 10;

/// Errors produced when a phone number cannot be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhoneError {
    #[error("Phone number too short")]
    TooShort,

    #[error("Phone number must have 10 digits, found {0}")]
    WrongDigitCount(usize),
}

/// Normalizes a raw phone string such as `+19715337840` or `(971) 533-7840`
/// to the 10-digit integer form.
///
/// A leading US country code (`1` on an 11-digit number) is stripped.
pub fn normalize(raw: &str) -> Result<i64, PhoneError> {
    let raw = raw.trim();
    if raw.len() < MIN_RAW_LENGTH {
        return Err(PhoneError::TooShort);
    }

    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let national = match digits.len() {
        11 if digits.starts_with('1') => &digits[1..],
        _ => digits.as_str(),
    };

    if national.len() != 10 {
        return Err(PhoneError::WrongDigitCount(national.len()));
    }

    national
        .parse::<i64>()
        .map_err(|_| PhoneError::WrongDigitCount(national.len()))
}

/// Formats a 10-digit phone number in E.164 form with the US country code.
pub fn to_e164(phone: i64) -> String {
    format!("+1{}", phone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_e164() {
        assert_eq!(normalize("+19715337840"), Ok(9715337840));
    }

    #[test]
    fn test_normalize_plain_ten_digits() {
        assert_eq!(normalize("9715337840"), Ok(9715337840));
    }

    #[test]
    fn test_normalize_formatted() {
        assert_eq!(normalize("(971) 533-7840"), Ok(9715337840));
        assert_eq!(normalize("1-971-533-7840"), Ok(9715337840));
    }

    #[test]
    fn test_normalize_too_short() {
        assert_eq!(normalize("+1971533"), Err(PhoneError::TooShort));
        assert_eq!(normalize(""), Err(PhoneError::TooShort));
    }

    #[test]
    fn test_normalize_wrong_digit_count() {
        assert_eq!(
            normalize("+44 20 7946 0958"),
            Err(PhoneError::WrongDigitCount(12))
        );
        assert_eq!(
            normalize("abcdefghijk"),
            Err(PhoneError::WrongDigitCount(0))
        );
    }

    #[test]
    fn test_to_e164() {
        assert_eq!(to_e164(9715337840), "+19715337840");
    }
}
