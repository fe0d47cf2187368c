use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of digits in a PNR.
pub const PNR_LENGTH: usize = 10;

/// Digits of the PNR that may appear in logs.
const VISIBLE_PREFIX: usize = 3;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("PNR number is required")]
    EmptyInput,

    #[error("PNR must be exactly 10 digits")]
    WrongLength,

    #[error("PNR must contain only digits")]
    NonNumeric,
}

/// A validated PNR: exactly ten ASCII digits.
///
/// PNRs are fixed-width identifiers, not numbers, so leading zeros are kept.
/// Both `Display` and `Debug` print the masked form so a PNR can be passed to
/// `tracing` fields without leaking the full value.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PnrQuery {
    pnr: String,
}

impl PnrQuery {
    /// Trims surrounding whitespace and checks the remaining input, in order:
    /// empty, length, then digits.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let pnr = raw.trim();

        if pnr.is_empty() {
            return Err(ValidationError::EmptyInput);
        }

        // Count characters, not bytes, so multi-byte input is reported as
        // non-numeric rather than as a length problem.
        if pnr.chars().count() != PNR_LENGTH {
            return Err(ValidationError::WrongLength);
        }

        if !pnr.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::NonNumeric);
        }

        Ok(PnrQuery {
            pnr: pnr.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.pnr
    }

    /// `123*******`
    pub fn masked(&self) -> String {
        let hidden = "*".repeat(PNR_LENGTH - VISIBLE_PREFIX);
        format!("{}{}", &self.pnr[..VISIBLE_PREFIX], hidden)
    }
}

/// Free-function form of [`PnrQuery::parse`].
pub fn validate(raw: &str) -> Result<PnrQuery, ValidationError> {
    PnrQuery::parse(raw)
}

impl FromStr for PnrQuery {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PnrQuery::parse(s)
    }
}

impl fmt::Display for PnrQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

impl fmt::Debug for PnrQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PnrQuery").field(&self.masked()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_pnr() {
        let pnr = validate("1234567890").unwrap();
        assert_eq!(pnr.as_str(), "1234567890");

        // Surrounding whitespace is stripped
        let pnr = validate("  1234567890\n").unwrap();
        assert_eq!(pnr.as_str(), "1234567890");

        // Leading zeros are preserved
        let pnr = validate("0000012345").unwrap();
        assert_eq!(pnr.as_str(), "0000012345");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(validate(""), Err(ValidationError::EmptyInput));
        assert_eq!(validate("   \t "), Err(ValidationError::EmptyInput));
    }

    #[test]
    fn test_wrong_length() {
        assert_eq!(validate("123456789"), Err(ValidationError::WrongLength));
        assert_eq!(validate("12345678901"), Err(ValidationError::WrongLength));
        // Length is checked before content
        assert_eq!(validate("abc"), Err(ValidationError::WrongLength));
        // Inner whitespace is not stripped
        assert_eq!(validate("12345 67890"), Err(ValidationError::WrongLength));
    }

    #[test]
    fn test_non_numeric() {
        assert_eq!(validate("12AB567890"), Err(ValidationError::NonNumeric));
        assert_eq!(validate("-123456789"), Err(ValidationError::NonNumeric));
        assert_eq!(validate("12345.7890"), Err(ValidationError::NonNumeric));
        // Ten non-ASCII digits are still rejected
        assert_eq!(
            validate("１２３４５６７８９０"),
            Err(ValidationError::NonNumeric)
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ValidationError::EmptyInput.to_string(),
            "PNR number is required"
        );
        assert_eq!(
            ValidationError::WrongLength.to_string(),
            "PNR must be exactly 10 digits"
        );
        assert_eq!(
            ValidationError::NonNumeric.to_string(),
            "PNR must contain only digits"
        );
    }

    #[test]
    fn test_masking() {
        let pnr: PnrQuery = "4512345678".parse().unwrap();
        assert_eq!(pnr.masked(), "451*******");
        assert_eq!(pnr.to_string(), "451*******");
        assert!(!format!("{pnr:?}").contains("4512345678"));
    }
}
