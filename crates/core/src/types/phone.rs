//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The number has too few digits.
    #[error("phone number must have at least {min} digits")]
    TooShort {
        /// Minimum required digit count.
        min: usize,
    },
    /// The number has too many digits.
    #[error("phone number must have at most {max} digits")]
    TooLong {
        /// Maximum allowed digit count.
        max: usize,
    },
    /// The input contains a character that is not a digit, separator, or
    /// leading plus sign.
    #[error("phone number contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// A phone number in canonical form.
///
/// Phone numbers identify users throughout the client: cart lines carry an
/// owning phone, wishlists are stored under per-phone keys, and saved
/// addresses have a per-entry phone owner. Parsing strips common separators
/// (spaces, dashes, dots, parentheses) so that the canonical form is stable
/// enough to use in storage keys.
///
/// ## Constraints
///
/// - 7-15 digits (E.164 ceiling)
/// - An optional leading `+` is preserved
/// - Separators are stripped; any other character is rejected
///
/// ## Examples
///
/// ```
/// use kirana_core::Phone;
///
/// let phone = Phone::parse("+91 98765-43210").unwrap();
/// assert_eq!(phone.as_str(), "+919876543210");
///
/// assert!(Phone::parse("").is_err());
/// assert!(Phone::parse("call-me-maybe").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Minimum number of digits.
    pub const MIN_DIGITS: usize = 7;
    /// Maximum number of digits (E.164).
    pub const MAX_DIGITS: usize = 15;

    /// Parse a `Phone` from a string, stripping separators.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty
    /// - Contains characters other than digits, separators, or a leading `+`
    /// - Has fewer than 7 or more than 15 digits
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PhoneError::Empty);
        }

        let mut canonical = String::with_capacity(trimmed.len());
        let mut digits = 0usize;

        for (i, c) in trimmed.chars().enumerate() {
            match c {
                '+' if i == 0 => canonical.push('+'),
                '0'..='9' => {
                    digits += 1;
                    canonical.push(c);
                }
                ' ' | '-' | '.' | '(' | ')' => {}
                other => return Err(PhoneError::InvalidCharacter(other)),
            }
        }

        if digits < Self::MIN_DIGITS {
            return Err(PhoneError::TooShort {
                min: Self::MIN_DIGITS,
            });
        }
        if digits > Self::MAX_DIGITS {
            return Err(PhoneError::TooLong {
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self(canonical))
    }

    /// Returns the canonical phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Phone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
