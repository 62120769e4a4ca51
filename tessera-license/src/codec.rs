//! License token composition and decomposition.
//!
//! Tokens use the format: `base64(sealed date)-base64(signature)`
//!
//! Both segments use the standard base64 alphabet, which has no `-`, so the
//! delimiter is unambiguous.

use crate::error::{LicenseError, LicenseResult};
use std::fmt;
use std::str::FromStr;

/// Separates the sealed date segment from the signature segment.
pub const SEGMENT_DELIMITER: char = '-';

/// A license token split into its two segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LicenseToken {
    date_segment: String,
    signature_segment: String,
}

impl LicenseToken {
    /// Builds a token from its segments.
    #[must_use]
    pub fn new(date_segment: impl Into<String>, signature_segment: impl Into<String>) -> Self {
        Self {
            date_segment: date_segment.into(),
            signature_segment: signature_segment.into(),
        }
    }

    /// Splits a token string into its segments.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::MalformedToken`] unless the string splits into
    /// exactly two non-empty parts.
    pub fn parse(token: &str) -> LicenseResult<Self> {
        let token = token.trim();
        let parts: Vec<&str> = token.split(SEGMENT_DELIMITER).collect();

        if parts.len() != 2 {
            return Err(LicenseError::MalformedToken(format!(
                "expected 2 segments separated by '{SEGMENT_DELIMITER}', found {}",
                parts.len()
            )));
        }

        if parts.iter().any(|part| part.is_empty()) {
            return Err(LicenseError::MalformedToken(
                "token segments must not be empty".to_string(),
            ));
        }

        Ok(Self::new(parts[0], parts[1]))
    }

    /// Returns the sealed expiration date segment.
    #[must_use]
    pub fn date_segment(&self) -> &str {
        &self.date_segment
    }

    /// Returns the signature segment.
    #[must_use]
    pub fn signature_segment(&self) -> &str {
        &self.signature_segment
    }

    /// Consumes the token, returning `(date_segment, signature_segment)`.
    #[must_use]
    pub fn into_parts(self) -> (String, String) {
        (self.date_segment, self.signature_segment)
    }
}

impl fmt::Display for LicenseToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEGMENT_DELIMITER}{}",
            self.date_segment, self.signature_segment
        )
    }
}

impl FromStr for LicenseToken {
    type Err = LicenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Joins a sealed date segment and a signature segment into a token string.
#[must_use]
pub fn compose(date_segment: &str, signature_segment: &str) -> String {
    LicenseToken::new(date_segment, signature_segment).to_string()
}

/// Splits a token string into `(date_segment, signature_segment)`.
pub fn decompose(token: &str) -> LicenseResult<(String, String)> {
    LicenseToken::parse(token).map(LicenseToken::into_parts)
}
