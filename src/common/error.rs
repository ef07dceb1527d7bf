//! Typed error outcomes.
//!
//! Callers tell "this image is not a card" apart from real faults by matching on
//! the variant, never by inspecting messages.

use thiserror::Error;

use crate::login::CrossCheck;

/// Errors from encoding or decoding a member card.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Image too small to hide this record: need {needed} bits, image holds {capacity}")]
    CapacityExceeded { needed: usize, capacity: usize },

    #[error("Image could not be decoded: {0}")]
    ImageDecode(image::ImageError),

    #[error("Image could not be encoded as PNG: {0}")]
    ImageEncode(image::ImageError),

    #[error("Record could not be serialized: {0}")]
    Serialize(serde_json::Error),

    #[error("No hidden data found in image")]
    NoHiddenData,

    #[error("Hidden data is not valid JSON: {0}")]
    MalformedPayload(serde_json::Error),

    #[error("Hidden data is not a member card record: {0}")]
    InvalidRecord(serde_json::Error),
}

impl CodecError {
    /// Expected outcomes for an arbitrary uploaded image that simply is not a
    /// valid card. These are not system faults.
    pub fn is_not_a_card(&self) -> bool {
        matches!(
            self,
            CodecError::NoHiddenData | CodecError::MalformedPayload(_) | CodecError::InvalidRecord(_)
        )
    }
}

/// Errors from the member-card login check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    #[error("Incorrect PIN code")]
    IncorrectPin,

    #[error("No account registered for {email}")]
    AccountNotFound { email: String },

    #[error("Member card data verification failed")]
    CardVerificationFailed(CrossCheck),

    #[error("Too many login attempts, retry in {retry_after_secs}s")]
    TooManyAttempts { retry_after_secs: u64 },
}

impl LoginError {
    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            LoginError::IncorrectPin => "INVALID_PIN",
            LoginError::AccountNotFound { .. } => "USER_NOT_FOUND",
            LoginError::CardVerificationFailed(_) => "CARD_VERIFICATION_FAILED",
            LoginError::TooManyAttempts { .. } => "RATE_LIMITED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_a_card_classification() {
        assert!(CodecError::NoHiddenData.is_not_a_card());
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(CodecError::MalformedPayload(parse_err).is_not_a_card());
        assert!(!CodecError::CapacityExceeded { needed: 2, capacity: 1 }.is_not_a_card());
    }

    #[test]
    fn test_login_error_codes() {
        assert_eq!(LoginError::IncorrectPin.code(), "INVALID_PIN");
        assert_eq!(
            LoginError::TooManyAttempts { retry_after_secs: 3 }.to_string(),
            "Too many login attempts, retry in 3s"
        );
    }
}
