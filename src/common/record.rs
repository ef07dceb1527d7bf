//! # Member Card Record
//!
//! The account data hidden inside a member card image. Field names on the wire
//! are camelCase and serialize in declaration order, so the same record always
//! produces the same JSON bytes.

use serde::{Deserialize, Serialize};

/// Placeholder shown instead of the PIN wherever a record is displayed or logged.
pub const PIN_MASK: &str = "***HIDDEN***";

/// Secondary fields used to cross-check a login against the account registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub phone: String,
    pub city: String,
    /// Date of birth, `YYYY-MM-DD`
    pub dob: String,
}

/// Record embedded in a member card.
///
/// The PIN travels in clear text: the login flow compares it against user input
/// after decoding the card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedRecord {
    pub email: String,
    pub name: String,
    pub pin: String,
    pub account_id: String,
    /// ISO-8601 creation timestamp
    pub created_at: String,
    pub zodiac_sign: String,
    pub verification: Verification,
}

/// Public part of a card, safe to return to a client before the PIN is entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSummary {
    pub name: String,
    pub email: String,
    pub account_id: String,
    pub zodiac_sign: String,
}

impl EmbeddedRecord {
    /// Copy of the record with the PIN replaced by [`PIN_MASK`].
    pub fn masked(&self) -> Self {
        Self {
            pin: PIN_MASK.to_string(),
            ..self.clone()
        }
    }

    pub fn summary(&self) -> CardSummary {
        CardSummary {
            name: self.name.clone(),
            email: self.email.clone(),
            account_id: self.account_id.clone(),
            zodiac_sign: self.zodiac_sign.clone(),
        }
    }
}
