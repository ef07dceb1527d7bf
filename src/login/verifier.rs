//! Member-card login check.
//!
//! After a card has been decoded, the entered PIN is compared with the PIN on
//! the card, then the card's secondary fields are cross-checked against the
//! registered account. Zodiac sign, phone and date of birth must match; city is
//! informational only.

use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;

use crate::common::error::LoginError;
use crate::common::record::EmbeddedRecord;
use crate::login::registry::{AccountRecord, AccountRegistry};

/// Field-by-field result of comparing a card with its registry account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossCheck {
    pub zodiac_sign_match: bool,
    pub phone_match: bool,
    pub city_match: bool,
    pub dob_match: bool,
}

impl CrossCheck {
    pub fn compare(card: &EmbeddedRecord, account: &AccountRecord) -> Self {
        Self {
            zodiac_sign_match: card.zodiac_sign == account.zodiac_sign,
            phone_match: card.verification.phone == account.phone,
            city_match: card.verification.city == account.city,
            dob_match: card.verification.dob == account.dob,
        }
    }

    pub fn critical_fields_match(&self) -> bool {
        self.zodiac_sign_match && self.phone_match && self.dob_match
    }
}

/// Successful member-card login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    pub account_id: String,
    pub email: String,
    pub name: String,
    pub cross_check: CrossCheck,
}

pub struct MemberCardVerifier {
    registry: Arc<dyn AccountRegistry>,
}

impl MemberCardVerifier {
    pub fn new(registry: Arc<dyn AccountRegistry>) -> Self {
        Self { registry }
    }

    /// Check `entered_pin` and the card's fields against the registry.
    ///
    /// # Errors
    /// - [`LoginError::IncorrectPin`]: PIN empty or different from the card's
    /// - [`LoginError::AccountNotFound`]: no account for the card's email
    /// - [`LoginError::CardVerificationFailed`]: a critical field differs
    pub fn verify(&self, card: &EmbeddedRecord, entered_pin: &str) -> Result<LoginOutcome, LoginError> {
        if entered_pin.is_empty() || !pins_match(entered_pin, &card.pin) {
            return Err(LoginError::IncorrectPin);
        }

        let account = self
            .registry
            .find_by_email(&card.email)
            .ok_or_else(|| LoginError::AccountNotFound {
                email: card.email.clone(),
            })?;

        let cross_check = CrossCheck::compare(card, &account);
        if !cross_check.critical_fields_match() {
            warn!("Member card verification failed for {}: {:?}", card.email, cross_check);
            return Err(LoginError::CardVerificationFailed(cross_check));
        }
        if !cross_check.city_match {
            warn!("City on card differs from account {}", account.account_id);
        }

        info!("Member card login accepted for account {}", card.account_id);

        Ok(LoginOutcome {
            account_id: card.account_id.clone(),
            email: card.email.clone(),
            name: card.name.clone(),
            cross_check,
        })
    }
}

/// Compare without returning early on the first differing byte.
fn pins_match(entered: &str, expected: &str) -> bool {
    let (a, b) = (entered.as_bytes(), expected.as_bytes());
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}
