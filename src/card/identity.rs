//! Identity fields for a newly issued card: account id, creation timestamp,
//! the full record assembled from a profile, and the download filename.

use chrono::{SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::card::zodiac::zodiac_label;
use crate::common::record::{EmbeddedRecord, Verification};

pub const DEFAULT_CARD_FILENAME: &str = "member_card.png";

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// Profile data a card is issued from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardProfile {
    pub name: String,
    pub email: String,
    pub pin: String,
    pub phone: String,
    pub city: String,
    /// `YYYY-MM-DD`
    pub dob: String,
}

/// Account id: creation time in milliseconds plus a random base-36 suffix.
pub fn generate_account_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("{}-{}", Utc::now().timestamp_millis(), suffix)
}

/// Current UTC time as ISO-8601 with millisecond precision (`2024-01-01T00:00:00.000Z`).
pub fn created_at_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Build the record to embed for `profile`. The email is lowercased and trimmed;
/// the zodiac label is empty if the date of birth does not parse.
pub fn issue_record(profile: &CardProfile) -> EmbeddedRecord {
    EmbeddedRecord {
        email: profile.email.trim().to_lowercase(),
        name: profile.name.trim().to_string(),
        pin: profile.pin.clone(),
        account_id: generate_account_id(),
        created_at: created_at_now(),
        zodiac_sign: zodiac_label(&profile.dob).unwrap_or_default(),
        verification: Verification {
            phone: profile.phone.clone(),
            city: profile.city.clone(),
            dob: profile.dob.clone(),
        },
    }
}

/// Download name for a card: whitespace runs in `name` become `_`, followed by
/// `_<base>`.
pub fn card_filename(name: &str, base: &str) -> String {
    let mut out = String::with_capacity(name.len() + base.len() + 1);
    let mut in_space = false;
    for ch in name.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out.push('_');
    out.push_str(base);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_shape() {
        let id = generate_account_id();
        let (millis, suffix) = id.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), ID_SUFFIX_LEN);
        assert!(suffix.bytes().all(|b| ID_ALPHABET.contains(&b)));
        assert_ne!(generate_account_id(), id);
    }

    #[test]
    fn test_created_at_is_iso8601_utc() {
        let ts = created_at_now();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[test]
    fn test_card_filename() {
        assert_eq!(card_filename("Jo Smith", DEFAULT_CARD_FILENAME), "Jo_Smith_member_card.png");
        assert_eq!(card_filename("Ana \t Maria  Lopez", "card.png"), "Ana_Maria_Lopez_card.png");
    }

    #[test]
    fn test_card_filename_keeps_edge_whitespace_as_underscores() {
        assert_eq!(card_filename(" Jo  Smith", DEFAULT_CARD_FILENAME), "_Jo_Smith_member_card.png");
        assert_eq!(card_filename("Jo ", "card.png"), "Jo__card.png");
    }

    #[test]
    fn test_issue_record() {
        let profile = CardProfile {
            name: " Jo Smith ".to_string(),
            email: " Jo@Example.COM".to_string(),
            pin: "123456".to_string(),
            phone: "5551234567".to_string(),
            city: "Reno".to_string(),
            dob: "2000-03-25".to_string(),
        };
        let record = issue_record(&profile);
        assert_eq!(record.email, "jo@example.com");
        assert_eq!(record.name, "Jo Smith");
        assert_eq!(record.zodiac_sign, "♈ Aries");
        assert_eq!(record.verification.dob, "2000-03-25");
        assert!(!record.account_id.is_empty());
    }
}
