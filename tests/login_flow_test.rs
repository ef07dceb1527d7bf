//! End-to-end member card flow: issue a record from a profile, hide it in a card,
//! store the card as PNG, read it back and log in with it.

use image::{Rgba, RgbaImage};
use std::sync::Arc;

use member_card::card::{issue_record, CardProfile};
use member_card::login::{AccountRecord, InMemoryRegistry, MemberCardVerifier};
use member_card::processing::steganography::{decode_record_png, encode_png, to_png_bytes};
use member_card::{EmbeddedRecord, LoginError};

fn template_png() -> Vec<u8> {
    let template = RgbaImage::from_fn(120, 80, |x, y| Rgba([((x + y) % 128 * 2) as u8, 40, 200, 255]));
    to_png_bytes(&template).unwrap()
}

fn profile() -> CardProfile {
    CardProfile {
        name: "Jo Smith".to_string(),
        email: "Jo@Example.com".to_string(),
        pin: "482913".to_string(),
        phone: "5551234567".to_string(),
        city: "Reno".to_string(),
        dob: "1990-08-01".to_string(),
    }
}

fn registered(record: &EmbeddedRecord) -> AccountRecord {
    AccountRecord {
        email: record.email.clone(),
        name: record.name.clone(),
        phone: record.verification.phone.clone(),
        city: record.verification.city.clone(),
        dob: record.verification.dob.clone(),
        zodiac_sign: record.zodiac_sign.clone(),
        account_id: record.account_id.clone(),
    }
}

#[test]
fn test_issued_card_logs_in() {
    let record = issue_record(&profile());
    assert_eq!(record.zodiac_sign, "♌ Leo");

    let card = encode_png(&template_png(), &record).unwrap();
    let recovered = decode_record_png(&card).unwrap();
    assert_eq!(recovered, record);

    let registry = Arc::new(InMemoryRegistry::from_accounts([registered(&record)]));
    let verifier = MemberCardVerifier::new(registry);

    let outcome = verifier.verify(&recovered, "482913").unwrap();
    assert_eq!(outcome.account_id, record.account_id);
    assert_eq!(outcome.email, "jo@example.com");
}

#[test]
fn test_card_for_changed_account_is_rejected() {
    let record = issue_record(&profile());
    let card = encode_png(&template_png(), &record).unwrap();

    let mut account = registered(&record);
    account.dob = "1990-08-02".to_string();
    let verifier = MemberCardVerifier::new(Arc::new(InMemoryRegistry::from_accounts([account])));

    let recovered = decode_record_png(&card).unwrap();
    match verifier.verify(&recovered, "482913") {
        Err(LoginError::CardVerificationFailed(check)) => assert!(!check.dob_match),
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(verifier.verify(&recovered, "000000"), Err(LoginError::IncorrectPin));
}

#[test]
fn test_plain_template_is_not_a_card() {
    let err = decode_record_png(&template_png()).unwrap_err();
    assert!(err.is_not_a_card());
}
