//! Integration tests for the member card codec.
//!
//! Carrier images are synthetic gradients whose red bytes are all even, so a
//! plain carrier never contains an end marker.

use image::{Rgba, RgbaImage};
use member_card::processing::bits;
use member_card::processing::steganography::{
    capacity_bits, decode, decode_png, decode_record, decode_record_png, embed_payload, encode, encode_png,
    required_bits, to_png_bytes,
};
use member_card::{CodecError, EmbeddedRecord, Verification};

fn create_test_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let red = (((x * 3 + y * 5) % 100) * 2) as u8;
        Rgba([red, 120, (x ^ y) as u8, 255])
    })
}

fn sample_record() -> EmbeddedRecord {
    EmbeddedRecord {
        email: "a@b.com".to_string(),
        name: "Jo".to_string(),
        pin: "123456".to_string(),
        account_id: "X1".to_string(),
        created_at: "2024-01-01T00:00:00Z".to_string(),
        zodiac_sign: "♈ Aries".to_string(),
        verification: Verification {
            phone: "5551234567".to_string(),
            city: "Reno".to_string(),
            dob: "2000-03-25".to_string(),
        },
    }
}

/// Flip the red LSB of pixel `index` (row-major).
fn flip_bit(image: &mut RgbaImage, index: u32) {
    let width = image.width();
    let pixel = image.get_pixel_mut(index % width, index / width);
    pixel[0] ^= 1;
}

#[test]
fn test_sample_record_round_trips_in_64x64() {
    let record = sample_record();
    assert_eq!(required_bits(&record).unwrap(), 1568);

    let card = encode(&create_test_image(64, 64), &record).unwrap();
    assert_eq!(decode_record(&card).unwrap(), record);
}

#[test]
fn test_sample_record_round_trips_in_32x64() {
    let carrier = create_test_image(32, 64);
    assert_eq!(capacity_bits(&carrier), 2048);

    let card = encode(&carrier, &sample_record()).unwrap();
    assert_eq!(decode_record(&card).unwrap(), sample_record());
}

#[test]
fn test_sample_record_does_not_fit_16x16() {
    let carrier = create_test_image(16, 16);
    match encode(&carrier, &sample_record()) {
        Err(CodecError::CapacityExceeded { needed, capacity }) => {
            assert_eq!(needed, 1568);
            assert_eq!(capacity, 256);
        }
        other => panic!("expected CapacityExceeded, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_decode_returns_structurally_equal_json() {
    let card = encode(&create_test_image(64, 64), &sample_record()).unwrap();
    let value = decode(&card).unwrap();
    assert_eq!(value, serde_json::to_value(sample_record()).unwrap());
}

#[test]
fn test_exact_capacity_boundary() {
    // One payload byte plus the marker needs exactly 24 bits.
    let payload = b"7";
    assert_eq!(bits::required_bits(payload.len()), 24);

    let exact = create_test_image(6, 4);
    let card = embed_payload(&exact, payload).unwrap();
    assert_eq!(decode(&card).unwrap(), serde_json::json!(7));

    let one_short = create_test_image(23, 1);
    assert!(matches!(
        embed_payload(&one_short, payload),
        Err(CodecError::CapacityExceeded { needed: 24, capacity: 23 })
    ));
}

#[test]
fn test_record_at_exact_capacity() {
    let record = sample_record();
    let needed = required_bits(&record).unwrap() as u32;

    let card = encode(&create_test_image(needed, 1), &record).unwrap();
    assert_eq!(decode_record(&card).unwrap(), record);

    assert!(matches!(
        encode(&create_test_image(needed - 1, 1), &record),
        Err(CodecError::CapacityExceeded { .. })
    ));
}

#[test]
fn test_plain_images_have_no_hidden_data() {
    for (w, h) in [(1, 1), (2, 3), (16, 1), (64, 64)] {
        let plain = create_test_image(w, h);
        assert!(
            matches!(decode(&plain), Err(CodecError::NoHiddenData)),
            "{}x{} should carry no data",
            w,
            h
        );
    }
}

#[test]
fn test_encoding_is_deterministic() {
    let carrier = create_test_image(64, 64);
    let first = encode(&carrier, &sample_record()).unwrap();
    let second = encode(&carrier, &sample_record()).unwrap();
    assert_eq!(first.as_raw(), second.as_raw());
}

#[test]
fn test_carrier_is_not_mutated() {
    let carrier = create_test_image(64, 64);
    let snapshot = carrier.clone();
    let card = encode(&carrier, &sample_record()).unwrap();
    assert_eq!(carrier, snapshot);
    assert_ne!(card, snapshot);
    assert_eq!(card.dimensions(), carrier.dimensions());
}

#[test]
fn test_flipping_structural_bit_is_malformed() {
    let mut card = encode(&create_test_image(64, 64), &sample_record()).unwrap();
    // Bit 1 of the opening '{' (0x7B) turns it into ';'.
    flip_bit(&mut card, 1);
    assert!(matches!(decode(&card), Err(CodecError::MalformedPayload(_))));
}

#[test]
fn test_corrupted_marker_is_not_a_card() {
    let record = sample_record();
    let marker_start = required_bits(&record).unwrap() as u32 - bits::END_MARKER_LEN as u32;

    let mut card = encode(&create_test_image(64, 64), &record).unwrap();
    flip_bit(&mut card, marker_start);

    let err = decode_record(&card).unwrap_err();
    assert!(matches!(err, CodecError::NoHiddenData));
    assert!(err.is_not_a_card());
}

#[test]
fn test_non_ascii_fields_survive() {
    let mut record = sample_record();
    record.name = "Zoë Ångström 山田".to_string();
    record.verification.city = "São Paulo".to_string();

    let card = encode(&create_test_image(64, 64), &record).unwrap();
    assert_eq!(decode_record(&card).unwrap(), record);
}

#[test]
fn test_png_bytes_round_trip() {
    let template = to_png_bytes(&create_test_image(64, 64)).unwrap();
    let card = encode_png(&template, &sample_record()).unwrap();

    assert_eq!(decode_record_png(&card).unwrap(), sample_record());
    assert!(decode_png(&template).unwrap_err().is_not_a_card());
}

#[test]
fn test_garbage_bytes_are_image_decode_errors() {
    let err = encode_png(b"GIF89a but not really", &sample_record()).unwrap_err();
    assert!(matches!(err, CodecError::ImageDecode(_)));
    assert!(!err.is_not_a_card());
}
