//! # LSB Steganography Implementation
//!
//! Hides a member card record in the least significant bit of the red channel
//! of a card image, and extracts it again bit-exact.
//!
//! ## Algorithm
//!
//! ### Encoding Process
//! 1. Serialize the record to JSON (UTF-8 bytes)
//! 2. Expand the bytes into bits, most significant bit first
//! 3. Append the 16-bit end marker `1111111111111110`
//! 4. For bit `i`, overwrite the LSB of the red byte of pixel `i`
//!    (row-major order, starting at the top-left pixel)
//! 5. Return the modified copy; green, blue, alpha and every pixel past the
//!    payload keep their original values
//!
//! ### Decoding Process
//! 1. Read red-channel LSBs in the same order
//! 2. Stop as soon as the last 16 bits read equal the end marker
//! 3. Drop the marker, pack the remaining bits into bytes and parse JSON
//!
//! ### Capacity
//! One bit per pixel. A record of `n` JSON bytes needs `n * 8 + 16` pixels,
//! so a 400x250 card holds roughly 12 KB.
//!
//! The output must be stored losslessly (PNG). Any lossy re-encoding flips
//! LSBs and the card will no longer decode.

use image::io::{Limits, Reader};
use image::{ImageError, ImageFormat, RgbaImage};
use log::debug;
use serde_json::Value;
use std::io::Cursor;

use crate::common::error::CodecError;
use crate::common::record::EmbeddedRecord;
use crate::processing::bits::{self, END_MARKER, END_MARKER_LEN};

/// RGBA layout: the red byte sits at offset 0 of each 4-byte pixel.
const BYTES_PER_PIXEL: usize = 4;
const RED: usize = 0;

/// Largest width or height accepted when decoding uploaded images.
pub const MAX_CARD_DIMENSION: u32 = 8192;

/// Number of payload bits (marker included) the image can hold.
pub fn capacity_bits(image: &RgbaImage) -> usize {
    image.as_raw().len() / BYTES_PER_PIXEL
}

/// Number of bits `record` occupies once embedded, marker included.
pub fn required_bits(record: &EmbeddedRecord) -> Result<usize, CodecError> {
    let json = serde_json::to_vec(record).map_err(CodecError::Serialize)?;
    Ok(bits::required_bits(json.len()))
}

/// Embed raw payload bytes followed by the end marker.
///
/// Fails with [`CodecError::CapacityExceeded`] before touching any pixel when the
/// payload does not fit. The carrier is never modified; a new image is returned.
pub fn embed_payload(carrier: &RgbaImage, payload: &[u8]) -> Result<RgbaImage, CodecError> {
    let mut stream = bits::bytes_to_bits(payload);
    stream.extend(bits::end_marker_bits());

    let capacity = capacity_bits(carrier);
    if stream.len() > capacity {
        return Err(CodecError::CapacityExceeded {
            needed: stream.len(),
            capacity,
        });
    }

    let mut output = carrier.clone();
    for (pixel, &bit) in output.pixels_mut().zip(stream.iter()) {
        pixel[RED] = (pixel[RED] & 0xFE) | u8::from(bit);
    }

    debug!(
        "Embedded {} payload bytes ({} of {} bits)",
        payload.len(),
        stream.len(),
        capacity
    );

    Ok(output)
}

/// Extract the raw payload bytes preceding the first end marker.
///
/// Returns [`CodecError::NoHiddenData`] when the whole image is scanned without
/// meeting the marker.
pub fn extract_payload(image: &RgbaImage) -> Result<Vec<u8>, CodecError> {
    let mut stream = Vec::new();
    // Last 16 bits read, oldest in the high bit.
    let mut window: u16 = 0;

    for pixel in image.pixels() {
        let bit = pixel[RED] & 1 == 1;
        stream.push(bit);
        window = (window << 1) | u16::from(bit);

        if stream.len() >= END_MARKER_LEN && window == END_MARKER {
            stream.truncate(stream.len() - END_MARKER_LEN);
            debug!("End marker found after {} payload bits", stream.len());
            return Ok(bits::bits_to_bytes(&stream));
        }
    }

    Err(CodecError::NoHiddenData)
}

/// Hide `record` inside a copy of `carrier`.
///
/// # Errors
/// - [`CodecError::CapacityExceeded`]: record plus marker needs more pixels than
///   the image has
///
/// # Example
/// ```ignore
/// let carrier = image::open("template.png")?.to_rgba8();
/// let card = encode(&carrier, &record)?;
/// card.save("member_card.png")?;
/// ```
pub fn encode(carrier: &RgbaImage, record: &EmbeddedRecord) -> Result<RgbaImage, CodecError> {
    let json = serde_json::to_vec(record).map_err(CodecError::Serialize)?;
    embed_payload(carrier, &json)
}

/// Recover whatever JSON value is hidden in `image`.
///
/// No schema check is applied; see [`decode_record`] for that.
///
/// # Errors
/// - [`CodecError::NoHiddenData`]: no end marker anywhere in the image
/// - [`CodecError::MalformedPayload`]: bits were found but are not valid UTF-8 JSON
pub fn decode(image: &RgbaImage) -> Result<Value, CodecError> {
    let payload = extract_payload(image)?;
    serde_json::from_slice(&payload).map_err(CodecError::MalformedPayload)
}

/// Decode and check that the hidden value has the shape of an [`EmbeddedRecord`].
pub fn decode_record(image: &RgbaImage) -> Result<EmbeddedRecord, CodecError> {
    let value = decode(image)?;
    serde_json::from_value(value).map_err(CodecError::InvalidRecord)
}

/// True if the image carries a parseable payload.
pub fn has_hidden_data(image: &RgbaImage) -> bool {
    decode(image).is_ok()
}

/// Load any supported image format into an RGBA pixel buffer, refusing images
/// wider or taller than [`MAX_CARD_DIMENSION`].
pub fn load_rgba(image_bytes: &[u8]) -> Result<RgbaImage, CodecError> {
    load_rgba_limited(image_bytes, MAX_CARD_DIMENSION)
}

/// [`load_rgba`] with an explicit dimension cap. The declared size is checked
/// before any pixel buffer is allocated.
pub fn load_rgba_limited(image_bytes: &[u8], max_dimension: u32) -> Result<RgbaImage, CodecError> {
    let mut limits = Limits::default();
    limits.max_image_width = Some(max_dimension);
    limits.max_image_height = Some(max_dimension);

    let mut reader = Reader::new(Cursor::new(image_bytes))
        .with_guessed_format()
        .map_err(|e| CodecError::ImageDecode(ImageError::IoError(e)))?;
    reader.limits(limits);

    let img = reader.decode().map_err(CodecError::ImageDecode)?;
    Ok(img.to_rgba8())
}

/// Serialize an RGBA image as PNG bytes.
pub fn to_png_bytes(image: &RgbaImage) -> Result<Vec<u8>, CodecError> {
    let mut output_bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut output_bytes), ImageFormat::Png)
        .map_err(CodecError::ImageEncode)?;
    Ok(output_bytes)
}

/// Encode `record` into an image given as file bytes (PNG, JPEG, ...) and
/// return the card as PNG bytes.
///
/// # Example
/// ```ignore
/// let template = std::fs::read("template.jpg")?;
/// let card = encode_png(&template, &record)?;
/// std::fs::write("member_card.png", card)?;
/// ```
pub fn encode_png(carrier_bytes: &[u8], record: &EmbeddedRecord) -> Result<Vec<u8>, CodecError> {
    let carrier = load_rgba(carrier_bytes)?;
    let card = encode(&carrier, record)?;
    to_png_bytes(&card)
}

/// [`decode`] on image file bytes.
pub fn decode_png(image_bytes: &[u8]) -> Result<Value, CodecError> {
    decode(&load_rgba(image_bytes)?)
}

/// [`decode_record`] on image file bytes.
pub fn decode_record_png(image_bytes: &[u8]) -> Result<EmbeddedRecord, CodecError> {
    decode_record(&load_rgba(image_bytes)?)
}
