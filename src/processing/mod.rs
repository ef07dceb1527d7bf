//! # Image Processing and Steganography
//!
//! Hides member card records inside card images using LSB (Least Significant Bit)
//! steganography on the red channel, and recovers them again.

pub mod bits;
pub mod steganography;

// Re-export main functions for convenience
pub use steganography::{decode, decode_png, decode_record, decode_record_png, encode, encode_png};
