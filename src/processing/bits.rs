//! Bit-level conversions between payload bytes and the bit stream written into
//! red-channel LSBs.
//!
//! Bits are ordered most-significant first within each byte, bytes in payload order.

/// End-of-data marker appended after the payload: fifteen ones followed by a zero.
pub const END_MARKER: u16 = 0b1111_1111_1111_1110;

/// Length of [`END_MARKER`] in bits.
pub const END_MARKER_LEN: usize = 16;

/// Expand bytes into bits, MSB first.
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<bool> {
    bytes
        .iter()
        .flat_map(|&byte| (0..8).rev().map(move |shift| (byte >> shift) & 1 == 1))
        .collect()
}

/// The end marker as a bit sequence.
pub fn end_marker_bits() -> impl Iterator<Item = bool> {
    (0..END_MARKER_LEN).rev().map(|shift| (END_MARKER >> shift) & 1 == 1)
}

/// Pack bits back into bytes. A trailing group shorter than 8 bits is dropped.
pub fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    bits.chunks_exact(8)
        .map(|group| group.iter().fold(0u8, |byte, &bit| (byte << 1) | u8::from(bit)))
        .collect()
}

/// Bits needed to embed `payload_len` bytes, marker included.
pub fn required_bits(payload_len: usize) -> usize {
    payload_len * 8 + END_MARKER_LEN
}
