//! # Card Helpers
//!
//! Everything needed to assemble a record before it is hidden in a card image.

pub mod identity;
pub mod zodiac;

pub use identity::{card_filename, issue_record, CardProfile, DEFAULT_CARD_FILENAME};
pub use zodiac::{zodiac_label, ZodiacSign};
