pub mod card;
pub mod common;
pub mod logging;
pub mod login;
pub mod processing;
pub mod web;

pub use common::error::{CodecError, LoginError};
pub use common::record::{EmbeddedRecord, Verification};
