//! # Member-Card Login
//!
//! Caller-side checks run after a card has been decoded:
//!
//! - [`verifier`]: PIN comparison and cross-check against the account registry
//! - [`registry`]: Account lookup by email
//! - [`throttle`]: Per-client attempt limits for the login endpoint

pub mod registry;
pub mod throttle;
pub mod verifier;

pub use registry::{AccountRecord, AccountRegistry, InMemoryRegistry};
pub use throttle::AttemptThrottle;
pub use verifier::{CrossCheck, LoginOutcome, MemberCardVerifier};
