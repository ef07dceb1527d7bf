//! # Common Components
//!
//! Shared data structures used by the codec, the login checks and both binaries.
//!
//! ## Modules
//!
//! - [`record`]: The account record hidden inside a member card
//! - [`error`]: Typed error outcomes for encoding, decoding and login
//! - [`config`]: Configuration parsing utilities

pub mod config;
pub mod error;
pub mod record;
