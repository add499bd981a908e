#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Core Vocabulary for the Method Bridge
//!
//! This crate defines the small set of types every other bridge crate speaks:
//! the platform tag a call arrives with and the status taxonomy a call
//! resolves to. Both are part of the wire contract with script-side callers,
//! so they live apart from the schema and marshaling machinery.

/// Type-safe platform tags.
///
/// This module provides the `Platform` enum that identifies which runtime a
/// call came from (web content or the declarative UI engine) and how
/// registrations for "all platforms" are fanned out.
pub mod platform;
/// Stable status codes returned to script-side callers.
pub mod status;

/// Re-export the `Platform` enum for convenience.
pub use platform::{Platform, CONCRETE_PLATFORMS};
/// Re-export the `StatusCode` enum for convenience.
pub use status::StatusCode;
