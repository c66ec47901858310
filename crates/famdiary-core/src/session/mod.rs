//! Client-side auth session.
//!
//! This module provides:
//! - `SessionStore`: the single writer of the current session, publishing
//!   immutable `SessionSnapshot`s to subscribers
//! - `guard`: access decisions derived from a snapshot
//!
//! A snapshot with `loading == true` means the session is not known yet;
//! consumers must not branch on `is_authenticated()` until it clears.

pub mod guard;
pub mod store;

pub use guard::{AccessDecision, AccessRequirement};
pub use store::{SessionSnapshot, SessionStore};
