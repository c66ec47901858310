//! HTTP client module for the session endpoints and the family API.
//!
//! This module provides the `ApiClient`, which talks to two origins:
//! the front-end origin serving `/api/auth/*` and the backend API serving
//! `/families/*`. Both share one cookie jar, so the HTTP-only credential
//! travels with every request the way a browser would send it.

pub mod client;
pub mod error;

pub use client::{ApiClient, WhoAmI};
pub use error::ApiError;
