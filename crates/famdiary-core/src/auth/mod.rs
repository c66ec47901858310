//! Authentication module for verifying credentials.
//!
//! This module provides:
//! - `TokenVerifier`: HS256 JWT verification behind the `CredentialVerifier` trait
//! - `Identity`: the decoded, verified claims
//! - `cookie`: the credential cookie name, attributes and header handling
//!
//! The credential itself is never issued here; an upstream identity
//! provider sets the cookie and this module only reads and verifies it.

pub mod claims;
pub mod cookie;
pub mod error;
pub mod verifier;

pub use claims::{Identity, Role};
pub use cookie::{CookieSettings, CREDENTIAL_COOKIE};
pub use error::AuthError;
pub use verifier::{CredentialVerifier, TokenVerifier};
