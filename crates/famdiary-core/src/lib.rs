//! Core library for famdiary.
//!
//! Everything the family-diary front-end needs to know about who is signed in:
//!
//! - `auth`: credential verification and the credential cookie contract
//! - `api`: HTTP client for the session endpoints and the family API
//! - `session`: the auth session store and the access guard built on it
//! - `members`: the family member directory driven by the session store
//! - `config`: client configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod members;
pub mod models;
pub mod session;
pub mod utils;

pub use api::{ApiClient, ApiError, WhoAmI};
pub use auth::{AuthError, CredentialVerifier, Identity, Role, TokenVerifier};
pub use config::ClientConfig;
pub use members::{MemberDirectory, MemberMap, MemberSnapshot};
pub use session::{AccessDecision, AccessRequirement, SessionSnapshot, SessionStore};
