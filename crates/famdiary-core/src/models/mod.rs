//! Data models for the session endpoints and the family API.
//!
//! - `UserProfile`: the signed-in user as reported by `/api/auth/me`
//! - `Member`: one entry of the family member list

pub mod member;
pub mod user;

pub use member::{Member, MembersResponse};
pub use user::{MeResponse, UserProfile};
