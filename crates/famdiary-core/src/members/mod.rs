//! Family member directory.
//!
//! Maps member ids to display names for the signed-in user's family. The
//! directory follows the session store: it only talks to the API while the
//! session is authenticated and belongs to a family, and it is emptied
//! otherwise. Names are cosmetic, so fetch failures resolve to an empty map.

pub mod directory;

pub use directory::{members_to_map, MemberDirectory, MemberMap, MemberSnapshot};
