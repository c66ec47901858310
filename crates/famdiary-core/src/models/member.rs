use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
}

/// Envelope of `GET /families/me/members`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembersResponse {
    pub data: Vec<Member>,
}
