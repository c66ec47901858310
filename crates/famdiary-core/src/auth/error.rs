use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Not authenticated")]
    MissingCredential,

    /// Signature, algorithm, structure or expiry failure. Callers must not
    /// tell these apart in responses.
    #[error("Invalid or expired token")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Short reason for logs only
    pub fn reason(&self) -> String {
        match self {
            AuthError::MissingCredential => "missing credential".to_string(),
            AuthError::InvalidToken(e) => format!("{:?}", e.kind()),
        }
    }
}
