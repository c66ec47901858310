use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tracing::debug;

use super::{AuthError, Identity};

/// The only signing algorithm accepted for credentials.
const ALLOWED_ALGORITHM: Algorithm = Algorithm::HS256;

/// Anything that can turn a raw credential into a verified identity.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

/// HS256 verifier over a shared signing secret.
///
/// Expiry is checked against the embedded `exp` with the library's default
/// leeway. Tokens without `exp` are accepted.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(ALLOWED_ALGORITHM);
        validation.set_required_spec_claims::<&str>(&[]);

        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl CredentialVerifier for TokenVerifier {
    fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let data = decode::<Identity>(token, &self.key, &self.validation)?;
        debug!(
            subject = %data.claims.subject_id,
            expires_at = ?data.claims.expires_at_utc(),
            "Credential verified"
        );
        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithm", &ALLOWED_ALGORITHM)
            .finish_non_exhaustive()
    }
}
