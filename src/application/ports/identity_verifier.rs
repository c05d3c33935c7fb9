use crate::domain::UserId;

/// Stateless signer/verifier for bearer credentials. A pure function of
/// its secret key, algorithm and input.
pub trait IdentityVerifier: Send + Sync {
    /// Produces a signed token embedding `user_id`, expiring 24 hours
    /// from issuance.
    fn issue(&self, user_id: &UserId) -> Result<String, AuthError>;

    /// Extracts the embedded user id, failing on a bad signature, a
    /// malformed token, or an elapsed expiry.
    fn verify(&self, token: &str) -> Result<UserId, AuthError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid token: {0}")]
    InvalidCredential(String),
}
