use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::application::ports::{AuthError, IdentityVerifier};
use crate::domain::UserId;

const TOKEN_LIFETIME_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(rename = "userId")]
    user_id: String,
    exp: i64,
}

/// HS256-signed bearer tokens carrying the user id and an expiry.
pub struct JwtIdentityVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Signs a token with an explicit expiry instant.
    pub fn issue_expiring_at(
        &self,
        user_id: &UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            user_id: user_id.as_str().to_string(),
            exp: expires_at.timestamp(),
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidCredential(e.to_string()))
    }
}

impl IdentityVerifier for JwtIdentityVerifier {
    fn issue(&self, user_id: &UserId) -> Result<String, AuthError> {
        self.issue_expiring_at(user_id, Utc::now() + Duration::hours(TOKEN_LIFETIME_HOURS))
    }

    fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::InvalidCredential(e.to_string()))?;
        Ok(UserId::new(data.claims.user_id))
    }
}
