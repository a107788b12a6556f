//! API key verification
//!
//! Keys are HS256-signed tokens. Only the signature and, when present, the
//! expiry are checked; no claim is mandatory.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Claims carried by an API key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
}

pub struct ApiKeyVerifier {
    key: Option<DecodingKey>,
    validation: Validation,
}

impl ApiKeyVerifier {
    /// A verifier without a secret rejects every key
    pub fn new(secret: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        Self {
            key: secret
                .filter(|s| !s.is_empty())
                .map(|s| DecodingKey::from_secret(s.as_bytes())),
            validation,
        }
    }

    /// Verify a key as sent in a header, with or without a `Bearer ` prefix
    pub fn verify(&self, presented: &str) -> Result<ApiKeyClaims, AuthError> {
        let key = self.key.as_ref().ok_or(AuthError::NoSecret)?;
        let token = presented.trim();
        let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();
        let data = decode::<ApiKeyClaims>(token, key, &self.validation)?;
        Ok(data.claims)
    }
}
