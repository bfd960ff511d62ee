//! Password hashing and signed bearer tokens.

use argon2::{self, Config as ArgonConfig};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifetime of an issued token.
pub const TOKEN_TTL_HOURS: i64 = 72;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("password hashing failed: {0}")]
    Hash(#[from] argon2::Error),

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("signing secret is not configured")]
    MissingSecret,
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let salt: [u8; 16] = rand::thread_rng().gen();
    let config = ArgonConfig::default();
    Ok(argon2::hash_encoded(password.as_bytes(), &salt, &config)?)
}

/// Returns `Ok(false)` on mismatch. Only a malformed hash is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, CredentialError> {
    Ok(argon2::verify_encoded(hash, password.as_bytes())?)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub id: String,
    pub username: String,
    pub is_admin: bool,
    pub exp: usize,
}

/// Signs and verifies HS256 tokens with the server secret.
#[derive(Clone)]
pub struct TokenSigner {
    secret: String,
}

impl TokenSigner {
    pub fn new(secret: impl Into<String>) -> Self {
        TokenSigner {
            secret: secret.into(),
        }
    }

    pub fn issue(
        &self,
        user_id: &str,
        username: &str,
        is_admin: bool,
    ) -> Result<String, CredentialError> {
        if self.secret.is_empty() {
            return Err(CredentialError::MissingSecret);
        }

        let expiration = (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize;
        let claims = Claims {
            id: user_id.to_string(),
            username: username.to_string(),
            is_admin,
            exp: expiration,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )?)
    }

    /// Decode a token, rejecting bad signatures and expired credentials.
    pub fn verify(&self, token: &str) -> Result<Claims, CredentialError> {
        if self.secret.is_empty() {
            return Err(CredentialError::MissingSecret);
        }

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::new(Algorithm::HS256),
        )?;
        Ok(data.claims)
    }
}
