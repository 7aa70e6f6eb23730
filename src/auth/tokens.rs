use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::db::models::Role;

/// Claims embedded in a bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(
        account_id: String,
        name: String,
        email: String,
        role: Role,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: account_id,
            name,
            email,
            role,
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,
}

/// Issues and verifies signed bearer tokens. Constructed once at startup from
/// the configured secret and shared through AppState.
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_hours: i64,
}

impl TokenSigner {
    pub fn new(secret: &[u8], token_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::default(),
            token_hours,
        }
    }

    /// Sign a token binding the account's identity, with a fixed absolute
    /// expiry. There is no refresh or rotation mechanism.
    pub fn issue(
        &self,
        account_id: &str,
        name: &str,
        email: &str,
        role: Role,
    ) -> Result<String, TokenError> {
        let claims = Claims::new(
            account_id.to_string(),
            name.to_string(),
            email.to_string(),
            role,
            Duration::hours(self.token_hours),
        );
        encode(&Header::default(), &claims, &self.encoding_key).map_err(|_| TokenError::Invalid)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}
