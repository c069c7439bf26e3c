pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    pub kind: TokenKind,
    /// Unique per issued token, so two logins in the same second differ.
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token secret is not configured")]
    InvalidSecret,

    #[error("Token generation error: {0}")]
    Generation(String),

    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Signs and verifies HS256 session tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(security: &SecurityConfig) -> Result<Self, TokenError> {
        let secret = security.jwt_secret.as_bytes();
        if secret.is_empty() {
            return Err(TokenError::InvalidSecret);
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_ttl: Duration::hours(security.access_token_hours),
            refresh_ttl: Duration::days(security.refresh_token_days),
        })
    }

    pub fn issue_pair(&self, user_id: &str, email: &str) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            token: self.issue(user_id, email, TokenKind::Access)?,
            refresh_token: self.issue(user_id, email, TokenKind::Refresh)?,
        })
    }

    pub fn issue(&self, user_id: &str, email: &str, kind: TokenKind) -> Result<String, TokenError> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            user_id: user_id.to_string(),
            email: email.to_string(),
            kind,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Verify signature and expiry.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| TokenError::Invalid(e.to_string()))?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn security(secret: &str, access_hours: i64) -> SecurityConfig {
        SecurityConfig {
            jwt_secret: secret.to_string(),
            access_token_hours: access_hours,
            refresh_token_days: 7,
            verify_session: true,
            enable_cors: false,
        }
    }

    #[test]
    fn issues_distinct_verifiable_pair() {
        let issuer = TokenIssuer::new(&security("secret", 24)).unwrap();
        let pair = issuer.issue_pair("u-1", "a@b.co").unwrap();
        assert_ne!(pair.token, pair.refresh_token);

        let access = issuer.decode(&pair.token).unwrap();
        assert_eq!(access.user_id, "u-1");
        assert_eq!(access.email, "a@b.co");
        assert_eq!(access.kind, TokenKind::Access);
        assert_eq!(access.exp - access.iat, 24 * 3600);

        let refresh = issuer.decode(&pair.refresh_token).unwrap();
        assert_eq!(refresh.kind, TokenKind::Refresh);
        assert_eq!(refresh.exp - refresh.iat, 7 * 24 * 3600);

        let again = issuer.issue_pair("u-1", "a@b.co").unwrap();
        assert_ne!(pair.token, again.token);
    }

    #[test]
    fn rejects_foreign_and_expired_tokens() {
        let issuer = TokenIssuer::new(&security("secret", 24)).unwrap();
        let other = TokenIssuer::new(&security("other", 24)).unwrap();
        let token = other.issue("u-1", "a@b.co", TokenKind::Access).unwrap();
        assert!(matches!(issuer.decode(&token), Err(TokenError::Invalid(_))));

        let expired = TokenIssuer::new(&security("secret", -2)).unwrap();
        let token = expired.issue("u-1", "a@b.co", TokenKind::Access).unwrap();
        assert!(issuer.decode(&token).is_err());

        assert!(issuer.decode("not-a-token").is_err());
    }

    #[test]
    fn requires_secret() {
        assert!(matches!(TokenIssuer::new(&security("", 24)), Err(TokenError::InvalidSecret)));
    }
}
