//! Access tokens: HS256 JWTs bound to a row of `sessions`.
//!
//! A token is only as good as its session. Signature and `exp` are checked
//! here; whether the session is still open is checked by the extractor.

use innovate_core::types::DbId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

const DEFAULT_SESSION_TTL_MINS: i64 = 12 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id.
    pub sub: DbId,
    /// Session id.
    pub sid: DbId,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret: String,
    /// How long a sign-in lasts. Token and session expire together.
    pub session_ttl_mins: i64,
}

impl TokenConfig {
    /// `JWT_SECRET` (required, non-empty) and `SESSION_TTL_MINS` (default 720).
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let session_ttl_mins = std::env::var("SESSION_TTL_MINS")
            .map(|v| v.parse().expect("SESSION_TTL_MINS must be a valid i64"))
            .unwrap_or(DEFAULT_SESSION_TTL_MINS);

        Self {
            secret,
            session_ttl_mins,
        }
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.session_ttl_mins)
    }
}

/// Sign a token for `user_id` in session `session_id`, expiring at `expires_at`.
pub fn issue_token(
    user_id: DbId,
    session_id: DbId,
    role: &str,
    expires_at: chrono::DateTime<chrono::Utc>,
    config: &TokenConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = SessionClaims {
        sub: user_id,
        sid: session_id,
        role: role.to_string(),
        iat: chrono::Utc::now().timestamp(),
        exp: expires_at.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

pub fn verify_token(
    token: &str,
    config: &TokenConfig,
) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn config(secret: &str) -> TokenConfig {
        TokenConfig {
            secret: secret.to_string(),
            session_ttl_mins: 30,
        }
    }

    #[test]
    fn claims_carry_user_and_session() {
        let config = config("a-long-enough-test-secret");
        let (user, session) = (Uuid::now_v7(), Uuid::now_v7());
        let expires_at = Utc::now() + config.session_ttl();

        let token = issue_token(user, session, "admin", expires_at, &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();

        assert_eq!(claims.sub, user);
        assert_eq!(claims.sid, session);
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp, expires_at.timestamp());
    }

    #[test]
    fn expired_token_fails() {
        let config = config("secret");
        // Past the 60 s leeway jsonwebtoken allows.
        let expires_at = Utc::now() - chrono::Duration::minutes(5);
        let token = issue_token(Uuid::now_v7(), Uuid::now_v7(), "user", expires_at, &config).unwrap();

        assert!(verify_token(&token, &config).is_err());
    }

    #[test]
    fn token_from_another_secret_fails() {
        let expires_at = Utc::now() + chrono::Duration::minutes(5);
        let token = issue_token(
            Uuid::now_v7(),
            Uuid::now_v7(),
            "user",
            expires_at,
            &config("secret-one"),
        )
        .unwrap();

        assert!(verify_token(&token, &config("secret-two")).is_err());
    }
}
