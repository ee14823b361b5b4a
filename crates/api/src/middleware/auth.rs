//! The session context extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use innovate_core::error::CoreError;
use innovate_core::types::DbId;
use innovate_db::repositories::SessionRepo;

use crate::auth::token::verify_token;
use crate::error::AppError;
use crate::state::AppState;

/// Who is calling, resolved from `Authorization: Bearer <token>`.
///
/// Lifecycle handlers take this explicitly; nothing reads a global session.
/// Resolution fails once the session behind the token has been signed out
/// or has expired, even if the token itself still verifies.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub session_id: DbId,
    pub role: String,
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.to_string()))
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;
    header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| unauthorized("Expected: Authorization: Bearer <token>"))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = verify_token(bearer_token(parts)?, &state.config.tokens)
            .map_err(|_| unauthorized("Invalid or expired token"))?;

        let session = SessionRepo::find_live(&state.pool, claims.sid)
            .await?
            .filter(|session| session.user_id == claims.sub)
            .ok_or_else(|| unauthorized("Session has ended"))?;

        Ok(AuthUser {
            user_id: session.user_id,
            session_id: session.id,
            role: claims.role,
        })
    }
}
