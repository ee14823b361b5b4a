//! Role gates layered on [`AuthUser`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use innovate_core::error::CoreError;
use innovate_core::roles::ROLE_ADMIN;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// An admin session. Signed-in non-admins get 403, anonymous callers 401.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let caller = AuthUser::from_request_parts(parts, state).await?;
        match caller.role.as_str() {
            ROLE_ADMIN => Ok(RequireAdmin(caller)),
            _ => Err(CoreError::Forbidden("Only admins can scan every video".into()).into()),
        }
    }
}
