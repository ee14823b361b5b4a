//! Handlers for `/auth`: sign-up, sign-in, sign-out and session-read.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use innovate_core::error::CoreError;
use innovate_core::roles::ROLE_USER;
use innovate_core::types::{DbId, Timestamp};
use innovate_db::models::user::{CreateUser, User, UserResponse};
use innovate_db::repositories::{SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::auth::token::issue_token;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Same answer for an unknown email and a wrong password.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Deserialize, Validate)]
pub struct Credentials {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    pub password: String,
}

/// A freshly opened session.
#[derive(Debug, Serialize)]
pub struct SessionGrant {
    pub access_token: String,
    pub expires_at: Timestamp,
    pub user: UserResponse,
}

/// The caller, as seen by `GET /auth/session`.
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub session_id: DbId,
    pub user: UserResponse,
}

/// POST /api/v1/auth/signup
///
/// Create an account and sign it in.
pub async fn signup(
    State(state): State<AppState>,
    Json(mut input): Json<Credentials>,
) -> AppResult<(StatusCode, Json<DataResponse<SessionGrant>>)> {
    input.email = normalize_email(&input.email);
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;
    validate_password_strength(&input.password, state.config.password_min_length)?;

    if UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .is_some()
    {
        return Err(CoreError::Conflict("An account with this email already exists".into()).into());
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    // Two racing signups still meet uq_users_email, which maps to 409.
    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email: input.email,
            password_hash,
            role: ROLE_USER.to_string(),
        },
    )
    .await?;
    tracing::info!(user_id = %user.id, "Account created");

    let grant = open_session(&state, &user).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: grant })))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<Credentials>,
) -> AppResult<Json<DataResponse<SessionGrant>>> {
    let email = normalize_email(&input.email);
    let user = UserRepo::find_by_email(&state.pool, &email).await?;

    let verified = match &user {
        Some(user) => verify_password(&input.password, &user.password_hash)
            .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?,
        None => false,
    };
    let Some(user) = user.filter(|_| verified) else {
        tracing::debug!("Sign-in refused");
        return Err(CoreError::Unauthorized(INVALID_CREDENTIALS.into()).into());
    };

    let grant = open_session(&state, &user).await?;
    Ok(Json(DataResponse { data: grant }))
}

/// POST /api/v1/auth/logout
///
/// End the session the request was made with. Other sessions stay open.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    SessionRepo::close(&state.pool, auth_user.session_id).await?;
    tracing::info!(
        user_id = %auth_user.user_id,
        session_id = %auth_user.session_id,
        "Signed out"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/session
pub async fn session(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<SessionInfo>>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Account no longer exists".into())))?;
    Ok(Json(DataResponse {
        data: SessionInfo {
            session_id: auth_user.session_id,
            user: UserResponse::from(&user),
        },
    }))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Persist a session row for `user` and sign a token naming it.
async fn open_session(state: &AppState, user: &User) -> AppResult<SessionGrant> {
    let tokens = &state.config.tokens;
    let session =
        SessionRepo::open(&state.pool, user.id, Utc::now() + tokens.session_ttl()).await?;

    let access_token = issue_token(user.id, session.id, &user.role, session.expires_at, tokens)
        .map_err(|e| AppError::InternalError(format!("Token signing error: {e}")))?;

    Ok(SessionGrant {
        access_token,
        expires_at: session.expires_at,
        user: UserResponse::from(user),
    })
}
