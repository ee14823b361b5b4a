//! Sign-in sessions.

use innovate_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row of `sessions`. It lives from sign-in until sign-out or `expires_at`.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

