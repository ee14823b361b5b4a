//! Domain failures shared by every crate above `innovate-core`.

use crate::types::DbId;

/// A rule of the domain was broken. The API maps each variant to one status.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The row is absent, or belongs to someone else.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    #[error("invalid input: {0}")]
    Validation(String),

    /// The write collides with existing state, such as a taken email.
    #[error("conflict: {0}")]
    Conflict(String),

    /// No session, or the credentials did not match.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Signed in, but the role does not allow it.
    #[error("forbidden: {0}")]
    Forbidden(String),
}
