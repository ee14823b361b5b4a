//! Script entity model and DTOs.

use innovate_core::script::ScriptStatus;
use innovate_core::types::{DbId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// A row from the `scripts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Script {
    pub id: DbId,
    pub user_id: DbId,
    pub video_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    /// AppleScript source. Stored verbatim.
    pub script: String,
    #[sqlx(try_from = "String")]
    pub status: ScriptStatus,
    pub tags: Vec<String>,
    pub is_favorite: bool,
    pub execution_count: i32,
    pub last_executed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a script. `user_id` comes from the session, never the body.
#[derive(Debug, Clone)]
pub struct CreateScript {
    pub user_id: DbId,
    pub video_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub script: String,
    pub status: Option<ScriptStatus>,
    pub tags: Vec<String>,
}

/// Request body for `POST /scripts`.
#[derive(Debug, Deserialize)]
pub struct CreateScriptRequest {
    pub video_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub script: String,
    pub status: Option<ScriptStatus>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update for a script. Absent fields are left untouched.
///
/// Has no `execution_count` or `is_favorite`: the counter only moves through
/// the atomic increment and the favorite flag has its own endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateScript {
    pub title: Option<String>,
    /// Absent: keep. `null`: clear. A string: replace.
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub script: Option<String>,
    pub status: Option<ScriptStatus>,
    pub tags: Option<Vec<String>>,
    /// Absent: keep the link. `null`: unlink. A UUID: relink.
    #[serde(default, deserialize_with = "double_option")]
    pub video_id: Option<Option<DbId>>,
}

/// Input of the create-from-video transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateScriptFromVideo {
    pub title: String,
    pub script: String,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Request body for `POST /scripts/{id}/clone`.
#[derive(Debug, Default, Deserialize)]
pub struct CloneScript {
    pub title: Option<String>,
}

/// Request body for `PUT /scripts/{id}/favorite`.
#[derive(Debug, Deserialize)]
pub struct ToggleFavorite {
    pub is_favorite: bool,
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_distinguishes_absent_and_null_video() {
        let absent: UpdateScript = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert_eq!(absent.video_id, None);

        let null: UpdateScript = serde_json::from_str(r#"{"video_id":null}"#).unwrap();
        assert_eq!(null.video_id, Some(None));

        let id = uuid::Uuid::now_v7();
        let set: UpdateScript =
            serde_json::from_str(&format!(r#"{{"video_id":"{id}"}}"#)).unwrap();
        assert_eq!(set.video_id, Some(Some(id)));
    }

    #[test]
    fn update_distinguishes_absent_and_null_description() {
        let absent: UpdateScript = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert_eq!(absent.description, None);

        let null: UpdateScript = serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert_eq!(null.description, Some(None));

        let set: UpdateScript = serde_json::from_str(r#"{"description":"notes"}"#).unwrap();
        assert_eq!(set.description, Some(Some("notes".to_string())));
    }

    #[test]
    fn update_ignores_execution_count() {
        let patch: UpdateScript =
            serde_json::from_str(r#"{"execution_count":0,"status":"completed"}"#).unwrap();
        assert_eq!(patch.status, Some(ScriptStatus::Completed));
    }
}
