/// All primary keys are UUIDs (v7 when generated by the application).
pub type DbId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a new time-ordered identifier.
pub fn new_id() -> DbId {
    uuid::Uuid::now_v7()
}
