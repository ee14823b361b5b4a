//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod dashboard_repo;
pub mod script_repo;
pub mod session_repo;
pub mod user_repo;
pub mod video_repo;

pub use dashboard_repo::DashboardRepo;
pub use script_repo::ScriptRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
pub use video_repo::VideoRepo;
