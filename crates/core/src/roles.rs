//! Role names stored in `users.role` and carried in session tokens.

/// Regular account: owns videos and scripts.
pub const ROLE_USER: &str = "user";

/// Operator account: may additionally scan every user's videos.
pub const ROLE_ADMIN: &str = "admin";
