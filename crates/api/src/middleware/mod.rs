//! Request extractors enforcing authentication and roles.
//!
//! - [`auth::AuthUser`] -- the caller and their open session.
//! - [`rbac::RequireAdmin`] -- requires the `admin` role.

pub mod auth;
pub mod rbac;
