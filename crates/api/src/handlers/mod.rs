//! Request handlers.
//!
//! Handlers extract the caller, delegate to a lifecycle service in
//! [`AppState`](crate::state::AppState) or a repository, and wrap the result
//! in [`DataResponse`](crate::response::DataResponse).

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod scripts;
pub mod videos;
