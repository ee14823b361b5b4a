//! InnovateAI API server library.
//!
//! Exposes the building blocks (config, state, error handling, lifecycle
//! services, routes) so integration tests and the binary entrypoint can both
//! access them.

pub mod auth;
pub mod background;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod middleware;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
