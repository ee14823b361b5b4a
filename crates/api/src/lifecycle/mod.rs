//! Video and script lifecycle services.
//!
//! Held in [`AppState`](crate::state::AppState) behind `Arc`s. Handlers do
//! request parsing and response shaping only; ownership checks, validation,
//! storage writes and compensation happen here.

pub mod script;
pub mod video;

pub use script::ScriptLifecycle;
pub use video::{Upload, UploadedVideo, VideoLifecycle};
