//! Domain logic shared by the database, storage, and API crates.
//!
//! Nothing in here talks to Postgres or object storage. The only side effects
//! live in [`ffmpeg`], which shells out to `ffprobe` / `ffmpeg`.

pub mod data_url;
pub mod error;
pub mod ffmpeg;
pub mod format;
pub mod roles;
pub mod script;
pub mod types;
pub mod video;
