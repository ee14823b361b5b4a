//! Shared query parameter types for API handlers.

use innovate_core::script::ScriptView;
use serde::Deserialize;

use crate::error::AppResult;

/// `?view=` on `GET /scripts`.
///
/// Kept as a raw string so an unknown view yields the JSON validation error
/// rather than axum's plain-text query rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ScriptListParams {
    pub view: Option<String>,
}

impl ScriptListParams {
    pub fn view(&self) -> AppResult<ScriptView> {
        match self.view.as_deref() {
            None | Some("") => Ok(ScriptView::default()),
            Some(name) => Ok(ScriptView::from_name(name)?),
        }
    }
}
