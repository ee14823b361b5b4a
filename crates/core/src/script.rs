//! Automation script statuses, list views, and field validation.
//!
//! Script bodies are opaque AppleScript text; nothing here parses them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length of a script title in characters.
pub const MAX_TITLE_LENGTH: usize = 255;

/// Maximum number of tags on a script.
pub const MAX_TAGS_COUNT: usize = 20;

/// Maximum length of a single tag in characters.
pub const MAX_TAG_LENGTH: usize = 50;

/// Number of scripts shown by the `recent` view.
pub const RECENT_VIEW_LIMIT: usize = 5;

/// Suffix appended to a clone's title when no new title is given.
const CLONE_TITLE_SUFFIX: &str = " (Copy)";

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Status of a script row (`scripts.status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptStatus {
    Pending,
    Draft,
    Completed,
    Failed,
}

impl ScriptStatus {
    pub const ALL: [ScriptStatus; 4] = [Self::Pending, Self::Draft, Self::Completed, Self::Failed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Draft => "draft",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == name)
            .ok_or_else(|| CoreError::Validation(format!("Unknown script status '{name}'")))
    }
}

impl fmt::Display for ScriptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for ScriptStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_name(&value)
    }
}

// ---------------------------------------------------------------------------
// List views
// ---------------------------------------------------------------------------

/// Named subsets of a user's script list, as shown by the dashboard tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptView {
    #[default]
    All,
    Favorites,
    Recent,
    Completed,
    Draft,
}

impl ScriptView {
    /// Parse a `?view=` query value. Unknown values are a validation error.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "all" => Ok(Self::All),
            "favorites" => Ok(Self::Favorites),
            "recent" => Ok(Self::Recent),
            "completed" => Ok(Self::Completed),
            "draft" => Ok(Self::Draft),
            other => Err(CoreError::Validation(format!(
                "Unknown script view '{other}'. Expected one of: all, favorites, recent, completed, draft"
            ))),
        }
    }

    /// Status filter implied by this view, if any.
    pub fn status_filter(self) -> Option<ScriptStatus> {
        match self {
            Self::Completed => Some(ScriptStatus::Completed),
            Self::Draft => Some(ScriptStatus::Draft),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a script title: required, non-blank, bounded.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Script title is required".into()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Script title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a script body: required and non-blank.
pub fn validate_body(body: &str) -> Result<(), CoreError> {
    if body.trim().is_empty() {
        return Err(CoreError::Validation("Script body is required".into()));
    }
    Ok(())
}

/// Validate a tag list.
pub fn validate_tags(tags: &[String]) -> Result<(), CoreError> {
    if tags.len() > MAX_TAGS_COUNT {
        return Err(CoreError::Validation(format!(
            "At most {MAX_TAGS_COUNT} tags are allowed, got {}",
            tags.len()
        )));
    }
    for tag in tags {
        if tag.trim().is_empty() {
            return Err(CoreError::Validation("Tags must not be empty".into()));
        }
        if tag.chars().count() > MAX_TAG_LENGTH {
            return Err(CoreError::Validation(format!(
                "Tag '{tag}' exceeds {MAX_TAG_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

/// Trim tags and drop exact duplicates, keeping first occurrence order.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let t = tag.trim().to_string();
        if !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

/// Title given to a clone when the caller does not choose one.
///
/// The original is shortened so the suffixed title still fits
/// [`MAX_TITLE_LENGTH`].
pub fn clone_title(original: &str, requested: Option<&str>) -> String {
    if let Some(t) = requested.map(str::trim).filter(|t| !t.is_empty()) {
        return t.to_string();
    }
    let room = MAX_TITLE_LENGTH - CLONE_TITLE_SUFFIX.chars().count();
    let kept: String = original.chars().take(room).collect();
    format!("{}{CLONE_TITLE_SUFFIX}", kept.trim_end())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn status_names() {
        for status in ScriptStatus::ALL {
            assert_eq!(ScriptStatus::from_name(status.as_str()).unwrap(), status);
        }
        assert!(ScriptStatus::from_name("processing").is_err());
    }

    #[test]
    fn views_parse_and_filter() {
        assert_eq!(ScriptView::from_name("favorites").unwrap(), ScriptView::Favorites);
        assert_eq!(
            ScriptView::from_name("draft").unwrap().status_filter(),
            Some(ScriptStatus::Draft)
        );
        assert_eq!(ScriptView::Recent.status_filter(), None);
        assert_eq!(ScriptView::default(), ScriptView::All);
        assert_matches!(ScriptView::from_name("starred"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn title_and_body_are_required() {
        assert!(validate_title("Open Safari").is_ok());
        assert!(validate_title("  ").is_err());
        assert!(validate_body("tell application \"Finder\" to activate").is_ok());
        assert!(validate_body("\n").is_err());
    }

    #[test]
    fn tag_limits() {
        let many: Vec<String> = (0..=MAX_TAGS_COUNT).map(|i| format!("t{i}")).collect();
        assert!(validate_tags(&many).is_err());
        assert!(validate_tags(&["x".repeat(MAX_TAG_LENGTH + 1)]).is_err());
        assert!(validate_tags(&[" ".to_string()]).is_err());
        assert!(validate_tags(&["finder".to_string(), "mail".to_string()]).is_ok());
    }

    #[test]
    fn tags_are_trimmed_and_deduplicated() {
        let tags = vec![" mail ".to_string(), "finder".to_string(), "mail".to_string()];
        assert_eq!(normalize_tags(&tags), vec!["mail", "finder"]);
    }

    #[test]
    fn clone_titles() {
        assert_eq!(clone_title("Backup", None), "Backup (Copy)");
        assert_eq!(clone_title("Backup", Some("  ")), "Backup (Copy)");
        assert_eq!(clone_title("Backup", Some("Nightly")), "Nightly");
    }

    #[test]
    fn clone_title_of_a_long_title_still_validates() {
        for len in [MAX_TITLE_LENGTH - 7, MAX_TITLE_LENGTH - 1, MAX_TITLE_LENGTH] {
            let title = clone_title(&"é".repeat(len), None);
            assert!(title.ends_with(CLONE_TITLE_SUFFIX));
            assert_eq!(title.chars().count(), MAX_TITLE_LENGTH);
            assert!(validate_title(&title).is_ok());
        }
    }
}
