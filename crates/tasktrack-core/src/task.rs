//! Task domain model and field validation.
//!
//! A task belongs to exactly one owner and is only ever visible or mutable
//! through that owner's identity. All request-side field validation lives
//! here so the HTTP layer can reject bad input before any storage or cache
//! call is made.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use crate::error::CoreError;

/// Maximum number of characters in a task title.
pub const TITLE_MAX_CHARS: usize = 200;
/// Maximum number of characters in a task description.
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

/// Completion state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(CoreError::invalid_status(other)),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<OffsetDateTime>,
    pub owner: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Task {
    /// Creates a task for `owner` from validated fields.
    pub fn new(owner: Uuid, fields: ValidatedTaskFields) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            title: fields.title.unwrap_or_default(),
            description: fields.description,
            status: fields.status.unwrap_or_default(),
            due_date: fields.due_date,
            owner,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a partial update. Only fields present in `fields` change;
    /// `updated_at` is refreshed.
    pub fn apply(&mut self, fields: ValidatedTaskFields) {
        if let Some(title) = fields.title {
            self.title = title;
        }
        if let Some(description) = fields.description {
            self.description = Some(description);
        }
        if let Some(status) = fields.status {
            self.status = status;
        }
        if let Some(due_date) = fields.due_date {
            self.due_date = Some(due_date);
        }
        self.updated_at = OffsetDateTime::now_utc();
    }
}

/// Raw task fields as they arrive in a create or update request body.
///
/// Everything is optional at this layer; `validate_for_create` /
/// `validate_partial` decide what is required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<String>,
}

/// Task fields after validation, ready to construct or patch a [`Task`].
#[derive(Debug, Clone, Default)]
pub struct ValidatedTaskFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<OffsetDateTime>,
}

impl TaskFields {
    /// Validates fields for task creation. `title` is required; everything
    /// else falls back to its default.
    pub fn validate_for_create(self) -> Result<ValidatedTaskFields, CoreError> {
        let mut validated = self.validate_partial()?;
        if validated.title.is_none() {
            return Err(CoreError::validation("Title is required (max 200 chars)"));
        }
        if validated.status.is_none() {
            validated.status = Some(TaskStatus::default());
        }
        Ok(validated)
    }

    /// Validates only the fields that are present, for partial updates.
    pub fn validate_partial(self) -> Result<ValidatedTaskFields, CoreError> {
        let title = self.title.map(|t| validate_title(&t)).transpose()?;
        let description = self
            .description
            .map(|d| validate_description(&d))
            .transpose()?;
        let status = self.status.map(|s| s.parse::<TaskStatus>()).transpose()?;
        let due_date = self.due_date.map(|d| parse_due_date(&d)).transpose()?;
        Ok(ValidatedTaskFields {
            title,
            description,
            status,
            due_date,
        })
    }
}

/// Validates and normalizes a title: trimmed, 1..=200 characters.
pub fn validate_title(title: &str) -> Result<String, CoreError> {
    let trimmed = title.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > TITLE_MAX_CHARS {
        return Err(CoreError::validation("Title is required (max 200 chars)"));
    }
    Ok(trimmed.to_string())
}

/// Validates and normalizes a description: trimmed, at most 1000 characters.
pub fn validate_description(description: &str) -> Result<String, CoreError> {
    let trimmed = description.trim();
    if trimmed.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(CoreError::validation("Description max 1000 chars"));
    }
    Ok(trimmed.to_string())
}

/// Parses a due date from its RFC3339 wire form.
pub fn parse_due_date(value: &str) -> Result<OffsetDateTime, CoreError> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|_| CoreError::invalid_date_time(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(title: &str) -> TaskFields {
        TaskFields {
            title: Some(title.to_string()),
            ..TaskFields::default()
        }
    }

    #[test]
    fn title_boundary_200_accepted_201_rejected() {
        let ok = "x".repeat(200);
        assert_eq!(validate_title(&ok).unwrap(), ok);

        let too_long = "x".repeat(201);
        assert!(validate_title(&too_long).is_err());
    }

    #[test]
    fn title_is_trimmed_and_empty_rejected() {
        assert_eq!(validate_title("  Buy milk  ").unwrap(), "Buy milk");
        assert!(validate_title("   ").is_err());
        assert!(validate_title("").is_err());
    }

    #[test]
    fn description_boundary_1000_accepted_1001_rejected() {
        let ok = "d".repeat(1000);
        assert_eq!(validate_description(&ok).unwrap(), ok);
        assert!(validate_description(&"d".repeat(1001)).is_err());
    }

    #[test]
    fn status_parses_only_known_values() {
        assert_eq!("pending".parse::<TaskStatus>().unwrap(), TaskStatus::Pending);
        assert_eq!(
            "completed".parse::<TaskStatus>().unwrap(),
            TaskStatus::Completed
        );
        assert!("done".parse::<TaskStatus>().is_err());
        assert!("PENDING".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn due_date_must_be_rfc3339() {
        assert!(parse_due_date("2026-03-01T12:00:00Z").is_ok());
        assert!(parse_due_date("next tuesday").is_err());
    }

    #[test]
    fn create_requires_title_and_defaults_status() {
        let validated = fields("Buy milk").validate_for_create().unwrap();
        assert_eq!(validated.title.as_deref(), Some("Buy milk"));
        assert_eq!(validated.status, Some(TaskStatus::Pending));

        let missing = TaskFields::default().validate_for_create();
        assert!(missing.is_err());
    }

    #[test]
    fn partial_update_leaves_absent_fields_untouched() {
        let owner = Uuid::new_v4();
        let mut task = Task::new(owner, fields("Buy milk").validate_for_create().unwrap());
        let before_updated_at = task.updated_at;

        let patch = TaskFields {
            status: Some("completed".to_string()),
            ..TaskFields::default()
        }
        .validate_partial()
        .unwrap();
        task.apply(patch);

        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.status, TaskStatus::Completed);
        assert!(task.updated_at >= before_updated_at);
    }

    #[test]
    fn wire_format_is_camel_case() {
        let owner = Uuid::new_v4();
        let task = Task::new(owner, fields("Buy milk").validate_for_create().unwrap());
        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert_eq!(json["status"], "pending");
        // Absent optionals are omitted, not null
        assert!(json.get("description").is_none());
        assert!(json.get("dueDate").is_none());
    }
}
