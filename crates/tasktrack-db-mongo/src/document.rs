//! BSON document forms of the domain types.
//!
//! Timestamps are stored as native BSON dates (millisecond precision) so the
//! `{owner: 1, createdAt: -1}` index sorts correctly; ids are stored as their
//! string form. Conversion back to the domain types is infallible apart from
//! id parsing, which only fails on hand-edited documents.

use bson::DateTime;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use tasktrack_core::{Task, TaskStatus, User};
use tasktrack_storage::StorageError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TaskDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime>,
    pub owner: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl From<&Task> for TaskDocument {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.to_string(),
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            due_date: task.due_date.map(DateTime::from_time_0_3),
            owner: task.owner.to_string(),
            created_at: DateTime::from_time_0_3(task.created_at),
            updated_at: DateTime::from_time_0_3(task.updated_at),
        }
    }
}

impl TryFrom<TaskDocument> for Task {
    type Error = StorageError;

    fn try_from(doc: TaskDocument) -> Result<Self, Self::Error> {
        Ok(Task {
            id: parse_id("tasks", &doc.id)?,
            title: doc.title,
            description: doc.description,
            status: doc.status,
            due_date: doc.due_date.map(to_offset_date_time),
            owner: parse_id("tasks", &doc.owner)?,
            created_at: to_offset_date_time(doc.created_at),
            updated_at: to_offset_date_time(doc.updated_at),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime,
}

impl From<&User> for UserDocument {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            created_at: DateTime::from_time_0_3(user.created_at),
        }
    }
}

impl TryFrom<UserDocument> for User {
    type Error = StorageError;

    fn try_from(doc: UserDocument) -> Result<Self, Self::Error> {
        Ok(User {
            id: parse_id("users", &doc.id)?,
            name: doc.name,
            email: doc.email,
            password_hash: doc.password_hash,
            created_at: to_offset_date_time(doc.created_at),
        })
    }
}

fn parse_id(collection: &str, raw: &str) -> Result<Uuid, StorageError> {
    Uuid::parse_str(raw).map_err(|_| {
        StorageError::invalid_document(format!("{collection}: malformed id '{raw}'"))
    })
}

fn to_offset_date_time(dt: DateTime) -> OffsetDateTime {
    dt.to_time_0_3()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasktrack_core::TaskFields;

    #[test]
    fn task_document_roundtrip_preserves_fields() {
        let owner = Uuid::new_v4();
        let fields = TaskFields {
            title: Some("Buy milk".to_string()),
            description: Some("two liters".to_string()),
            status: Some("completed".to_string()),
            due_date: Some("2026-03-01T12:00:00Z".to_string()),
        }
        .validate_for_create()
        .unwrap();
        let task = Task::new(owner, fields);

        let doc = TaskDocument::from(&task);
        let back = Task::try_from(doc).unwrap();

        assert_eq!(back.id, task.id);
        assert_eq!(back.owner, owner);
        assert_eq!(back.title, "Buy milk");
        assert_eq!(back.description.as_deref(), Some("two liters"));
        assert_eq!(back.status, TaskStatus::Completed);
        // BSON dates carry millisecond precision; compare at that grain.
        assert_eq!(
            back.created_at.unix_timestamp_nanos() / 1_000_000,
            task.created_at.unix_timestamp_nanos() / 1_000_000
        );
        assert_eq!(back.due_date, task.due_date);
    }

    #[test]
    fn malformed_id_is_an_invalid_document() {
        let doc = TaskDocument {
            id: "not-a-uuid".to_string(),
            title: "t".to_string(),
            description: None,
            status: TaskStatus::Pending,
            due_date: None,
            owner: Uuid::new_v4().to_string(),
            created_at: DateTime::now(),
            updated_at: DateTime::now(),
        };
        assert!(matches!(
            Task::try_from(doc),
            Err(StorageError::InvalidDocument { .. })
        ));
    }
}
