//! MongoDB storage backend.
//!
//! Connection handling follows the gateway pattern: a bounded server
//! selection timeout on the URI plus a ping at startup, so an unreachable
//! database fails fast at boot instead of hanging the first request.

use bson::doc;
use futures_util::TryStreamExt;
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, IndexModel};
use uuid::Uuid;

use async_trait::async_trait;
use tasktrack_core::{Task, User};
use tasktrack_storage::{StorageError, TaskStore, UserStore};

use crate::document::{TaskDocument, UserDocument};

const TASKS_COLLECTION: &str = "tasks";
const USERS_COLLECTION: &str = "users";

/// MongoDB-backed [`TaskStore`] + [`UserStore`].
#[derive(Debug, Clone)]
pub struct MongoStorage {
    tasks: Collection<TaskDocument>,
    users: Collection<UserDocument>,
}

impl MongoStorage {
    /// Connects to MongoDB, verifies the connection, and ensures indexes.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, StorageError> {
        tracing::info!(db = %db_name, "Connecting to MongoDB");

        // Bound server selection so an unreachable database fails fast.
        let timeout_uri = if uri.contains('?') {
            format!("{uri}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000")
        } else {
            format!("{uri}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000")
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| StorageError::connection_error(format!("MongoDB connect: {e}")))?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StorageError::connection_error(format!("MongoDB ping: {e}")))?;

        let db = client.database(db_name);
        let storage = Self {
            tasks: db.collection(TASKS_COLLECTION),
            users: db.collection(USERS_COLLECTION),
        };
        storage.ensure_indexes().await?;

        tracing::info!(db = %db_name, "MongoDB connected");
        Ok(storage)
    }

    async fn ensure_indexes(&self) -> Result<(), StorageError> {
        let task_indexes = [
            IndexModel::builder().keys(doc! { "owner": 1 }).build(),
            IndexModel::builder().keys(doc! { "status": 1 }).build(),
            IndexModel::builder()
                .keys(doc! { "owner": 1, "status": 1 })
                .build(),
            IndexModel::builder()
                .keys(doc! { "owner": 1, "createdAt": -1 })
                .build(),
        ];
        for index in task_indexes {
            self.tasks
                .create_index(index)
                .await
                .map_err(map_mongo_error)?;
        }

        self.users
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await
            .map_err(map_mongo_error)?;

        Ok(())
    }
}

#[async_trait]
impl TaskStore for MongoStorage {
    async fn create(&self, task: &Task) -> Result<Task, StorageError> {
        let doc = TaskDocument::from(task);
        self.tasks.insert_one(&doc).await.map_err(|e| {
            if is_duplicate_key(&e) {
                StorageError::already_exists(TASKS_COLLECTION, task.id.to_string())
            } else {
                map_mongo_error(e)
            }
        })?;
        Ok(task.clone())
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Task>, StorageError> {
        let cursor = self
            .tasks
            .find(doc! { "owner": owner.to_string() })
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .await
            .map_err(map_mongo_error)?;

        let docs: Vec<TaskDocument> = cursor.try_collect().await.map_err(map_mongo_error)?;
        docs.into_iter().map(Task::try_from).collect()
    }

    async fn find_by_owner(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, StorageError> {
        self.tasks
            .find_one(doc! { "_id": id.to_string(), "owner": owner.to_string() })
            .await
            .map_err(map_mongo_error)?
            .map(Task::try_from)
            .transpose()
    }

    async fn update(&self, task: &Task) -> Result<Option<Task>, StorageError> {
        let filter = doc! { "_id": task.id.to_string(), "owner": task.owner.to_string() };
        let replacement = TaskDocument::from(task);
        self.tasks
            .find_one_and_replace(filter, &replacement)
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_mongo_error)?
            .map(Task::try_from)
            .transpose()
    }

    async fn delete_by_owner(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, StorageError> {
        // findOneAndDelete: the existence check and the removal are one
        // server-side operation.
        self.tasks
            .find_one_and_delete(doc! { "_id": id.to_string(), "owner": owner.to_string() })
            .await
            .map_err(map_mongo_error)?
            .map(Task::try_from)
            .transpose()
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }
}

#[async_trait]
impl UserStore for MongoStorage {
    async fn create_user(&self, user: &User) -> Result<User, StorageError> {
        let doc = UserDocument::from(user);
        self.users.insert_one(&doc).await.map_err(|e| {
            if is_duplicate_key(&e) {
                StorageError::already_exists(USERS_COLLECTION, user.email.clone())
            } else {
                map_mongo_error(e)
            }
        })?;
        Ok(user.clone())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        self.users
            .find_one(doc! { "email": email })
            .await
            .map_err(map_mongo_error)?
            .map(User::try_from)
            .transpose()
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StorageError> {
        self.users
            .find_one(doc! { "_id": id.to_string() })
            .await
            .map_err(map_mongo_error)?
            .map(User::try_from)
            .transpose()
    }
}

fn map_mongo_error(err: mongodb::error::Error) -> StorageError {
    StorageError::internal(format!("MongoDB: {err}"))
}

/// Detects the E11000 duplicate-key write error.
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        _ => false,
    }
}
