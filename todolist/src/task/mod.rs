use crate::entities::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::*;

pub mod api;
mod pagination;

pub use pagination::{DEFAULT_LIMIT, DEFAULT_PAGE, Pagination};

/// Status assigned to tasks created or updated without one.
pub const DEFAULT_STATUS: &str = "new";

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Task {
    id: i32,
    title: String,
    description: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(
        id: i32,
        title: String,
        description: String,
        status: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            description,
            status,
            created_at,
            updated_at,
        }
    }

    /// Returns the ID of the task.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Returns the title of the task.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, empty when none was given.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the status of the task.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Returns when the task was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the task was last written.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Task::new(
            model.id,
            model.title,
            model.description,
            model.status,
            model.created_at,
            model.updated_at,
        )
    }
}

/// The client-writable fields of a task.
#[derive(Debug, PartialEq, Clone, Eq)]
pub struct TaskChanges {
    pub title: String,
    pub description: String,
    pub status: String,
}

impl TaskChanges {
    /// Creates a change set. A missing or empty status becomes [`DEFAULT_STATUS`].
    pub fn new(title: String, description: String, status: Option<String>) -> Self {
        let status = status
            .filter(|status| !status.is_empty())
            .unwrap_or_else(|| DEFAULT_STATUS.to_string());
        Self {
            title,
            description,
            status,
        }
    }
}

/// Error type for TaskRepository operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskRepositoryError {
    /// No task exists with the requested ID.
    #[error("Task with ID {0} not found")]
    NotFound(i32),
    /// Represents a database error.
    #[error("{0}")]
    Database(#[from] DbErr),
}

/// Storage operations on tasks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task and returns it with its generated ID and timestamps.
    async fn create(&self, changes: TaskChanges) -> Result<Task, TaskRepositoryError>;

    /// Returns one page of tasks, newest first.
    async fn list(&self, pagination: Pagination) -> Result<Vec<Task>, TaskRepositoryError>;

    /// Overwrites the title, description and status of an existing task.
    async fn update_by_id(
        &self,
        id: i32,
        changes: TaskChanges,
    ) -> Result<Task, TaskRepositoryError>;

    /// Permanently removes a task and returns what was deleted.
    async fn delete_by_id(&self, id: i32) -> Result<Task, TaskRepositoryError>;
}

/// [`TaskRepository`] backed by the `tasks` table.
#[derive(Debug, Clone)]
pub struct DatabaseTaskRepository {
    db: DatabaseConnection,
}

impl DatabaseTaskRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_existing(&self, id: i32) -> Result<task::Model, TaskRepositoryError> {
        task::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(TaskRepositoryError::NotFound(id))
    }
}

#[async_trait]
impl TaskRepository for DatabaseTaskRepository {
    #[tracing::instrument(skip(self))]
    async fn create(&self, changes: TaskChanges) -> Result<Task, TaskRepositoryError> {
        let now = Utc::now();
        let active_model = task::ActiveModel {
            title: ActiveValue::Set(changes.title),
            description: ActiveValue::Set(changes.description),
            status: ActiveValue::Set(changes.status),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };
        let created_model = active_model.insert(&self.db).await?;
        Ok(Task::from(created_model))
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self, pagination: Pagination) -> Result<Vec<Task>, TaskRepositoryError> {
        let tasks = task::Entity::find()
            .order_by_desc(task::Column::CreatedAt)
            .order_by_desc(task::Column::Id)
            .offset(pagination.offset())
            .limit(pagination.limit())
            .all(&self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }

    #[tracing::instrument(skip(self))]
    async fn update_by_id(
        &self,
        id: i32,
        changes: TaskChanges,
    ) -> Result<Task, TaskRepositoryError> {
        let task_to_update = self.find_existing(id).await?;

        let mut active_model: task::ActiveModel = task_to_update.into();
        active_model.title = ActiveValue::Set(changes.title);
        active_model.description = ActiveValue::Set(changes.description);
        active_model.status = ActiveValue::Set(changes.status);
        active_model.updated_at = ActiveValue::Set(Utc::now());
        let updated_model = active_model.update(&self.db).await?;

        Ok(Task::from(updated_model))
    }

    #[tracing::instrument(skip(self))]
    async fn delete_by_id(&self, id: i32) -> Result<Task, TaskRepositoryError> {
        let task_to_delete = self.find_existing(id).await?;

        task::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(Task::from(task_to_delete))
    }
}
