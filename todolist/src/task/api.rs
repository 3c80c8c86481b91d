use crate::task::{Pagination, Task, TaskChanges, TaskRepository, TaskRepositoryError};
use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// JSON representation of a Task for API responses.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TaskJson {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            id: task.id(),
            title: task.title().to_string(),
            description: task.description().to_string(),
            status: task.status().to_string(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }
}

/// Request body for creating or updating a task.
///
/// `id` and timestamps are ignored if a client sends them.
#[derive(Debug, Deserialize)]
pub struct TaskPayload {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

impl From<TaskPayload> for TaskChanges {
    fn from(payload: TaskPayload) -> Self {
        TaskChanges::new(
            payload.title,
            payload.description.unwrap_or_default(),
            payload.status,
        )
    }
}

/// Raw pagination parameters; parsing and clamping happen in [`Pagination`].
#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    page: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error type for task API handlers.
#[derive(Debug, thiserror::Error)]
pub enum TaskApiError {
    /// The request body could not be decoded into a task.
    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),
    /// The path segment is not an integer task ID.
    #[error("Invalid task ID '{0}'")]
    InvalidId(String),
    #[error("Task with ID {0} not found")]
    NotFound(i32),
    /// Any other storage failure. The message is passed through to the caller.
    #[error("{0}")]
    Storage(sea_orm::DbErr),
}

impl From<TaskRepositoryError> for TaskApiError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(id) => TaskApiError::NotFound(id),
            TaskRepositoryError::Database(db_err) => TaskApiError::Storage(db_err),
        }
    }
}

impl IntoResponse for TaskApiError {
    fn into_response(self) -> Response {
        let status_code = match &self {
            TaskApiError::InvalidBody(_) | TaskApiError::InvalidId(_) => StatusCode::BAD_REQUEST,
            TaskApiError::NotFound(_) => StatusCode::NOT_FOUND,
            TaskApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status_code.is_server_error() {
            tracing::error!("Task request failed: {}", self);
        } else {
            tracing::warn!("Task request rejected: {}", self);
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status_code, Json(body)).into_response()
    }
}

#[derive(Clone)]
pub struct TaskState {
    pub repository: Arc<dyn TaskRepository>,
}

impl TaskState {
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self { repository }
    }
}

fn parse_task_id(raw: &str) -> Result<i32, TaskApiError> {
    raw.parse()
        .map_err(|_| TaskApiError::InvalidId(raw.to_string()))
}

/// Handler for POST /tasks.
#[tracing::instrument(skip(state, payload))]
pub async fn create_task_handler(
    State(state): State<Arc<TaskState>>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskJson>), TaskApiError> {
    let Json(payload) = payload?;

    let task = state.repository.create(payload.into()).await?;
    tracing::info!("Created task {}", task.id());
    Ok((StatusCode::CREATED, Json(TaskJson::from(task))))
}

/// Handler for GET /tasks.
///
/// A query string that cannot be decoded at all lists the first page with the default limit.
#[tracing::instrument(skip(state))]
pub async fn list_tasks_handler(
    State(state): State<Arc<TaskState>>,
    query: Result<Query<TaskListQuery>, QueryRejection>,
) -> Result<Json<Vec<TaskJson>>, TaskApiError> {
    let pagination = match query {
        Ok(Query(query)) => Pagination::from_query(query.page.as_deref(), query.limit.as_deref()),
        Err(rejection) => {
            tracing::warn!("Ignoring undecodable pagination query: {}", rejection);
            Pagination::default()
        }
    };

    let tasks = state.repository.list(pagination).await?;
    tracing::info!(
        page = pagination.page(),
        limit = pagination.limit(),
        "Returning {} tasks",
        tasks.len()
    );
    Ok(Json(tasks.into_iter().map(TaskJson::from).collect()))
}

/// Handler for PUT /tasks/{id}.
#[tracing::instrument(skip(state, payload))]
pub async fn update_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<String>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> Result<Json<MessageResponse>, TaskApiError> {
    let id = parse_task_id(&id)?;
    let Json(payload) = payload?;

    state.repository.update_by_id(id, payload.into()).await?;
    tracing::info!("Updated task {}", id);
    Ok(Json(MessageResponse::new("Task updated successfully")))
}

/// Handler for DELETE /tasks/{id}.
#[tracing::instrument(skip(state))]
pub async fn delete_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, TaskApiError> {
    let id = parse_task_id(&id)?;

    state.repository.delete_by_id(id).await?;
    tracing::info!("Deleted task {}", id);
    Ok(Json(MessageResponse::new("Task deleted successfully")))
}

/// Creates and returns the task router.
pub fn create_task_router(state: Arc<TaskState>) -> Router {
    Router::new()
        .route("/tasks", get(list_tasks_handler).post(create_task_handler))
        .route(
            "/tasks/{id}",
            put(update_task_handler).delete(delete_task_handler),
        )
        .with_state(state)
}
