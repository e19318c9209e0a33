// Sprintlens board module
//
// Projects, their tasks and the three-column (ToDo/InProgress/Done) board,
// persisted in a local SQLite file.

pub mod database;
pub mod memory;
pub mod models;
pub mod store;

use async_trait::async_trait;
use thiserror::Error;

pub use database::{create_pool, create_schema, initialize_database, verify_schema};
pub use memory::MemoryBoard;
pub use models::{NewProject, NewTask, Project, Task, TaskStatus};
pub use store::BoardStore;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Invalid task status: {0}")]
    InvalidStatus(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Project not found: {0}")]
    ProjectNotFound(i64),
}

/// Read side of the board, the only part the analysis pipeline needs
#[async_trait]
pub trait BoardReader: Send + Sync {
    async fn get_project_by_id(&self, id: i64) -> Result<Option<Project>, BoardError>;
    async fn get_tasks_by_project(&self, project_id: i64) -> Result<Vec<Task>, BoardError>;
}
