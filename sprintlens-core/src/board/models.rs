// Data models for the Sprintlens task board

use chrono::Local;
use serde::{Deserialize, Serialize};

use super::BoardError;

/// Date format used for project creation and modification dates
pub const PROJECT_DATE_FORMAT: &str = "%d/%m/%Y";
/// Date format used for task creation dates
pub const TASK_DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Column a task currently sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    ToDo,
    InProgress,
    Done,
}

impl TaskStatus {
    /// Board column order
    pub const ALL: [TaskStatus; 3] = [TaskStatus::ToDo, TaskStatus::InProgress, TaskStatus::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "ToDo",
            TaskStatus::InProgress => "InProgress",
            TaskStatus::Done => "Done",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = BoardError;

    /// Only the exact stored spellings are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ToDo" => Ok(TaskStatus::ToDo),
            "InProgress" => Ok(TaskStatus::InProgress),
            "Done" => Ok(TaskStatus::Done),
            other => Err(BoardError::InvalidStatus(other.to_string())),
        }
    }
}

/// A project on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_date: String,
    pub modified_date: Option<String>,
}

impl std::fmt::Display for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Project[{}]: {}", self.id, self.name)
    }
}

/// A task card belonging to a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub project_id: i64,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub created_date: String,
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Task[{}]: {} ({})", self.id, self.title, self.status)
    }
}

/// Task row as stored, before its status has been validated
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct TaskRow {
    pub id: i64,
    pub project_id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub created_date: String,
}

impl TryFrom<TaskRow> for Task {
    type Error = BoardError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<TaskStatus>()?;
        Ok(Task {
            id: row.id,
            project_id: row.project_id,
            title: row.title,
            description: row.description,
            status,
            created_date: row.created_date,
        })
    }
}

/// Input for creating a project
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub created_date: String,
}

impl NewProject {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            description: description.trim().to_string(),
            created_date: Local::now().format(PROJECT_DATE_FORMAT).to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), BoardError> {
        if self.name.trim().is_empty() {
            return Err(BoardError::Validation("project name must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Input for creating a task; new tasks always start in `ToDo`
#[derive(Debug, Clone)]
pub struct NewTask {
    pub project_id: i64,
    pub title: String,
    pub description: String,
    pub created_date: String,
}

impl NewTask {
    pub fn new(project_id: i64, title: &str, description: &str) -> Self {
        Self {
            project_id,
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            created_date: Local::now().format(TASK_DATE_FORMAT).to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), BoardError> {
        if self.title.trim().is_empty() {
            return Err(BoardError::Validation("task title must not be empty".to_string()));
        }
        if self.project_id <= 0 {
            return Err(BoardError::Validation(format!(
                "invalid project id: {}",
                self.project_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_task_status_round_trips_stored_spelling() {
        for status in TaskStatus::ALL {
            assert_eq!(TaskStatus::from_str(&status.to_string()).unwrap(), status);
        }
    }

    #[test]
    fn test_task_status_rejects_unknown_values() {
        assert!(TaskStatus::from_str("todo").is_err());
        assert!(TaskStatus::from_str("Blocked").is_err());
        assert!(TaskStatus::from_str("").is_err());
    }

    #[test]
    fn test_task_row_with_bad_status_is_rejected() {
        let row = TaskRow {
            id: 7,
            project_id: 1,
            title: "Write docs".to_string(),
            description: String::new(),
            status: "Review".to_string(),
            created_date: "01/01/2024 10:00".to_string(),
        };

        match Task::try_from(row) {
            Err(BoardError::InvalidStatus(raw)) => assert_eq!(raw, "Review"),
            other => panic!("expected InvalidStatus, got {:?}", other),
        }
    }

    #[test]
    fn test_new_project_trims_and_validates() {
        let project = NewProject::new("  Demo  ", " first board ");
        assert_eq!(project.name, "Demo");
        assert_eq!(project.description, "first board");
        assert!(project.validate().is_ok());

        assert!(NewProject::new("   ", "").validate().is_err());
    }

    #[test]
    fn test_new_task_validation() {
        assert!(NewTask::new(1, "Fix bug", "").validate().is_ok());
        assert!(NewTask::new(1, "  ", "").validate().is_err());
        assert!(NewTask::new(0, "Fix bug", "").validate().is_err());
    }
}
