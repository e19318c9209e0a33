use tracing::debug;

use crate::analysis::cache::Fingerprint;
use crate::board::{BoardError, BoardReader, Project, Task, TaskStatus};

/// Project state captured for a single analysis request
#[derive(Debug, Clone)]
pub struct ProjectAnalysisSnapshot {
    pub project_id: i64,
    pub project: Option<Project>,
    pub all: Vec<Task>,
    pub todo: Vec<Task>,
    pub in_progress: Vec<Task>,
    pub done: Vec<Task>,
}

impl ProjectAnalysisSnapshot {
    pub fn new(project_id: i64, project: Option<Project>, tasks: Vec<Task>) -> Self {
        let mut todo = Vec::new();
        let mut in_progress = Vec::new();
        let mut done = Vec::new();

        for task in &tasks {
            match task.status {
                TaskStatus::ToDo => todo.push(task.clone()),
                TaskStatus::InProgress => in_progress.push(task.clone()),
                TaskStatus::Done => done.push(task.clone()),
            }
        }

        Self {
            project_id,
            project,
            all: tasks,
            todo,
            in_progress,
            done,
        }
    }

    pub fn total(&self) -> usize {
        self.all.len()
    }

    pub fn tasks(&self, status: TaskStatus) -> &[Task] {
        match status {
            TaskStatus::ToDo => &self.todo,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Done => &self.done,
        }
    }

    pub fn count(&self, status: TaskStatus) -> usize {
        self.tasks(status).len()
    }

    /// Share of tasks in `Done`; `None` when there are no tasks at all
    pub fn completion_ratio(&self) -> Option<f64> {
        if self.all.is_empty() {
            None
        } else {
            Some(self.done.len() as f64 / self.all.len() as f64)
        }
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(self.project_id, &self.all)
    }
}

/// Read a project and its tasks and bucket the tasks by status.
///
/// A missing project is not an error here; it shows up as `project: None`.
pub async fn collect(
    reader: &dyn BoardReader,
    project_id: i64,
) -> Result<ProjectAnalysisSnapshot, BoardError> {
    let project = reader.get_project_by_id(project_id).await?;
    let tasks = reader.get_tasks_by_project(project_id).await?;

    let snapshot = ProjectAnalysisSnapshot::new(project_id, project, tasks);
    debug!(
        project_id,
        todo = snapshot.todo.len(),
        in_progress = snapshot.in_progress.len(),
        done = snapshot.done.len(),
        total = snapshot.total(),
        "Collected project snapshot"
    );
    Ok(snapshot)
}
