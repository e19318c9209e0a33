// In-memory board reader, for driving the analysis pipeline without SQLite

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::models::{Project, Task, TaskStatus};
use super::{BoardError, BoardReader};

#[derive(Default)]
struct Inner {
    projects: BTreeMap<i64, Project>,
    tasks: BTreeMap<i64, Task>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryBoard {
    inner: Mutex<Inner>,
}

impl MemoryBoard {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_project(&self, name: &str, description: &str) -> Project {
        let mut inner = self.inner();
        let project = Project {
            id: inner.next_id(),
            name: name.to_string(),
            description: description.to_string(),
            created_date: "01/01/2024".to_string(),
            modified_date: None,
        };
        inner.projects.insert(project.id, project.clone());
        project
    }

    pub fn add_task(&self, project_id: i64, title: &str, status: TaskStatus) -> Task {
        self.add_task_with_description(project_id, title, "", status)
    }

    pub fn add_task_with_description(
        &self,
        project_id: i64,
        title: &str,
        description: &str,
        status: TaskStatus,
    ) -> Task {
        let mut inner = self.inner();
        let task = Task {
            id: inner.next_id(),
            project_id,
            title: title.to_string(),
            description: description.to_string(),
            status,
            created_date: "01/01/2024 09:00".to_string(),
        };
        inner.tasks.insert(task.id, task.clone());
        task
    }

    pub fn set_status(&self, task_id: i64, status: TaskStatus) -> bool {
        match self.inner().tasks.get_mut(&task_id) {
            Some(task) => {
                task.status = status;
                true
            }
            None => false,
        }
    }

    pub fn set_title(&self, task_id: i64, title: &str) -> bool {
        match self.inner().tasks.get_mut(&task_id) {
            Some(task) => {
                task.title = title.to_string();
                true
            }
            None => false,
        }
    }

    pub fn remove_project(&self, project_id: i64) -> bool {
        let mut inner = self.inner();
        inner.tasks.retain(|_, task| task.project_id != project_id);
        inner.projects.remove(&project_id).is_some()
    }
}

#[async_trait]
impl BoardReader for MemoryBoard {
    async fn get_project_by_id(&self, id: i64) -> Result<Option<Project>, BoardError> {
        Ok(self.inner().projects.get(&id).cloned())
    }

    async fn get_tasks_by_project(&self, project_id: i64) -> Result<Vec<Task>, BoardError> {
        Ok(self
            .inner()
            .tasks
            .values()
            .filter(|task| task.project_id == project_id)
            .cloned()
            .collect())
    }
}
