// Board data-access facade: one connection, one lock

use std::path::Path;

use async_trait::async_trait;
use chrono::Local;
use futures::future::BoxFuture;
use sqlx::{SqliteConnection, SqlitePool};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::database::{create_memory_pool, create_pool, initialize_database};
use super::models::{
    NewProject, NewTask, Project, Task, TaskRow, TaskStatus, PROJECT_DATE_FORMAT,
};
use super::{BoardError, BoardReader};

const PROJECT_COLUMNS: &str = "id, name, description, created_date, modified_date";
const TASK_COLUMNS: &str = "id, project_id, title, description, status, created_date";

/// SQLite-backed board storage.
///
/// Every operation holds `lock` for its full duration, so CRUD calls are
/// serialized regardless of caller.
pub struct BoardStore {
    pool: SqlitePool,
    lock: Mutex<()>,
}

impl BoardStore {
    /// Open (creating if needed) the board database at `path`
    pub async fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let pool = create_pool(&path).await?;
        initialize_database(&pool).await?;
        info!("Board database ready at: {}", path.as_ref().display());
        Ok(Self::from_pool(pool))
    }

    /// Open a throwaway in-memory board
    pub async fn open_in_memory() -> anyhow::Result<Self> {
        let pool = create_memory_pool().await?;
        initialize_database(&pool).await?;
        Ok(Self::from_pool(pool))
    }

    fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            lock: Mutex::new(()),
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>, BoardError> {
        let _guard = self.lock.lock().await;

        let projects = sqlx::query_as::<_, Project>(&format!(
            "SELECT {} FROM projects ORDER BY id",
            PROJECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!("Retrieved {} projects", projects.len());
        Ok(projects)
    }

    pub async fn insert_project(&self, project: NewProject) -> Result<Project, BoardError> {
        project.validate()?;
        let _guard = self.lock.lock().await;

        let id = sqlx::query(
            "INSERT INTO projects (name, description, created_date) VALUES (?1, ?2, ?3)",
        )
        .bind(&project.name)
        .bind(&project.description)
        .bind(&project.created_date)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        info!("Project inserted: {} ({})", id, project.name);
        Ok(Project {
            id,
            name: project.name,
            description: project.description,
            created_date: project.created_date,
            modified_date: None,
        })
    }

    /// Persist name/description changes and stamp the modification date
    pub async fn update_project(&self, project: &Project) -> Result<bool, BoardError> {
        if project.name.trim().is_empty() {
            return Err(BoardError::Validation("project name must not be empty".to_string()));
        }
        let _guard = self.lock.lock().await;

        let modified = Local::now().format(PROJECT_DATE_FORMAT).to_string();
        let result = sqlx::query(
            "UPDATE projects SET name = ?1, description = ?2, modified_date = ?3 WHERE id = ?4",
        )
        .bind(project.name.trim())
        .bind(project.description.trim())
        .bind(&modified)
        .bind(project.id)
        .execute(&self.pool)
        .await?;

        let updated = result.rows_affected() > 0;
        debug!("Project {} updated: {}", project.id, updated);
        Ok(updated)
    }

    /// Delete a project together with all of its tasks
    pub async fn delete_project(&self, id: i64) -> Result<bool, BoardError> {
        let _guard = self.lock.lock().await;

        let mut tx = self.pool.begin().await?;
        let tasks = sqlx::query("DELETE FROM tasks WHERE project_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let projects = sqlx::query("DELETE FROM projects WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;

        info!("Project {} deleted ({} tasks removed)", id, tasks);
        Ok(projects > 0)
    }

    pub async fn get_task(&self, id: i64) -> Result<Option<Task>, BoardError> {
        let _guard = self.lock.lock().await;

        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {} FROM tasks WHERE id = ?1",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Task::try_from).transpose()
    }

    pub async fn insert_task(&self, task: NewTask) -> Result<Task, BoardError> {
        task.validate()?;
        let _guard = self.lock.lock().await;

        let exists: bool = sqlx::query_scalar("SELECT COUNT(*) > 0 FROM projects WHERE id = ?1")
            .bind(task.project_id)
            .fetch_one(&self.pool)
            .await?;
        if !exists {
            return Err(BoardError::ProjectNotFound(task.project_id));
        }

        let status = TaskStatus::ToDo;
        let id = sqlx::query(
            "INSERT INTO tasks (project_id, title, description, status, created_date) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(task.project_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(status.as_str())
        .bind(&task.created_date)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        info!("Task inserted: {} ({}) in project {}", id, task.title, task.project_id);
        Ok(Task {
            id,
            project_id: task.project_id,
            title: task.title,
            description: task.description,
            status,
            created_date: task.created_date,
        })
    }

    /// Persist title, description and status of an existing task
    pub async fn update_task(&self, task: &Task) -> Result<bool, BoardError> {
        if task.title.trim().is_empty() {
            return Err(BoardError::Validation("task title must not be empty".to_string()));
        }
        let _guard = self.lock.lock().await;

        let result = sqlx::query(
            "UPDATE tasks SET title = ?1, description = ?2, status = ?3 WHERE id = ?4",
        )
        .bind(task.title.trim())
        .bind(task.description.trim())
        .bind(task.status.as_str())
        .bind(task.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Move a task to another board column
    pub async fn move_task(&self, id: i64, status: TaskStatus) -> Result<bool, BoardError> {
        let _guard = self.lock.lock().await;

        let result = sqlx::query("UPDATE tasks SET status = ?1 WHERE id = ?2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        let moved = result.rows_affected() > 0;
        if moved {
            info!("Task {} moved to {}", id, status);
        }
        Ok(moved)
    }

    pub async fn delete_task(&self, id: i64) -> Result<bool, BoardError> {
        let _guard = self.lock.lock().await;

        let result = sqlx::query("DELETE FROM tasks WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Run a unit of work inside one transaction.
    ///
    /// Commits when `work` returns `Ok`, rolls back and returns the error otherwise.
    pub async fn execute_transaction<T, F>(&self, work: F) -> Result<T, BoardError>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T, BoardError>>
            + Send,
    {
        let _guard = self.lock.lock().await;

        let mut tx = self.pool.begin().await?;
        match work(&mut *tx).await {
            Ok(value) => {
                tx.commit().await?;
                debug!("Transaction committed");
                Ok(value)
            }
            Err(e) => {
                error!("Transaction error, rolling back: {}", e);
                tx.rollback().await?;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl BoardReader for BoardStore {
    async fn get_project_by_id(&self, id: i64) -> Result<Option<Project>, BoardError> {
        let _guard = self.lock.lock().await;

        let project = sqlx::query_as::<_, Project>(&format!(
            "SELECT {} FROM projects WHERE id = ?1",
            PROJECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    async fn get_tasks_by_project(&self, project_id: i64) -> Result<Vec<Task>, BoardError> {
        let _guard = self.lock.lock().await;

        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {} FROM tasks WHERE project_id = ?1 ORDER BY id",
            TASK_COLUMNS
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        let mut tasks = Vec::with_capacity(rows.len());
        for row in rows {
            let (id, raw_status) = (row.id, row.status.clone());
            match Task::try_from(row) {
                Ok(task) => tasks.push(task),
                Err(_) => warn!(
                    "Quarantined task {} in project {}: unrecognized status '{}'",
                    id, project_id, raw_status
                ),
            }
        }

        debug!("Found {} tasks for project {}", tasks.len(), project_id);
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_project() -> (BoardStore, Project) {
        let store = BoardStore::open_in_memory().await.unwrap();
        let project = store
            .insert_project(NewProject::new("Demo", "test board"))
            .await
            .unwrap();
        (store, project)
    }

    #[tokio::test]
    async fn test_insert_and_get_project() {
        let (store, project) = store_with_project().await;

        let loaded = store.get_project_by_id(project.id).await.unwrap().unwrap();
        assert_eq!(loaded, project);
        assert!(store.get_project_by_id(project.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_project_rejects_blank_name() {
        let store = BoardStore::open_in_memory().await.unwrap();
        let result = store.insert_project(NewProject::new("  ", "")).await;
        assert!(matches!(result, Err(BoardError::Validation(_))));
        assert!(store.list_projects().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_new_tasks_start_in_todo() {
        let (store, project) = store_with_project().await;

        let task = store
            .insert_task(NewTask::new(project.id, "Write login form", "html + css"))
            .await
            .unwrap();
        assert_eq!(task.status, TaskStatus::ToDo);

        let tasks = store.get_tasks_by_project(project.id).await.unwrap();
        assert_eq!(tasks, vec![task]);
    }

    #[tokio::test]
    async fn test_insert_task_for_missing_project() {
        let store = BoardStore::open_in_memory().await.unwrap();
        let result = store.insert_task(NewTask::new(42, "Orphan", "")).await;
        assert!(matches!(result, Err(BoardError::ProjectNotFound(42))));
    }

    #[tokio::test]
    async fn test_move_and_update_task() {
        let (store, project) = store_with_project().await;
        let mut task = store
            .insert_task(NewTask::new(project.id, "Deploy", ""))
            .await
            .unwrap();

        assert!(store.move_task(task.id, TaskStatus::InProgress).await.unwrap());
        assert_eq!(
            store.get_task(task.id).await.unwrap().unwrap().status,
            TaskStatus::InProgress
        );

        task.title = "Deploy to staging".to_string();
        task.status = TaskStatus::Done;
        assert!(store.update_task(&task).await.unwrap());
        let loaded = store.get_task(task.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, "Deploy to staging");
        assert_eq!(loaded.status, TaskStatus::Done);

        assert!(!store.move_task(9999, TaskStatus::Done).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_project_sets_modified_date() {
        let (store, mut project) = store_with_project().await;
        project.name = "Demo v2".to_string();

        assert!(store.update_project(&project).await.unwrap());
        let loaded = store.get_project_by_id(project.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Demo v2");
        assert!(loaded.modified_date.is_some());
    }

    #[tokio::test]
    async fn test_delete_project_removes_tasks() {
        let (store, project) = store_with_project().await;
        store
            .insert_task(NewTask::new(project.id, "One", ""))
            .await
            .unwrap();
        store
            .insert_task(NewTask::new(project.id, "Two", ""))
            .await
            .unwrap();

        assert!(store.delete_project(project.id).await.unwrap());
        assert!(store.get_project_by_id(project.id).await.unwrap().is_none());
        assert!(store.get_tasks_by_project(project.id).await.unwrap().is_empty());
        assert!(!store.delete_project(project.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_task() {
        let (store, project) = store_with_project().await;
        let task = store
            .insert_task(NewTask::new(project.id, "Remove me", ""))
            .await
            .unwrap();

        assert!(store.delete_task(task.id).await.unwrap());
        assert!(store.get_task(task.id).await.unwrap().is_none());
        assert!(!store.delete_task(task.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_transaction_commits_on_success() {
        let (store, project) = store_with_project().await;
        let project_id = project.id;

        let inserted = store
            .execute_transaction(|conn| {
                Box::pin(async move {
                    for title in ["A", "B"] {
                        sqlx::query(
                            "INSERT INTO tasks (project_id, title, status, created_date) \
                             VALUES (?1, ?2, 'ToDo', '01/01/2024 09:00')",
                        )
                        .bind(project_id)
                        .bind(title)
                        .execute(&mut *conn)
                        .await?;
                    }
                    Ok(2)
                })
            })
            .await
            .unwrap();

        assert_eq!(inserted, 2);
        assert_eq!(store.get_tasks_by_project(project_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_transaction_rolls_back_on_error() {
        let (store, project) = store_with_project().await;
        let project_id = project.id;

        let result: Result<(), BoardError> = store
            .execute_transaction(|conn| {
                Box::pin(async move {
                    sqlx::query(
                        "INSERT INTO tasks (project_id, title, status, created_date) \
                         VALUES (?1, 'Half done', 'ToDo', '01/01/2024 09:00')",
                    )
                    .bind(project_id)
                    .execute(&mut *conn)
                    .await?;
                    Err(BoardError::Validation("abort".to_string()))
                })
            })
            .await;

        assert!(result.is_err());
        assert!(store.get_tasks_by_project(project_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_schema_rejects_invalid_status() {
        let (store, project) = store_with_project().await;
        let project_id = project.id;

        let result: Result<(), BoardError> = store
            .execute_transaction(|conn| {
                Box::pin(async move {
                    sqlx::query(
                        "INSERT INTO tasks (project_id, title, status, created_date) \
                         VALUES (?1, 'Bad', 'Blocked', '01/01/2024 09:00')",
                    )
                    .bind(project_id)
                    .execute(&mut *conn)
                    .await?;
                    Ok(())
                })
            })
            .await;

        assert!(matches!(result, Err(BoardError::Database(_))));
    }
}
