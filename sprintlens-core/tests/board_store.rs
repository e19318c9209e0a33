//! On-disk board store tests

mod common;

use sprintlens_core::board::create_pool;
use sprintlens_core::{BoardError, BoardReader, BoardStore, NewTask, TaskStatus};
use tempfile::TempDir;

use common::seed_project;

#[tokio::test]
async fn test_board_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("board.db");

    let store = BoardStore::open(&db_path).await.unwrap();
    let project_id = seed_project(&store, "Shop", &["Design", "Build"]).await;
    store.close().await;

    let reopened = BoardStore::open(&db_path).await.unwrap();
    let project = reopened.get_project_by_id(project_id).await.unwrap().unwrap();
    assert_eq!(project.name, "Shop");
    let tasks = reopened.get_tasks_by_project(project_id).await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert!(tasks.iter().all(|task| task.status == TaskStatus::ToDo));
}

#[tokio::test]
async fn test_legacy_rows_with_unknown_status_are_quarantined() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("legacy.db");

    // schema written by an older tool, without the status constraint
    let pool = create_pool(&db_path).await.unwrap();
    for statement in [
        "CREATE TABLE projects (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, \
         description TEXT NOT NULL DEFAULT '', created_date TEXT NOT NULL, modified_date TEXT)",
        "CREATE TABLE tasks (id INTEGER PRIMARY KEY AUTOINCREMENT, project_id INTEGER NOT NULL, \
         title TEXT NOT NULL, description TEXT NOT NULL DEFAULT '', status TEXT NOT NULL, \
         created_date TEXT NOT NULL)",
        "INSERT INTO projects (name, created_date) VALUES ('Legacy', '01/02/2023')",
        "INSERT INTO tasks (project_id, title, status, created_date) VALUES \
         (1, 'Kept', 'InProgress', '01/02/2023 10:00'), \
         (1, 'Odd', 'Blocked', '01/02/2023 10:05'), \
         (1, 'Lowercase', 'done', '01/02/2023 10:10'), \
         (1, 'Finished', 'Done', '01/02/2023 10:15')",
    ] {
        sqlx::query(statement).execute(&pool).await.unwrap();
    }
    pool.close().await;

    let store = BoardStore::open(&db_path).await.unwrap();
    let tasks = store.get_tasks_by_project(1).await.unwrap();

    let titles: Vec<&str> = tasks.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(titles, vec!["Kept", "Finished"]);
    assert_eq!(tasks[0].status, TaskStatus::InProgress);
    assert_eq!(tasks[1].status, TaskStatus::Done);
}

#[tokio::test]
async fn test_task_requires_existing_project() {
    let dir = TempDir::new().unwrap();
    let store = BoardStore::open(dir.path().join("board.db")).await.unwrap();

    let result = store.insert_task(NewTask::new(99, "Orphan", "")).await;
    assert!(matches!(result, Err(BoardError::ProjectNotFound(99))));
}
