// Shared helpers for sprintlens-core integration tests

#![allow(dead_code)]

use std::time::Duration;

use serde_json::{json, Value};
use sprintlens_core::{AnalyzerSettings, BoardStore, NewProject, NewTask, RetryPolicy, TaskStatus};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_API_KEY: &str = "test-api-key";

/// Body of a successful messages reply carrying `text`
pub fn claude_reply(text: &str) -> Value {
    json!({
        "id": "msg_01",
        "type": "message",
        "role": "assistant",
        "model": "claude-3-haiku-20240307",
        "content": [{ "type": "text", "text": text }],
        "stop_reason": "end_turn",
        "usage": { "input_tokens": 120, "output_tokens": 48 }
    })
}

/// Mount `response` for every authenticated POST to the messages endpoint
pub async fn mount_messages(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", TEST_API_KEY))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Settings with short timings so real-clock tests stay fast
pub fn fast_settings() -> AnalyzerSettings {
    AnalyzerSettings {
        min_call_interval: Duration::from_millis(300),
        cache_ttl: Duration::from_secs(3600),
        retry: RetryPolicy {
            max_retries: 2,
            initial_backoff: Duration::from_millis(100),
        },
        max_words: 200,
    }
}

/// Create a project holding one ToDo task per title, returning the project id
pub async fn seed_project(store: &BoardStore, name: &str, titles: &[&str]) -> i64 {
    let project = store
        .insert_project(NewProject::new(name, "Seeded for tests"))
        .await
        .unwrap();
    for title in titles {
        store
            .insert_task(NewTask::new(project.id, title, ""))
            .await
            .unwrap();
    }
    project.id
}

pub const FIVE_TASKS: [&str; 5] = [
    "Design the checkout flow",
    "Implement payment integration",
    "Write the order confirmation email",
    "Add inventory synchronization",
    "Prepare the launch checklist",
];

pub async fn move_first_task(store: &BoardStore, project_id: i64, status: TaskStatus) {
    use sprintlens_core::BoardReader;
    let tasks = store.get_tasks_by_project(project_id).await.unwrap();
    store.move_task(tasks[0].id, status).await.unwrap();
}
