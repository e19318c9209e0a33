use std::fmt::Write;

use crate::analysis::collector::ProjectAnalysisSnapshot;
use crate::board::{Project, TaskStatus};

const MAX_TODO_ITEMS: usize = 5;
const MAX_IN_PROGRESS_ITEMS: usize = 3;
const MAX_DESCRIPTION_CHARS: usize = 30;

fn truncate_description(description: &str) -> String {
    let description = description.trim();
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        let head: String = description.chars().take(MAX_DESCRIPTION_CHARS).collect();
        format!("{}...", head)
    } else {
        description.to_string()
    }
}

/// Render the project state and instructions sent to the remote service
pub fn render_prompt(
    project: &Project,
    snapshot: &ProjectAnalysisSnapshot,
    max_words: usize,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Analyze this agile project:");
    let _ = writeln!(out);
    let _ = writeln!(out, "Project name: {}", project.name);
    let _ = writeln!(out, "Project description: {}", project.description);
    let _ = writeln!(out, "Total tasks: {}", snapshot.total());
    let _ = writeln!(out);

    let todo = snapshot.tasks(TaskStatus::ToDo);
    let _ = writeln!(out, "=== TO DO ===");
    if todo.is_empty() {
        let _ = writeln!(out, "• No tasks waiting");
    }
    for task in todo.iter().take(MAX_TODO_ITEMS) {
        let description = truncate_description(&task.description);
        if description.is_empty() {
            let _ = writeln!(out, "• {}", task.title);
        } else {
            let _ = writeln!(out, "• {} - {}", task.title, description);
        }
    }
    if todo.len() > MAX_TODO_ITEMS {
        let _ = writeln!(out, "• ...and {} more", todo.len() - MAX_TODO_ITEMS);
    }
    let _ = writeln!(out);

    let in_progress = snapshot.tasks(TaskStatus::InProgress);
    let _ = writeln!(out, "=== IN PROGRESS ===");
    if in_progress.is_empty() {
        let _ = writeln!(out, "• Nothing in progress");
    }
    for task in in_progress.iter().take(MAX_IN_PROGRESS_ITEMS) {
        let _ = writeln!(out, "• {}", task.title);
    }
    if in_progress.len() > MAX_IN_PROGRESS_ITEMS {
        let _ = writeln!(out, "• ...and {} more", in_progress.len() - MAX_IN_PROGRESS_ITEMS);
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "=== DONE ===");
    let _ = writeln!(out, "• {} tasks completed", snapshot.count(TaskStatus::Done));
    let _ = writeln!(out);

    let _ = writeln!(out, "Provide a short, focused analysis covering:");
    let _ = writeln!(out, "1. Priority tasks and suggested order");
    let _ = writeln!(out, "2. Progress estimate");
    let _ = writeln!(out, "3. Risk analysis");
    let _ = writeln!(out, "4. Improvement suggestions");
    let _ = writeln!(out, "5. Overall assessment");
    let _ = writeln!(out);
    let _ = write!(out, "Answer in at most {} words.", max_words);
    out
}
