// Terminal rendering for the sprintlens CLI

use std::io::{self, Write};
use std::time::Duration;

use sprintlens_core::{Project, ResultSink, Task, TaskStatus};

/// Sink writing analysis output to stdout and progress notes to stderr
pub struct ConsoleSink;

impl ResultSink for ConsoleSink {
    fn show_loading(&self) {
        eprintln!("🔍 Analyzing project...");
    }

    fn show_result(&self, text: &str) {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", text);
        let _ = stdout.flush();
    }

    fn show_wait(&self, remaining: Duration) {
        eprintln!(
            "⏳ Waiting {:.1}s before contacting the analysis service...",
            remaining.as_secs_f64()
        );
    }
}

const COLUMN_WIDTH: usize = 28;

fn column_title(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::ToDo => "⏳ To do",
        TaskStatus::InProgress => "🔄 In progress",
        TaskStatus::Done => "✅ Done",
    }
}

fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        format!("{}{}", text, " ".repeat(width - count))
    } else {
        let head: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}

/// Three-column text rendering of a project's board
pub fn render_board(project: &Project, tasks: &[Task]) -> String {
    let columns: Vec<Vec<&Task>> = TaskStatus::ALL
        .iter()
        .map(|status| tasks.iter().filter(|task| task.status == *status).collect())
        .collect();
    let rows = columns.iter().map(Vec::len).max().unwrap_or(0);

    let mut out = String::new();
    out.push_str(&format!("📁 {} (#{})\n", project.name, project.id));
    if !project.description.is_empty() {
        out.push_str(&format!("{}\n", project.description));
    }
    out.push('\n');

    let header: Vec<String> = TaskStatus::ALL
        .iter()
        .zip(&columns)
        .map(|(status, column)| {
            fit(
                &format!("{} ({})", column_title(*status), column.len()),
                COLUMN_WIDTH,
            )
        })
        .collect();
    out.push_str(header.join(" │ ").trim_end());
    out.push('\n');
    out.push_str(&vec!["─".repeat(COLUMN_WIDTH); 3].join("─┼─"));
    out.push('\n');

    for row in 0..rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|column| match column.get(row) {
                Some(task) => fit(&format!("#{} {}", task.id, task.title), COLUMN_WIDTH),
                None => " ".repeat(COLUMN_WIDTH),
            })
            .collect();
        out.push_str(cells.join(" │ ").trim_end());
        out.push('\n');
    }

    if rows == 0 {
        out.push_str("(no tasks yet)\n");
    }
    out
}

pub fn print_project(project: &Project) {
    println!("#{} {}", project.id, project.name);
    if !project.description.is_empty() {
        println!("   {}", project.description);
    }
    match &project.modified_date {
        Some(modified) => println!("   created {}, modified {}", project.created_date, modified),
        None => println!("   created {}", project.created_date),
    }
}

pub fn print_task(task: &Task) {
    println!(
        "#{} [{}] {} ({})",
        task.id, task.status, task.title, task.created_date
    );
    if !task.description.is_empty() {
        println!("   {}", task.description);
    }
}
