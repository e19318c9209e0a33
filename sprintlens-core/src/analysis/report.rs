//! Locally generated project reports.
//!
//! Both reports are pure functions of the snapshot, so rendering the same
//! snapshot twice yields identical text.

use std::fmt::Write;

use crate::analysis::collector::ProjectAnalysisSnapshot;
use crate::board::TaskStatus;

pub const PROJECT_NOT_FOUND: &str = "⚠️ Project not found.";

/// More concurrent work than this triggers a warning
const MAX_HEALTHY_IN_PROGRESS: usize = 3;
/// Backlog larger than this multiple of the work in progress triggers a warning
const BACKLOG_FACTOR: usize = 3;

fn completion_percent(snapshot: &ProjectAnalysisSnapshot) -> Option<f64> {
    snapshot.completion_ratio().map(|ratio| ratio * 100.0)
}

fn progress_note(percent: f64) -> &'static str {
    if percent == 0.0 {
        "• Pick the first task and get started!"
    } else if percent < 30.0 {
        "• The project has just started, keep going!"
    } else if percent < 70.0 {
        "• You are making good progress!"
    } else if percent < 100.0 {
        "• Final sprint! The finish line is close!"
    } else {
        "• 🎉 Congratulations! The project is complete!"
    }
}

fn stage_description(ratio: f64) -> &'static str {
    if ratio == 0.0 {
        "Planning: no task has been completed yet"
    } else if ratio < 0.3 {
        "Early stage: the first results are coming in"
    } else if ratio < 0.7 {
        "Mid-development: the bulk of the work is underway"
    } else if ratio < 1.0 {
        "Final stretch: most of the work is done"
    } else {
        "Completed: every task is done"
    }
}

fn write_breakdown(out: &mut String, snapshot: &ProjectAnalysisSnapshot) {
    let _ = writeln!(out, "   • ⏳ To do: {}", snapshot.count(TaskStatus::ToDo));
    let _ = writeln!(out, "   • 🔄 In progress: {}", snapshot.count(TaskStatus::InProgress));
    let _ = writeln!(out, "   • ✅ Done: {}", snapshot.count(TaskStatus::Done));
}

/// Template report for projects too small to send for remote analysis
pub fn simple_report(snapshot: &ProjectAnalysisSnapshot) -> String {
    if snapshot.project.is_none() {
        return PROJECT_NOT_FOUND.to_string();
    }

    let total = snapshot.total();
    let todo = snapshot.count(TaskStatus::ToDo);
    let in_progress = snapshot.count(TaskStatus::InProgress);
    let done = snapshot.count(TaskStatus::Done);

    let mut out = String::new();
    let _ = writeln!(out, "📊 Quick Project Analysis");
    let _ = writeln!(out);
    let _ = writeln!(out, "🔢 Task breakdown: {} tasks in total", total);
    write_breakdown(&mut out, snapshot);
    let _ = writeln!(out);

    if total == 0 {
        let _ = writeln!(out, "🔍 Status: The project hasn't started yet");
        let _ = writeln!(out);
        let _ = writeln!(out, "💡 Recommendations:");
        let _ = writeln!(out, "• Start adding tasks to your project");
        let _ = writeln!(out, "• Break the project into small, manageable tasks");
        let _ = writeln!(out, "• Identify the most important tasks first");
    } else {
        let scale = if total <= 3 {
            "Small-scale project"
        } else {
            "Active project"
        };
        let _ = writeln!(out, "🔍 Status: {}", scale);
        let _ = writeln!(out);
        let _ = writeln!(out, "💡 Recommendations:");
        if todo > 0 {
            let _ = writeln!(out, "• Prioritize the tasks waiting in To do");
        }
        if in_progress > 1 {
            let _ = writeln!(out, "• Avoid focusing on too many tasks at once");
        }
        if done > 0 {
            let _ = writeln!(out, "• Great work! {} task(s) completed", done);
        }
        let _ = writeln!(out, "• Add more tasks as the project grows");
    }

    if let Some(percent) = completion_percent(snapshot) {
        let _ = writeln!(out);
        let _ = writeln!(out, "📈 Progress: {:.0}% complete", percent);
        let _ = writeln!(out, "{}", progress_note(percent));
    }

    let _ = writeln!(out);
    let _ = write!(out, "ℹ️ Add 4 or more tasks for a detailed AI analysis.");
    out
}

/// Heuristic report used when no API key is configured
pub fn offline_report(snapshot: &ProjectAnalysisSnapshot) -> String {
    let Some(project) = &snapshot.project else {
        return PROJECT_NOT_FOUND.to_string();
    };

    let total = snapshot.total();
    let todo = snapshot.count(TaskStatus::ToDo);
    let in_progress = snapshot.count(TaskStatus::InProgress);
    let done = snapshot.count(TaskStatus::Done);

    let mut out = String::new();
    let _ = writeln!(out, "📊 Offline Project Analysis");
    let _ = writeln!(out);
    let _ = writeln!(out, "📁 Project: {}", project.name);
    let _ = writeln!(out, "📅 Created: {}", project.created_date);
    if !project.description.trim().is_empty() {
        let _ = writeln!(out, "📝 Description: {}", project.description.trim());
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "🔢 Task statistics: {} tasks in total", total);
    write_breakdown(&mut out, snapshot);
    if let Some(percent) = completion_percent(snapshot) {
        let _ = writeln!(out, "   • 📈 Completion: {:.0}%", percent);
    }
    let _ = writeln!(out);

    let ratio = snapshot.completion_ratio().unwrap_or(0.0);
    let _ = writeln!(out, "🔍 Stage: {}", stage_description(ratio));

    let mut warnings = Vec::new();
    if in_progress > MAX_HEALTHY_IN_PROGRESS {
        warnings.push(format!(
            "Too many tasks in progress at once ({}); finish some before starting new ones",
            in_progress
        ));
    }
    if todo > BACKLOG_FACTOR * in_progress {
        warnings.push(format!(
            "The backlog ({}) far exceeds the work in progress ({}); \
             pull more tasks into progress or trim the backlog",
            todo, in_progress
        ));
    }
    if done == 0 && total > 0 {
        warnings.push(
            "No task has been completed yet; aim for an early win to build momentum".to_string(),
        );
    }

    if !warnings.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "⚠️ Warnings:");
        for warning in &warnings {
            let _ = writeln!(out, "• {}", warning);
        }
    }

    let _ = writeln!(out);
    let _ = write!(
        out,
        "ℹ️ Generated locally because no API key is configured. \
         Add an API key for a detailed AI analysis."
    );
    out
}
