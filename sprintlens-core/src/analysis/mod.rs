// Project analysis pipeline
//
// collector -> engine (cache, minimal check, credential check, call spacing)
// -> remote provider, with local reports for the cheap paths.

pub mod cache;
pub mod collector;
pub mod engine;
pub mod prompt;
pub mod report;

use thiserror::Error;

use crate::ai_provider::AIError;

pub use cache::{AnalysisCache, Fingerprint};
pub use collector::{collect, ProjectAnalysisSnapshot};
pub use engine::{is_minimal, AnalysisPhase, Analyzer, AnalyzerSettings};
pub use prompt::render_prompt;
pub use report::{offline_report, simple_report, PROJECT_NOT_FOUND};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("No project selected")]
    NoProjectSelected,
    #[error("An analysis is already in progress")]
    AlreadyInProgress,
    #[error("Project {0} not found")]
    UnknownProject(i64),
    #[error("Board storage error: {0}")]
    Storage(String),
    #[error(transparent)]
    Provider(#[from] AIError),
}

/// Which path an analysis request took
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Cached(String),
    Simple(String),
    Offline(String),
    Remote(String),
    /// Turned away without running (another analysis is in flight)
    Rejected(AnalysisError),
    Failed(AnalysisError),
}

impl AnalysisOutcome {
    /// Report text, if the request produced one
    pub fn text(&self) -> Option<&str> {
        match self {
            AnalysisOutcome::Cached(text)
            | AnalysisOutcome::Simple(text)
            | AnalysisOutcome::Offline(text)
            | AnalysisOutcome::Remote(text) => Some(text),
            AnalysisOutcome::Rejected(_) | AnalysisOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&AnalysisError> {
        match self {
            AnalysisOutcome::Rejected(e) | AnalysisOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}
