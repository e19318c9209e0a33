// Where analysis output goes: a UI panel, the console, or a test recorder

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::ai_provider::AIError;
use crate::analysis::AnalysisError;

/// Prefix marking a result text as a failure
pub const ERROR_MARKER: &str = "❌";

pub trait ResultSink: Send + Sync {
    fn show_loading(&self);
    fn show_result(&self, text: &str);
    /// Called before the analyzer suspends to respect the call spacing
    fn show_wait(&self, _remaining: Duration) {}
}

/// Render a failure as the single line shown to the user
pub fn error_message(error: &AnalysisError) -> String {
    let detail = match error {
        AnalysisError::NoProjectSelected => "Please select a project first.".to_string(),
        AnalysisError::AlreadyInProgress => {
            "An analysis is already running. Please wait for it to finish.".to_string()
        }
        AnalysisError::UnknownProject(id) => format!("Project {} was not found.", id),
        AnalysisError::Storage(msg) => format!("Could not read project data: {}", msg),
        AnalysisError::Provider(e) => match e {
            AIError::RateLimited => {
                "API rate limit exceeded. Please wait a few minutes and try again.".to_string()
            }
            AIError::Unauthorized => {
                "Invalid credential: the API key was rejected. Please check your API key."
                    .to_string()
            }
            AIError::MalformedRequest(_) => {
                "The analysis request was rejected as malformed.".to_string()
            }
            AIError::ServerError { status, .. } => {
                format!("The analysis service returned an error (HTTP {}).", status)
            }
            AIError::Timeout => {
                "The analysis service did not respond in time. Please try again.".to_string()
            }
            AIError::ParseError(_) => "The analysis result could not be processed.".to_string(),
            AIError::EmptyResponse => "The analysis service returned no result.".to_string(),
            AIError::Api { message, .. } => format!("API error: {}", message),
            AIError::Network(msg) => format!("Could not reach the analysis service: {}", msg),
            AIError::UnsupportedProvider(name) => {
                format!("Unsupported analysis provider: {}", name)
            }
        },
    };
    format!("{} {}", ERROR_MARKER, detail)
}

/// Everything a sink was asked to show, in order
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Loading,
    Result(String),
    Wait(Duration),
}

/// Sink that keeps every event in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<SinkEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: SinkEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn results(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SinkEvent::Result(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn last_result(&self) -> Option<String> {
        self.results().pop()
    }
}

impl ResultSink for MemorySink {
    fn show_loading(&self) {
        self.push(SinkEvent::Loading);
    }

    fn show_result(&self, text: &str) {
        self.push(SinkEvent::Result(text.to_string()));
    }

    fn show_wait(&self, remaining: Duration) {
        self.push(SinkEvent::Wait(remaining));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_message_carries_the_marker() {
        let errors = [
            AnalysisError::NoProjectSelected,
            AnalysisError::AlreadyInProgress,
            AnalysisError::UnknownProject(3),
            AnalysisError::Storage("disk I/O error".to_string()),
            AnalysisError::Provider(AIError::RateLimited),
            AnalysisError::Provider(AIError::Timeout),
            AnalysisError::Provider(AIError::EmptyResponse),
        ];
        for error in &errors {
            let message = error_message(error);
            assert!(message.starts_with(ERROR_MARKER), "{}", message);
            assert!(!message.contains('\n'));
        }
    }

    #[test]
    fn test_error_messages_name_the_problem() {
        assert!(error_message(&AnalysisError::Provider(AIError::Unauthorized))
            .contains("Invalid credential"));
        assert!(error_message(&AnalysisError::Provider(AIError::ServerError {
            status: 503,
            body: "unavailable".to_string()
        }))
        .contains("HTTP 503"));
        assert!(error_message(&AnalysisError::Provider(AIError::Api {
            kind: "overloaded_error".to_string(),
            message: "Overloaded".to_string()
        }))
        .ends_with("API error: Overloaded"));
    }

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.show_loading();
        sink.show_wait(Duration::from_secs(2));
        sink.show_result("done");

        assert_eq!(
            sink.events(),
            vec![
                SinkEvent::Loading,
                SinkEvent::Wait(Duration::from_secs(2)),
                SinkEvent::Result("done".to_string())
            ]
        );
        assert_eq!(sink.last_result(), Some("done".to_string()));
    }
}
