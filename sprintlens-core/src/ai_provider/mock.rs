use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::time::Instant;

use crate::ai_provider::{AIError, AnalysisProvider};

/// Provider that replays queued replies and records when it was called
pub(crate) struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, AIError>>>,
    fallback: Result<String, AIError>,
    calls: Mutex<Vec<(Instant, String)>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Result<String, AIError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            fallback: Ok("analysis".to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn always(reply: Result<String, AIError>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: reply,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(at, _)| *at).collect()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(_, p)| p.clone()).collect()
    }
}

#[async_trait::async_trait]
impl AnalysisProvider for ScriptedProvider {
    async fn send(&self, prompt: &str) -> Result<String, AIError> {
        self.calls
            .lock()
            .unwrap()
            .push((Instant::now(), prompt.to_string()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}
