//! Analysis decision engine.
//!
//! Each request walks a fixed ladder and stops at the first rung that can
//! answer it: cached result, local simple report for minimal projects, local
//! offline report when no provider is configured, and finally the remote
//! provider behind the retry decorator and the call-spacing gate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

use crate::ai_provider::{AnalysisProvider, RetryPolicy, RetryingProvider};
use crate::analysis::cache::AnalysisCache;
use crate::analysis::collector::{collect, ProjectAnalysisSnapshot};
use crate::analysis::prompt::render_prompt;
use crate::analysis::report::{offline_report, simple_report};
use crate::analysis::{AnalysisError, AnalysisOutcome};
use crate::board::BoardReader;
use crate::sink::{error_message, ResultSink};

/// Projects with at most this many tasks get the local simple report
const MINIMAL_TASK_COUNT: usize = 3;
const SHORT_LIST_TASK_COUNT: usize = 2;
const SHORT_TITLE_WORDS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerSettings {
    /// Minimum spacing between two remote calls
    pub min_call_interval: Duration,
    pub cache_ttl: Duration,
    pub retry: RetryPolicy,
    pub max_words: usize,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            min_call_interval: Duration::from_secs(3),
            cache_ttl: Duration::from_secs(3600),
            retry: RetryPolicy::default(),
            max_words: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisPhase {
    Idle,
    Classifying,
    GeneratingLocal,
    AwaitingRemote,
    Done,
}

/// Whether a snapshot is too small to be worth a remote analysis
pub fn is_minimal(snapshot: &ProjectAnalysisSnapshot) -> bool {
    let total = snapshot.total();
    let short_titles = snapshot
        .all
        .iter()
        .all(|task| task.title.split_whitespace().count() <= SHORT_TITLE_WORDS);

    total == 0
        || total <= MINIMAL_TASK_COUNT
        || (total <= SHORT_LIST_TASK_COUNT && short_titles)
}

pub struct Analyzer {
    reader: Arc<dyn BoardReader>,
    sink: Arc<dyn ResultSink>,
    provider: Option<RetryingProvider>,
    settings: AnalyzerSettings,
    selected: Mutex<Option<i64>>,
    cache: Mutex<AnalysisCache>,
    last_call: Mutex<Option<Instant>>,
    phase: Mutex<AnalysisPhase>,
    in_flight: AtomicBool,
}

/// Holds the single-flight slot; releasing it returns the analyzer to idle
struct InFlight<'a> {
    analyzer: &'a Analyzer,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.analyzer.set_phase(AnalysisPhase::Idle);
        self.analyzer.in_flight.store(false, Ordering::Release);
    }
}

fn locked<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Analyzer {
    pub fn new(
        reader: Arc<dyn BoardReader>,
        sink: Arc<dyn ResultSink>,
        provider: Option<Arc<dyn AnalysisProvider>>,
        settings: AnalyzerSettings,
    ) -> Self {
        let provider = provider.map(|inner| RetryingProvider::new(inner, settings.retry.clone()));
        Self {
            reader,
            sink,
            provider,
            cache: Mutex::new(AnalysisCache::new(settings.cache_ttl)),
            settings,
            selected: Mutex::new(None),
            last_call: Mutex::new(None),
            phase: Mutex::new(AnalysisPhase::Idle),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn select_project(&self, project_id: Option<i64>) {
        *locked(&self.selected) = project_id;
    }

    pub fn selected_project(&self) -> Option<i64> {
        *locked(&self.selected)
    }

    pub fn phase(&self) -> AnalysisPhase {
        *locked(&self.phase)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Number of remote results currently cached
    pub fn cache_len(&self) -> usize {
        locked(&self.cache).len()
    }

    fn set_phase(&self, phase: AnalysisPhase) {
        *locked(&self.phase) = phase;
    }

    fn try_enter(&self) -> Option<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight { analyzer: self })
    }

    /// Analyze the selected project and push the result through the sink.
    ///
    /// Never returns an error: failures are rendered through the sink and
    /// reported back as [`AnalysisOutcome::Failed`] or
    /// [`AnalysisOutcome::Rejected`].
    pub async fn analyze_current_project(&self) -> AnalysisOutcome {
        let Some(_guard) = self.try_enter() else {
            warn!("Analysis requested while another one is still running");
            self.sink
                .show_result(&error_message(&AnalysisError::AlreadyInProgress));
            return AnalysisOutcome::Rejected(AnalysisError::AlreadyInProgress);
        };

        let Some(project_id) = self.selected_project() else {
            return self.fail(AnalysisError::NoProjectSelected);
        };

        self.set_phase(AnalysisPhase::Classifying);
        self.sink.show_loading();
        info!(project_id, "Starting project analysis");

        let snapshot = match collect(self.reader.as_ref(), project_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => return self.fail(AnalysisError::Storage(e.to_string())),
        };
        let Some(project) = snapshot.project.clone() else {
            return self.fail(AnalysisError::UnknownProject(project_id));
        };

        let fingerprint = snapshot.fingerprint();
        let cached = locked(&self.cache).get(&fingerprint);
        if let Some(text) = cached {
            info!(project_id, "Serving cached analysis");
            return self.deliver(AnalysisOutcome::Cached(text));
        }

        if is_minimal(&snapshot) {
            debug!(project_id, total = snapshot.total(), "Snapshot is minimal");
            self.set_phase(AnalysisPhase::GeneratingLocal);
            return self.deliver(AnalysisOutcome::Simple(simple_report(&snapshot)));
        }

        let Some(provider) = &self.provider else {
            info!(project_id, "No API key configured, generating offline analysis");
            self.set_phase(AnalysisPhase::GeneratingLocal);
            return self.deliver(AnalysisOutcome::Offline(offline_report(&snapshot)));
        };

        self.set_phase(AnalysisPhase::AwaitingRemote);
        self.wait_for_call_slot().await;

        let prompt = render_prompt(&project, &snapshot, self.settings.max_words);
        *locked(&self.last_call) = Some(Instant::now());
        info!(
            project_id,
            provider = provider.provider_name(),
            "Requesting remote analysis"
        );

        match provider.send(&prompt).await {
            Ok(text) => {
                locked(&self.cache).put(fingerprint, text.clone());
                self.deliver(AnalysisOutcome::Remote(text))
            }
            Err(e) => self.fail(AnalysisError::Provider(e)),
        }
    }

    /// Suspend until `min_call_interval` has passed since the last remote call
    async fn wait_for_call_slot(&self) {
        let last_call = *locked(&self.last_call);
        let Some(last_call) = last_call else {
            return;
        };

        let elapsed = last_call.elapsed();
        if elapsed >= self.settings.min_call_interval {
            return;
        }

        let remaining = self.settings.min_call_interval - elapsed;
        info!(
            wait_ms = remaining.as_millis() as u64,
            "Spacing out remote analysis calls"
        );
        self.sink.show_wait(remaining);
        sleep(remaining).await;
    }

    fn deliver(&self, outcome: AnalysisOutcome) -> AnalysisOutcome {
        self.set_phase(AnalysisPhase::Done);
        if let Some(text) = outcome.text() {
            self.sink.show_result(text);
        }
        outcome
    }

    fn fail(&self, error: AnalysisError) -> AnalysisOutcome {
        error!("Project analysis failed: {}", error);
        self.set_phase(AnalysisPhase::Done);
        self.sink.show_result(&error_message(&error));
        AnalysisOutcome::Failed(error)
    }
}
