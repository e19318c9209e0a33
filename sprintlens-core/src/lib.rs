// Sprintlens core - scrum board storage and project analysis
//
// The CLI (and any other shell) wires a board reader, a result sink and an
// optional remote provider into an `Analyzer`.

pub mod ai_provider;
pub mod analysis;
pub mod board;
pub mod config;
pub mod db_path;
pub mod sink;

pub use ai_provider::{
    create_provider, AIError, AnalysisProvider, ClaudeProvider, RetryPolicy, RetryingProvider,
};
pub use analysis::{
    AnalysisError, AnalysisOutcome, AnalysisPhase, Analyzer, AnalyzerSettings,
    ProjectAnalysisSnapshot,
};
pub use board::{
    BoardError, BoardReader, BoardStore, MemoryBoard, NewProject, NewTask, Project, Task,
    TaskStatus,
};
pub use config::Config;
pub use sink::{error_message, MemorySink, ResultSink, SinkEvent, ERROR_MARKER};
