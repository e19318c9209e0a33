use std::collections::HashMap;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tokio::time::Instant;
use tracing::debug;

use crate::board::Task;

/// Key summarizing a project's task set.
///
/// Changes whenever a task is added, removed, renamed or moved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(project_id: i64, tasks: &[Task]) -> Self {
        let mut ordered: Vec<&Task> = tasks.iter().collect();
        ordered.sort_by_key(|task| task.id);

        let mut hasher = Sha256::new();
        hasher.update(project_id.to_string().as_bytes());
        for task in ordered {
            let title_hash = hex::encode(Sha256::digest(task.title.as_bytes()));
            hasher.update(format!("|{}:{}:{}", task.id, task.status, title_hash).as_bytes());
        }
        Fingerprint(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub text: String,
    pub created_at: Instant,
}

impl CacheEntry {
    pub fn new(text: String) -> Self {
        Self {
            text,
            created_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}

/// Remote analysis results by fingerprint, valid for `ttl`.
///
/// Expired entries are dropped when looked up; nothing else evicts.
#[derive(Debug)]
pub struct AnalysisCache {
    entries: HashMap<Fingerprint, CacheEntry>,
    ttl: Duration,
}

impl AnalysisCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn get(&mut self, key: &Fingerprint) -> Option<String> {
        let entry = self.entries.get(key)?;
        if entry.is_expired(self.ttl) {
            debug!("Cache entry {} expired", &key.as_str()[..12]);
            self.entries.remove(key);
            return None;
        }
        Some(entry.text.clone())
    }

    pub fn put(&mut self, key: Fingerprint, text: String) {
        self.entries.insert(key, CacheEntry::new(text));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
