use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ai_provider::RetryPolicy;
use crate::analysis::AnalyzerSettings;

/// Placeholder shipped in sample configs; never a real credential
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_HERE";

const API_KEY_ENV_VARS: [&str; 2] = ["SPRINTLENS_API_KEY", "ANTHROPIC_API_KEY"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub provider: ProviderSettings,
    pub analysis: AnalysisSettings,
    pub defaults: DefaultConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub name: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub timeout: Option<u64>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    pub min_call_interval_secs: Option<u64>,
    pub cache_ttl_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub initial_backoff_secs: Option<u64>,
    pub max_words: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultConfig {
    pub log_level: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            name: Some("claude".to_string()),
            model: Some(crate::ai_provider::claude::DEFAULT_MODEL.to_string()),
            max_tokens: Some(crate::ai_provider::claude::DEFAULT_MAX_TOKENS),
            timeout: Some(crate::ai_provider::claude::DEFAULT_TIMEOUT_SECS),
            api_key: None,
            base_url: None,
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            min_call_interval_secs: Some(3),
            cache_ttl_secs: Some(3600),
            max_retries: Some(2),
            initial_backoff_secs: Some(5),
            max_words: Some(500),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderSettings::default(),
            analysis: AnalysisSettings::default(),
            defaults: DefaultConfig {
                log_level: Some("info".to_string()),
            },
        }
    }
}

/// File shape: every section optional so partial files merge with defaults
#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    provider: Option<ProviderSettings>,
    analysis: Option<AnalysisSettings>,
    defaults: Option<DefaultConfig>,
}

fn usable_key(key: &str) -> Option<String> {
    let key = key.trim();
    if key.is_empty() || key == PLACEHOLDER_API_KEY {
        None
    } else {
        Some(key.to_string())
    }
}

impl Config {
    /// Load from `.sprintlens.toml` or the user config, falling back to defaults
    pub fn load() -> Result<Self> {
        match Self::get_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let partial: PartialConfig = toml::from_str(content).context("Invalid config file")?;
        let mut config = Config::default();
        config.merge(partial);
        Ok(config)
    }

    fn merge(&mut self, partial: PartialConfig) {
        if let Some(provider) = partial.provider {
            let defaults = &self.provider;
            self.provider = ProviderSettings {
                name: provider.name.or_else(|| defaults.name.clone()),
                model: provider.model.or_else(|| defaults.model.clone()),
                max_tokens: provider.max_tokens.or(defaults.max_tokens),
                timeout: provider.timeout.or(defaults.timeout),
                api_key: provider.api_key,
                base_url: provider.base_url,
            };
        }
        if let Some(analysis) = partial.analysis {
            let defaults = &self.analysis;
            self.analysis = AnalysisSettings {
                min_call_interval_secs: analysis
                    .min_call_interval_secs
                    .or(defaults.min_call_interval_secs),
                cache_ttl_secs: analysis.cache_ttl_secs.or(defaults.cache_ttl_secs),
                max_retries: analysis.max_retries.or(defaults.max_retries),
                initial_backoff_secs: analysis
                    .initial_backoff_secs
                    .or(defaults.initial_backoff_secs),
                max_words: analysis.max_words.or(defaults.max_words),
            };
        }
        if let Some(defaults) = partial.defaults {
            if defaults.log_level.is_some() {
                self.defaults.log_level = defaults.log_level;
            }
        }
    }

    /// API key with priority: environment > config file.
    ///
    /// Blank and placeholder keys count as no credential.
    pub fn get_api_key(&self) -> Option<String> {
        for var in API_KEY_ENV_VARS {
            if let Some(key) = env::var(var).ok().and_then(|k| usable_key(&k)) {
                return Some(key);
            }
        }

        let key = self.provider.api_key.as_deref().and_then(usable_key);
        if key.is_none() && self.provider.api_key.is_some() {
            warn!("Configured API key is blank or a placeholder; remote analysis disabled");
        }
        key
    }

    pub fn get_provider_name(&self) -> String {
        self.provider.name.as_deref().unwrap_or("claude").to_string()
    }

    pub fn get_log_level(&self) -> String {
        self.defaults.log_level.as_deref().unwrap_or("info").to_string()
    }

    pub fn max_words(&self) -> usize {
        self.analysis.max_words.unwrap_or(500)
    }

    pub fn analyzer_settings(&self) -> AnalyzerSettings {
        let defaults = AnalyzerSettings::default();
        let analysis = &self.analysis;
        AnalyzerSettings {
            min_call_interval: analysis
                .min_call_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.min_call_interval),
            cache_ttl: analysis
                .cache_ttl_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            retry: RetryPolicy {
                max_retries: analysis.max_retries.unwrap_or(defaults.retry.max_retries),
                initial_backoff: analysis
                    .initial_backoff_secs
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.retry.initial_backoff),
            },
            max_words: self.max_words(),
        }
    }

    pub fn get_config_path() -> Option<PathBuf> {
        if let Ok(current_dir) = env::current_dir() {
            let project_config = current_dir.join(".sprintlens.toml");
            if project_config.exists() {
                return Some(project_config);
            }
        }

        Self::user_config_path().filter(|path| path.exists())
    }

    fn user_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("sprintlens").join("config.toml"))
    }

    /// Write the config to the user config location
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::get_config_path()
            .or_else(Self::user_config_path)
            .context("Could not determine config path")?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }
}
