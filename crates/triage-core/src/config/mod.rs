//! Configuration module for triage.
//!
//! Loads typed configuration from `~/.triage/config.json`. The resolved
//! [`Config`] is built once per process and handed to the engine by
//! parameter; nothing inside the classifier reads storage or the
//! environment on its own.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub providers: ProvidersConfig,
    pub classifier: ClassifierConfig,
}

impl Config {
    /// Load configuration from the default path, then apply environment
    /// overrides. A missing file yields the defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::default_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Config::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Get the default config file path.
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.json")
    }

    /// Get the default config directory path.
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".triage")
    }

    /// Fill missing API keys and the active provider from `lookup`.
    ///
    /// Recognized keys: `OPENAI_API_KEY`, `HF_API_KEY`, `TRIAGE_PROVIDER`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for (kind, var) in [
            (ProviderKind::OpenAi, "OPENAI_API_KEY"),
            (ProviderKind::HuggingFace, "HF_API_KEY"),
        ] {
            let Some(key) = lookup(var).filter(|k| !k.trim().is_empty()) else {
                continue;
            };
            let entry = self
                .providers
                .entry_mut(kind)
                .get_or_insert_with(ProviderEntry::default);
            if !is_real_key(&entry.api_key) {
                entry.api_key = key;
            }
        }

        if let Some(kind) = lookup("TRIAGE_PROVIDER").and_then(|p| p.parse().ok()) {
            self.providers.active = Some(kind);
        }
    }

    /// Write the default config template to disk.
    pub fn write_default_template() -> anyhow::Result<PathBuf> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = serde_json::json!({
            "providers": {
                "active": "openai",
                "openai": {
                    "apiKey": "sk-YOUR_KEY_HERE",
                    "model": DEFAULT_OPENAI_MODEL
                },
                "huggingface": {
                    "apiKey": "hf_YOUR_KEY_HERE",
                    "model": DEFAULT_HUGGINGFACE_MODEL
                }
            },
            "classifier": {
                "requestTimeoutSeconds": 30,
                "maxConcurrency": 1,
                "simulatedLatencyMs": 0,
                "useRemote": true
            }
        });

        std::fs::write(&path, serde_json::to_string_pretty(&template)?)?;
        Ok(path)
    }

    /// Validate configuration and return actionable error messages.
    ///
    /// Having no remote provider at all is valid: classification then runs
    /// on the local rules only.
    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.classifier.max_concurrency == 0 {
            errors.push("classifier.maxConcurrency must be at least 1.".into());
        }
        if self.classifier.request_timeout_seconds == 0 {
            errors.push("classifier.requestTimeoutSeconds must be at least 1.".into());
        }

        if let Some(kind) = self.providers.active {
            if self.classifier.use_remote && self.providers.find_active().is_none() {
                errors.push(format!(
                    "providers.active is '{kind}' but providers.{kind}.apiKey is missing or a placeholder."
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_HUGGINGFACE_MODEL: &str = "meta-llama/Meta-Llama-3-8B-Instruct";

// ── Provider Configuration ──────────────────────────────────────────

/// The remote backends that can be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderKind {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "huggingface")]
    HuggingFace,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::HuggingFace => "huggingface",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => DEFAULT_OPENAI_MODEL,
            ProviderKind::HuggingFace => DEFAULT_HUGGINGFACE_MODEL,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "huggingface" | "hf" => Ok(ProviderKind::HuggingFace),
            other => Err(format!("unknown provider '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderEntry {
    pub api_key: String,
    pub api_base: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Selected backend. Unset means OpenAI, as long as it has a key.
    pub active: Option<ProviderKind>,
    pub openai: Option<ProviderEntry>,
    pub huggingface: Option<ProviderEntry>,
}

impl ProvidersConfig {
    fn entry_mut(&mut self, kind: ProviderKind) -> &mut Option<ProviderEntry> {
        match kind {
            ProviderKind::OpenAi => &mut self.openai,
            ProviderKind::HuggingFace => &mut self.huggingface,
        }
    }

    pub fn entry(&self, kind: ProviderKind) -> Option<&ProviderEntry> {
        match kind {
            ProviderKind::OpenAi => self.openai.as_ref(),
            ProviderKind::HuggingFace => self.huggingface.as_ref(),
        }
    }

    /// The selected provider, if it has a real (non-placeholder) API key.
    ///
    /// Exactly one provider is active at a time; there is no cross-provider
    /// failover.
    pub fn find_active(&self) -> Option<(ProviderKind, &ProviderEntry)> {
        let kind = self.active.unwrap_or(ProviderKind::OpenAi);
        self.entry(kind)
            .filter(|e| is_real_key(&e.api_key))
            .map(|e| (kind, e))
    }
}

fn is_real_key(key: &str) -> bool {
    let placeholder_prefixes = ["YOUR_", "sk-YOUR", "hf_YOUR"];
    !key.trim().is_empty() && !placeholder_prefixes.iter().any(|p| key.contains(p))
}

// ── Classifier Configuration ────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassifierConfig {
    /// Upper bound for one remote round-trip, retries included.
    pub request_timeout_seconds: u64,
    /// Inquiries classified at once in a batch. 1 = strictly sequential.
    pub max_concurrency: usize,
    /// Artificial delay before each local classification, for UI testing.
    pub simulated_latency_ms: u64,
    /// Set to false to never call a remote backend.
    pub use_remote: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: 30,
            max_concurrency: 1,
            simulated_latency_ms: 0,
            use_remote: true,
        }
    }
}

impl ClassifierConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds.max(1))
    }

    pub fn simulated_latency(&self) -> Option<Duration> {
        (self.simulated_latency_ms > 0).then(|| Duration::from_millis(self.simulated_latency_ms))
    }
}
