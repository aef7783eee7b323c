//! Configuration management for groundqa.
//!
//! Settings are layered, lowest priority first: built-in defaults, a TOML
//! config file, environment variables (a `.env` file is loaded at startup),
//! then command-line flags applied by the caller.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::batch::DEFAULT_OUTPUT;
use crate::extraction::{DocumentProcessor, ProcessorOptions, DEFAULT_POLL_INTERVAL};
use crate::llm::{GeminiClient, LlmConfig, LlmError};

/// Config filename looked up in the working directory.
pub const CONFIG_FILENAME: &str = "groundqa.toml";

/// Default address for the upload interface.
pub const DEFAULT_BIND: &str = "127.0.0.1:8501";

/// Errors that stop the program before any document is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "GEMINI_API_KEY not found in environment variables!\n\
         Please create a .env file with your API key:\n  \
         1. Copy .env.example to .env\n  \
         2. Replace 'your_api_key_here' with your actual Gemini API key\n  \
         3. Get your key from: https://aistudio.google.com/apikey"
    )]
    MissingApiKey,

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to create Gemini client: {0}")]
    Client(#[from] LlmError),
}

/// On-disk configuration file.
///
/// ```toml
/// output = "data/train.jsonl"
/// poll_interval_secs = 2
/// max_poll_attempts = 300
/// bind = "0.0.0.0:8501"
///
/// [gemini]
/// model = "gemini-2.5-pro"
/// temperature = 0.1
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Gemini client settings.
    #[serde(default)]
    pub gemini: LlmConfig,
    /// Output JSONL path (relative paths resolve against the config file).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Seconds between processing-state checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_secs: Option<u64>,
    /// Maximum processing-state checks per document (unbounded if unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_poll_attempts: Option<u32>,
    /// Upload interface bind address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    /// Path this config was loaded from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Directory of the config file, if loaded from one.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent())
            .map(Path::to_path_buf)
    }

    /// Resolve a path that may be relative to the config file.
    /// - Paths starting with ~ are expanded
    /// - Absolute paths are returned as-is
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        settings.llm = self.gemini.clone();
        if let Some(ref output) = self.output {
            settings.output = self.resolve_path(output, base_dir);
        }
        if let Some(secs) = self.poll_interval_secs {
            settings.poll_interval = Duration::from_secs(secs);
        }
        if self.max_poll_attempts.is_some() {
            settings.max_poll_attempts = self.max_poll_attempts;
        }
        if let Some(ref bind) = self.bind {
            settings.bind = bind.clone();
        }
    }
}

/// Resolved application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Gemini client settings, including the API key.
    pub llm: LlmConfig,
    /// Output JSONL path.
    pub output: PathBuf,
    /// Delay between processing-state checks.
    pub poll_interval: Duration,
    /// Maximum processing-state checks per document (`None` = unbounded).
    pub max_poll_attempts: Option<u32>,
    /// Upload interface bind address.
    pub bind: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: None,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

impl Settings {
    /// Apply environment variable overrides.
    ///
    /// Supported env vars (in addition to the `GEMINI_*` client variables):
    /// - `GROUNDQA_OUTPUT`: Output JSONL path
    /// - `GROUNDQA_POLL_INTERVAL`: Seconds between processing-state checks
    /// - `GROUNDQA_MAX_POLLS`: Maximum processing-state checks per document
    /// - `GROUNDQA_BIND`: Upload interface bind address
    pub fn with_env_overrides(mut self) -> Self {
        self.llm = self.llm.with_env_overrides();

        if let Some(val) = env_nonempty("GROUNDQA_OUTPUT") {
            self.output = PathBuf::from(shellexpand::tilde(&val).as_ref());
        }
        if let Some(val) = env_nonempty("GROUNDQA_POLL_INTERVAL") {
            if let Ok(secs) = val.parse() {
                self.poll_interval = Duration::from_secs(secs);
            }
        }
        if let Some(val) = env_nonempty("GROUNDQA_MAX_POLLS") {
            if let Ok(n) = val.parse() {
                self.max_poll_attempts = Some(n);
            }
        }
        if let Some(val) = env_nonempty("GROUNDQA_BIND") {
            self.bind = val;
        }
        self
    }

    /// The configured API key, or a startup error with remediation steps.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.llm
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    /// Lifecycle options for the document processor.
    pub fn processor_options(&self) -> ProcessorOptions {
        ProcessorOptions {
            poll_interval: self.poll_interval,
            max_poll_attempts: self.max_poll_attempts,
            ..Default::default()
        }
    }

    /// Build a processor backed by the Gemini client.
    pub fn create_processor(&self) -> Result<DocumentProcessor, ConfigError> {
        self.require_api_key()?;
        let client = GeminiClient::new(self.llm.clone())?;
        tracing::debug!("Using Gemini model {}", client.config().model);
        Ok(DocumentProcessor::new(
            Arc::new(client),
            self.processor_options(),
        ))
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
}

/// Find a config file when none was given explicitly.
/// Checks the working directory, then the user config directory.
fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|d| d.join("groundqa").join("config.toml"))
        .filter(|p| p.is_file())
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub fn load_settings_with_options(options: LoadOptions) -> Result<(Settings, Config), ConfigError> {
    let config = match options.config_path {
        Some(ref path) => {
            let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
            Config::load_from_path(Path::new(&expanded))?
        }
        None => match find_config_file() {
            Some(path) => {
                tracing::debug!("Found config file: {}", path.display());
                Config::load_from_path(&path)?
            }
            None => Config::default(),
        },
    };

    let base_dir = config
        .base_dir()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);

    Ok((settings.with_env_overrides(), config))
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}
