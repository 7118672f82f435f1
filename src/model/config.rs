use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

const ENV_CONFIG_PATH: &str = "ADVISOR_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "advisor.yaml";

const ENV_API_KEY: &str = "GEMINI_API_KEY";
const ENV_MODEL: &str = "GEMINI_MODEL";
const ENV_BASE_URL: &str = "GEMINI_BASE_URL";
const ENV_PIPELINE: &str = "ADVISOR_PIPELINE";

const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How a message is turned into an outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStrategy {
    /// One call classifies and assesses together
    #[default]
    SinglePass,
    /// A triage call first; a severity call only for incidents
    TwoPass,
}

impl PipelineStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStrategy::SinglePass => "single_pass",
            PipelineStrategy::TwoPass => "two_pass",
        }
    }
}

impl fmt::Display for PipelineStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "single_pass" => Ok(PipelineStrategy::SinglePass),
            "two_pass" => Ok(PipelineStrategy::TwoPass),
            other => Err(format!("Unknown pipeline strategy: {}", other)),
        }
    }
}

/// `generation` section of the YAML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationFileConfig {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub pipeline: Option<PipelineStrategy>,
    #[serde(default)]
    pub generation: GenerationFileConfig,
}

/// Generation service connection settings
#[derive(Clone)]
pub struct GenerationSettings {
    /// Absent until configured; calls fail with a configuration error meanwhile
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl fmt::Debug for GenerationSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub pipeline: PipelineStrategy,
    pub generation: GenerationSettings,
}

impl Config {
    /// Load configuration from environment and config file
    ///
    /// Environment variables win over the file, the file over defaults.
    pub fn from_env() -> Self {
        let config_path = std::env::var(ENV_CONFIG_PATH)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let file = Self::load_config_file(&config_path);

        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Resolve configuration from an optional file and a variable lookup
    pub fn from_sources<F>(file: Option<ConfigFile>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = file.unwrap_or_default();
        let defaults = GenerationSettings::default();
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let pipeline = match lookup(ENV_PIPELINE) {
            Some(value) => value.parse::<PipelineStrategy>().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring {}, using configured pipeline", ENV_PIPELINE);
                file.pipeline.unwrap_or_default()
            }),
            None => file.pipeline.unwrap_or_default(),
        };

        let generation = GenerationSettings {
            api_key: lookup(ENV_API_KEY),
            model: lookup(ENV_MODEL)
                .or(file.generation.model)
                .unwrap_or(defaults.model),
            base_url: lookup(ENV_BASE_URL)
                .or(file.generation.base_url)
                .unwrap_or(defaults.base_url),
            timeout: file
                .generation
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        };

        if generation.api_key.is_none() {
            tracing::warn!("{} is not set, analysis calls will fail until configured", ENV_API_KEY);
        }

        Self {
            pipeline,
            generation,
        }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => Self::parse_config_file(path, &contents),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    fn parse_config_file(path: &Path, contents: &str) -> Option<ConfigFile> {
        let contents = contents.trim();
        if contents.is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Some(ConfigFile::default());
        }

        match serde_yaml::from_str(contents) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "Loaded configuration from file");
                Some(config)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                None
            }
        }
    }
}
