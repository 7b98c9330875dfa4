// src/environment.rs
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;
use crate::extraction::job_scraper::BROWSER_USER_AGENT;
use crate::extraction::ScraperSettings;
use crate::generation::ScoreWeighting;

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub output_path: PathBuf,
    /// Directory of `*.txt` letter templates; built-in templates when unset.
    pub templates_path: Option<PathBuf>,
    /// Applicant profile TOML; built-in profile when unset.
    pub profile_path: Option<PathBuf>,
    pub request_timeout_secs: u64,
    pub retry_once: bool,
    pub weighted_scoring: bool,
    pub user_agent: Option<String>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("."),
            templates_path: None,
            profile_path: None,
            request_timeout_secs: 15,
            retry_once: false,
            weighted_scoring: false,
            user_agent: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: Option<EnvironmentConfig>,
    #[serde(default)]
    production: Option<EnvironmentConfig>,
}

impl EnvironmentConfig {
    /// Load configuration for the current environment; a missing file means defaults.
    pub fn load(config_path: &Path) -> Result<Self, ConfigError> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);
        Self::load_for(config_path, &environment)
    }

    pub fn get_environment() -> String {
        std::env::var("TAILORED_APPLY_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    pub fn load_for(config_path: &Path, environment: &str) -> Result<Self, ConfigError> {
        let config = if config_path.exists() {
            let content =
                std::fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
                    path: config_path.to_path_buf(),
                    source,
                })?;
            Self::from_yaml(&content, environment).map_err(|source| ConfigError::Parse {
                path: config_path.to_path_buf(),
                source,
            })?
        } else {
            info!(
                "{} not found, using default configuration",
                config_path.display()
            );
            Self::default()
        };

        let current_dir = std::env::current_dir().map_err(ConfigError::CurrentDir)?;
        Ok(config.resolve_paths(&current_dir))
    }

    fn from_yaml(content: &str, environment: &str) -> Result<Self, serde_yaml::Error> {
        let file: ConfigFile = serde_yaml::from_str(content)?;
        let selected = match environment {
            "production" => file.production,
            _ => file.local,
        };
        Ok(selected.unwrap_or_default())
    }

    /// Make relative paths absolute against `base`.
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        let resolve = |path: &Path| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                base.join(path)
            }
        };
        self.output_path = resolve(&self.output_path);
        self.templates_path = self.templates_path.as_deref().map(resolve);
        self.profile_path = self.profile_path.as_deref().map(resolve);
        self
    }

    pub fn scraper_settings(&self) -> ScraperSettings {
        ScraperSettings {
            timeout_secs: self.request_timeout_secs,
            user_agent: self
                .user_agent
                .clone()
                .unwrap_or_else(|| BROWSER_USER_AGENT.to_string()),
            retry_once: self.retry_once,
        }
    }

    pub fn weighting(&self) -> ScoreWeighting {
        if self.weighted_scoring {
            ScoreWeighting::SkillWeights
        } else {
            ScoreWeighting::Uniform
        }
    }
}
