// src/error.rs
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Fields the extractor is expected to locate on every posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobField {
    Title,
    Company,
    Description,
}

impl JobField {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobField::Title => "title",
            JobField::Company => "company",
            JobField::Description => "description",
        }
    }
}

impl fmt::Display for JobField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid job URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unexpected HTTP status {status_code} from {url}")]
    Status { status_code: u16, url: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    /// Timeouts and connection failures are worth one more attempt; HTTP statuses are not.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Timeout { .. } | FetchError::Transport { .. })
    }
}

/// A field the ruleset could not locate. Non-fatal: the posting carries an empty value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not locate job {field} on the page")]
pub struct ParseError {
    pub field: JobField,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template '{id}' not found")]
    MissingTemplate { id: String },

    #[error("template '{template}' uses unknown placeholder '{placeholder}'")]
    UnknownPlaceholder {
        template: String,
        placeholder: String,
    },

    #[error("template '{template}' opens section '{section}' without closing it")]
    UnclosedSection { template: String, section: String },

    #[error("template '{template}' has an unterminated '{{{{' at byte {offset}")]
    UnterminatedTag { template: String, offset: usize },

    #[error("failed to read template {path}: {message}")]
    Io { path: PathBuf, message: String },
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read profile {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse profile {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid profile: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to resolve current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize analysis: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Everything that can abort a run of the pipeline.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

impl AppError {
    /// Short kind label for user-facing reports.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Fetch(_) => "FetchError",
            AppError::Render(_) => "RenderError",
            AppError::Profile(_) => "ProfileError",
            AppError::Config(_) => "ConfigError",
            AppError::Output(_) => "OutputError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_names_field() {
        let err = ParseError {
            field: JobField::Title,
        };
        assert_eq!(err.field.as_str(), "title");
        assert_eq!(err.to_string(), "could not locate job title on the page");
    }

    #[test]
    fn test_fetch_error_transient() {
        let timeout = FetchError::Timeout {
            url: "https://example.com".to_string(),
        };
        let status = FetchError::Status {
            status_code: 404,
            url: "https://example.com".to_string(),
        };
        assert!(timeout.is_transient());
        assert!(!status.is_transient());
    }

    #[test]
    fn test_app_error_kind() {
        let err: AppError = FetchError::Status {
            status_code: 503,
            url: "https://example.com".to_string(),
        }
        .into();
        assert_eq!(err.kind(), "FetchError");
        assert!(err.to_string().contains("503"));
    }
}
