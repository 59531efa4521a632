//! penemuu Configuration Management
//!
//! Handles configuration from environment variables and TOML files with
//! defaults matching a Universal-Dependencies-style English parser.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::pipeline::ParserConfiguration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// External pipeline assembly
    pub parser: ParserConfiguration,

    /// Dependency labeling scheme
    pub labels: LabelScheme,

    /// Relation extraction settings
    pub extraction: ExtractionConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        self.apply_env()?;
        self.validate()?;
        Ok(self)
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        // Labeling scheme
        if let Ok(labels) = std::env::var("PENEMUU_NEGATION_LABELS") {
            self.labels.negation = split_list(&labels);
        }
        if let Ok(labels) = std::env::var("PENEMUU_SUBJECT_LABELS") {
            self.labels.subject = split_list(&labels);
        }
        if let Ok(labels) = std::env::var("PENEMUU_OBJECT_LABELS") {
            self.labels.object = split_list(&labels);
        }

        // Entity pair
        if let Ok(label) = std::env::var("PENEMUU_LABEL_A") {
            self.extraction.label_a = label;
        }
        if let Ok(label) = std::env::var("PENEMUU_LABEL_B") {
            self.extraction.label_b = label;
        }
        if let Ok(value) = std::env::var("PENEMUU_FAIL_FAST") {
            self.extraction.fail_fast = parse_bool("PENEMUU_FAIL_FAST", &value)?;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            self.logging.json_format = format.eq_ignore_ascii_case("json");
        }

        Ok(())
    }

    /// Check every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.parser.validate()?;
        self.labels.validate()?;
        self.extraction.validate()?;
        Ok(())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Dependency-relation label sets of the external parser's scheme
///
/// Labels are compared ASCII case-insensitively, so `neg` and `NEG` match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelScheme {
    /// Labels marking a token as negating its head
    pub negation: Vec<String>,

    /// Nominal, clausal and passive nominal subjects
    pub subject: Vec<String>,

    /// Prepositional, direct and indirect objects
    pub object: Vec<String>,
}

impl Default for LabelScheme {
    fn default() -> Self {
        Self {
            negation: vec!["neg".to_string()],
            subject: vec![
                "nsubj".to_string(),
                "csubj".to_string(),
                "nsubjpass".to_string(),
            ],
            object: vec!["pobj".to_string(), "dobj".to_string(), "iobj".to_string()],
        }
    }
}

impl LabelScheme {
    fn matches(set: &[String], label: &str) -> bool {
        set.iter().any(|l| l.eq_ignore_ascii_case(label))
    }

    pub fn is_negation(&self, label: &str) -> bool {
        Self::matches(&self.negation, label)
    }

    pub fn is_subject(&self, label: &str) -> bool {
        Self::matches(&self.subject, label)
    }

    pub fn is_object(&self, label: &str) -> bool {
        Self::matches(&self.object, label)
    }

    /// Subject and object sets must be disjoint; a negation label is required
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.negation.is_empty() {
            return Err(ConfigError::MissingRequired("labels.negation".to_string()));
        }

        if let Some(shared) = self.subject.iter().find(|l| self.is_object(l)) {
            return Err(ConfigError::InvalidValue {
                key: "labels".to_string(),
                value: format!("'{}' is both a subject and an object label", shared),
            });
        }

        Ok(())
    }
}

/// Relation extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// First entity label of a pair
    pub label_a: String,

    /// Second entity label of a pair
    pub label_b: String,

    /// Abort a corpus run on the first invalid sentence instead of skipping it
    pub fail_fast: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            label_a: "BACTERIA".to_string(),
            label_b: "HABITAT".to_string(),
            fail_fast: false,
        }
    }
}

impl ExtractionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.label_a.trim().is_empty() {
            return Err(ConfigError::MissingRequired("extraction.label_a".to_string()));
        }
        if self.label_b.trim().is_empty() {
            return Err(ConfigError::MissingRequired("extraction.label_b".to_string()));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,

    /// Include file/line in logs
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            include_location: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
