//! penemuu Core - Domain models, tree adapter and shared types
//!
//! This crate defines the abstractions the relation engine runs on:
//! - Tokens and sentences as validated dependency trees
//! - The `DependencyTree` capability trait every parser adapter implements
//! - Parsed documents, raw wire format and text passages
//! - The `NlpPipeline` capability trait and its immutable configuration
//! - Common error types
//! - Configuration management

pub mod config;
pub mod document;
pub mod pipeline;
pub mod tree;

pub use config::{AppConfig, ConfigError, ExtractionConfig, LabelScheme, LoggingConfig};
pub use document::{
    DocumentParse, ParsedDocument, RawDocument, RawSentence, RejectedSentence, TextPassage,
};
pub use pipeline::{NlpPipeline, ParserConfiguration, PipelineStage};
pub use tree::{DependencyTree, Sentence, SentenceId, Token, TokenRef};

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for penemuu operations
#[derive(Error, Debug)]
pub enum PenemuuError {
    /// The external parse is not a well-formed dependency tree
    #[error("Invalid parse: {reason}")]
    InvalidParse { reason: String },

    /// Two tokens were compared that do not share a sentence
    #[error("No common ancestor: {first} and {second} belong to different sentences")]
    NoCommonAncestor { first: TokenRef, second: TokenRef },

    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Failure reported by an external NLP pipeline
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PenemuuError {
    /// Shorthand for an `InvalidParse` error
    pub fn invalid_parse(reason: impl Into<String>) -> Self {
        Self::InvalidParse {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PenemuuError>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parse_message() {
        let err = PenemuuError::invalid_parse("sentence has 2 roots");
        assert_eq!(err.to_string(), "Invalid parse: sentence has 2 roots");
    }

    #[test]
    fn test_config_error_converts() {
        let err: PenemuuError = ConfigError::MissingRequired("labels.negation".to_string()).into();
        assert!(matches!(err, PenemuuError::Config(_)));
        assert!(err.to_string().contains("labels.negation"));
    }
}
