//! NLP pipeline capability
//!
//! Tokenization, tagging, sentence segmentation, entity recognition and
//! dependency parsing are external. This module only fixes the contract an
//! adapter must satisfy and the configuration it is built from.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::document::ParsedDocument;
use crate::Result;

/// Stages of the external pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Tokenizer,
    Tagger,
    /// Dictionary-driven entity recognition
    EntityRuler,
    /// Sentence boundary detection
    SentenceBoundary,
    Parser,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tokenizer => "tokenizer",
            Self::Tagger => "tagger",
            Self::EntityRuler => "entity_ruler",
            Self::SentenceBoundary => "sentence_boundary",
            Self::Parser => "parser",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stage names as written in adapter configuration files
impl std::str::FromStr for PipelineStage {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tokenizer" => Ok(Self::Tokenizer),
            "tagger" => Ok(Self::Tagger),
            "entity_ruler" => Ok(Self::EntityRuler),
            "sentence_boundary" => Ok(Self::SentenceBoundary),
            "parser" => Ok(Self::Parser),
            _ => Err(ConfigError::InvalidValue {
                key: "parser.stages".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Immutable description of how the external pipeline is assembled.
///
/// Built once at startup and handed to the pipeline by value; there are no
/// setters after construction, only the consuming builder methods below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfiguration {
    model: String,
    stages: Vec<PipelineStage>,
    entity_patterns: Option<PathBuf>,
    lowercase: bool,
    merge_entities: bool,
}

impl Default for ParserConfiguration {
    fn default() -> Self {
        Self {
            model: "en_core_web_sm".to_string(),
            stages: vec![
                PipelineStage::Tokenizer,
                PipelineStage::Tagger,
                PipelineStage::EntityRuler,
                PipelineStage::SentenceBoundary,
                PipelineStage::Parser,
            ],
            entity_patterns: None,
            lowercase: true,
            merge_entities: true,
        }
    }
}

impl ParserConfiguration {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_stages(mut self, stages: Vec<PipelineStage>) -> Self {
        self.stages = stages;
        self
    }

    /// Pattern file with one entity definition per line
    pub fn with_entity_patterns(mut self, path: impl Into<PathBuf>) -> Self {
        self.entity_patterns = Some(path.into());
        self
    }

    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    pub fn with_merge_entities(mut self, merge: bool) -> Self {
        self.merge_entities = merge;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    pub fn entity_patterns(&self) -> Option<&Path> {
        self.entity_patterns.as_deref()
    }

    pub fn lowercase(&self) -> bool {
        self.lowercase
    }

    /// Whether the adapter should merge multi-token entity spans into single
    /// tokens before parsing. Read by `NlpPipeline` implementations; the
    /// extractor itself always treats a mention as one token.
    pub fn merge_entities(&self) -> bool {
        self.merge_entities
    }

    pub fn has_stage(&self, stage: PipelineStage) -> bool {
        self.stages.contains(&stage)
    }

    fn position(&self, stage: PipelineStage) -> Option<usize> {
        self.stages.iter().position(|s| *s == stage)
    }

    /// Check the stage list describes a usable pipeline
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::MissingRequired("parser.model".to_string()));
        }

        if self.stages.first() != Some(&PipelineStage::Tokenizer) {
            return Err(ConfigError::InvalidValue {
                key: "parser.stages".to_string(),
                value: "tokenizer must be the first stage".to_string(),
            });
        }

        for (i, stage) in self.stages.iter().enumerate() {
            if self.stages[..i].contains(stage) {
                return Err(ConfigError::InvalidValue {
                    key: "parser.stages".to_string(),
                    value: format!("duplicate stage {}", stage),
                });
            }
        }

        let parser = self
            .position(PipelineStage::Parser)
            .ok_or_else(|| ConfigError::MissingRequired("parser stage".to_string()))?;

        if let Some(sbd) = self.position(PipelineStage::SentenceBoundary) {
            if sbd > parser {
                return Err(ConfigError::InvalidValue {
                    key: "parser.stages".to_string(),
                    value: "sentence_boundary must run before parser".to_string(),
                });
            }
        }

        if self.has_stage(PipelineStage::EntityRuler) && self.entity_patterns.is_none() {
            tracing::debug!("entity_ruler stage configured without a pattern file");
        }

        Ok(())
    }
}

/// An external NLP pipeline producing parsed documents from text
pub trait NlpPipeline: Send + Sync {
    /// The configuration the pipeline was assembled from
    fn configuration(&self) -> &ParserConfiguration;

    /// Tokenize, tag, segment, recognise entities and parse `text`
    fn annotate(&self, text: &str) -> Result<ParsedDocument>;
}

// ============================================================================
// Tests
// ============================================================================
