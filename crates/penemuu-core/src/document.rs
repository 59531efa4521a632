//! Parsed documents and text passages
//!
//! `RawDocument` is the serde wire format emitted by the external NLP
//! pipeline. Converting it into a `ParsedDocument` validates each sentence
//! independently, so one malformed parse never discards its neighbours.

use serde::{Deserialize, Serialize};

use crate::tree::{Sentence, Token};
use crate::{PenemuuError, Result};

// ============================================================================
// Wire format
// ============================================================================

/// One sentence as emitted by the external pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSentence {
    pub tokens: Vec<Token>,
}

/// One document as emitted by the external pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDocument {
    /// Document identifier (e.g. a PubMed id)
    #[serde(default)]
    pub id: String,

    pub sentences: Vec<RawSentence>,
}

/// A sentence that failed validation
#[derive(Debug)]
pub struct RejectedSentence {
    /// Position of the sentence within its raw document
    pub position: usize,
    pub error: PenemuuError,
}

/// Outcome of a lenient document conversion
#[derive(Debug)]
pub struct DocumentParse {
    pub document: ParsedDocument,
    pub rejected: Vec<RejectedSentence>,
}

impl RawDocument {
    /// Validate every sentence, keeping the good ones and reporting the rest
    pub fn parse(self) -> DocumentParse {
        let mut sentences = Vec::with_capacity(self.sentences.len());
        let mut rejected = Vec::new();

        for (position, raw) in self.sentences.into_iter().enumerate() {
            match Sentence::from_tokens(raw.tokens) {
                Ok(sentence) => sentences.push(sentence),
                Err(error) => {
                    tracing::warn!(
                        document = %self.id,
                        position,
                        "Rejected sentence: {}",
                        error
                    );
                    rejected.push(RejectedSentence { position, error });
                }
            }
        }

        DocumentParse {
            document: ParsedDocument {
                id: self.id,
                sentences,
            },
            rejected,
        }
    }
}

// ============================================================================
// Parsed document
// ============================================================================

/// A document whose sentences are all validated dependency trees
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    pub id: String,
    pub sentences: Vec<Sentence>,
}

impl ParsedDocument {
    pub fn new(id: impl Into<String>, sentences: Vec<Sentence>) -> Self {
        Self {
            id: id.into(),
            sentences,
        }
    }

    /// Strict conversion: the first invalid sentence fails the document
    pub fn try_from_raw(raw: RawDocument) -> Result<Self> {
        let sentences = raw
            .sentences
            .into_iter()
            .map(|s| Sentence::from_tokens(s.tokens))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            id: raw.id,
            sentences,
        })
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }
}

// ============================================================================
// Text passages
// ============================================================================

/// A biomedical text split into title and abstract
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPassage {
    pub title: String,
    pub abstract_text: String,

    /// Text handed to the pipeline
    pub passage: String,
}

impl TextPassage {
    /// Passage is title and abstract joined by a single space
    pub fn from_title_and_abstract(
        title: impl Into<String>,
        abstract_text: impl Into<String>,
    ) -> Self {
        let title = title.into();
        let abstract_text = abstract_text.into();
        let passage = format!("{} {}", title, abstract_text);
        Self {
            title,
            abstract_text,
            passage,
        }
    }

    /// Passage from plain text, without title or abstract
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            passage: text.into(),
            ..Default::default()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DependencyTree;

    const DOC_JSON: &str = r#"{
        "id": "pmid-1",
        "sentences": [
            {"tokens": [
                {"text": "x", "pos": "PROPN", "dep": "nsubj", "head": 1, "entity": "BACTERIA"},
                {"text": "grows", "pos": "VERB", "dep": "ROOT", "head": null},
                {"text": "in", "pos": "ADP", "dep": "prep", "head": 1},
                {"text": "y", "pos": "PROPN", "dep": "pobj", "head": 2, "entity": "HABITAT"}
            ]},
            {"tokens": [
                {"text": "a", "dep": "ROOT"},
                {"text": "b", "dep": "ROOT"}
            ]},
            {"tokens": [
                {"text": "it", "dep": "nsubj", "head": 1},
                {"text": "lives", "dep": "ROOT", "head": 1}
            ]}
        ]
    }"#;

    #[test]
    fn test_lenient_parse_keeps_valid_sentences() {
        let raw: RawDocument = serde_json::from_str(DOC_JSON).unwrap();
        let parse = raw.parse();

        assert_eq!(parse.document.id, "pmid-1");
        assert_eq!(parse.document.sentence_count(), 2);
        assert_eq!(parse.rejected.len(), 1);
        assert_eq!(parse.rejected[0].position, 1);
        assert!(matches!(
            parse.rejected[0].error,
            PenemuuError::InvalidParse { .. }
        ));

        let first = &parse.document.sentences[0];
        assert_eq!(first.root().index(), 1);
        assert_eq!(first.mentions("HABITAT").len(), 1);
    }

    #[test]
    fn test_strict_parse_fails_on_invalid_sentence() {
        let raw: RawDocument = serde_json::from_str(DOC_JSON).unwrap();
        assert!(ParsedDocument::try_from_raw(raw).is_err());
    }

    #[test]
    fn test_passage_from_title_and_abstract() {
        let passage = TextPassage::from_title_and_abstract(
            "Thermophiles in hot springs.",
            "We isolated dictyoglomus thermophilum.",
        );
        assert_eq!(
            passage.passage,
            "Thermophiles in hot springs. We isolated dictyoglomus thermophilum."
        );
        assert_eq!(passage.title, "Thermophiles in hot springs.");
    }

    #[test]
    fn test_passage_from_text() {
        let passage = TextPassage::from_text("soil bacteria");
        assert_eq!(passage.passage, "soil bacteria");
        assert!(passage.title.is_empty());
        assert!(passage.abstract_text.is_empty());
    }
}
