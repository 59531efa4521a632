//! Corpus helpers
//!
//! Passage annotation through an external `NlpPipeline` and label-based
//! sentence selection.

use penemuu_core::{NlpPipeline, ParsedDocument, Result, Sentence, TextPassage};

/// Sentences holding at least one entity of every requested label.
///
/// An empty label list selects every sentence.
pub fn sentences_with_labels<'a>(sentences: &'a [Sentence], labels: &[String]) -> Vec<&'a Sentence> {
    sentences
        .iter()
        .filter(|sentence| {
            labels
                .iter()
                .all(|label| !sentence.mentions(label).is_empty())
        })
        .collect()
}

/// A passage together with its annotation
#[derive(Debug, Clone)]
pub struct AnnotatedPassage {
    pub passage: TextPassage,
    pub document: ParsedDocument,
}

/// Annotate each passage independently.
///
/// One result per passage, in input order; a failing passage does not stop
/// the others. Text is lower-cased first when the pipeline is configured so.
pub fn annotate_passages<P: NlpPipeline + ?Sized>(
    pipeline: &P,
    passages: Vec<TextPassage>,
) -> Vec<Result<AnnotatedPassage>> {
    let lowercase = pipeline.configuration().lowercase();

    passages
        .into_iter()
        .enumerate()
        .map(|(position, passage)| {
            let text = if lowercase {
                passage.passage.to_lowercase()
            } else {
                passage.passage.clone()
            };

            match pipeline.annotate(&text) {
                Ok(document) => {
                    tracing::debug!(
                        position,
                        sentences = document.sentence_count(),
                        "passage annotated"
                    );
                    Ok(AnnotatedPassage { passage, document })
                }
                Err(e) => {
                    tracing::warn!(position, error = %e, "passage annotation failed");
                    Err(e)
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use penemuu_core::{DependencyTree, ParserConfiguration, PenemuuError, Token};

    /// Whitespace "parser": first word is the root, the rest attach to it
    struct FlatPipeline {
        config: ParserConfiguration,
    }

    impl NlpPipeline for FlatPipeline {
        fn configuration(&self) -> &ParserConfiguration {
            &self.config
        }

        fn annotate(&self, text: &str) -> Result<ParsedDocument> {
            let words: Vec<&str> = text.split_whitespace().collect();
            if words.is_empty() {
                return Err(PenemuuError::Pipeline("nothing to annotate".to_string()));
            }
            let tokens = words
                .iter()
                .enumerate()
                .map(|(i, w)| {
                    if i == 0 {
                        Token::root(*w, "X")
                    } else {
                        Token::new(*w, "X", "dep", 0)
                    }
                })
                .collect();
            Ok(ParsedDocument::new("flat", vec![Sentence::from_tokens(tokens)?]))
        }
    }

    fn labelled(labels: &[&str]) -> Sentence {
        let mut tokens = vec![Token::root("root", "X")];
        for label in labels {
            tokens.push(Token::new(label.to_lowercase(), "X", "dep", 0).with_entity(*label));
        }
        Sentence::from_tokens(tokens).unwrap()
    }

    #[test]
    fn test_sentences_with_labels() {
        let sentences = vec![
            labelled(&["BACTERIA", "HABITAT"]),
            labelled(&["BACTERIA"]),
            labelled(&[]),
            labelled(&["HABITAT", "BACTERIA", "GENE"]),
        ];
        let wanted = vec!["BACTERIA".to_string(), "HABITAT".to_string()];

        let selected = sentences_with_labels(&sentences, &wanted);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].sentence_id(), sentences[0].sentence_id());
        assert_eq!(selected[1].sentence_id(), sentences[3].sentence_id());

        assert_eq!(sentences_with_labels(&sentences, &[]).len(), 4);
    }

    #[test]
    fn test_annotate_passages_lowercases() {
        let pipeline = FlatPipeline {
            config: ParserConfiguration::default(),
        };
        let passages = vec![TextPassage::from_title_and_abstract("Title", "Some Text")];

        let results = annotate_passages(&pipeline, passages);
        let annotated = results.into_iter().next().unwrap().unwrap();
        assert_eq!(annotated.passage.title, "Title");
        assert_eq!(annotated.document.sentences[0].text(), "title some text");
    }

    #[test]
    fn test_failing_passage_does_not_stop_others() {
        let pipeline = FlatPipeline {
            config: ParserConfiguration::default().with_lowercase(false),
        };
        let passages = vec![
            TextPassage::from_text("First One"),
            TextPassage::from_text("   "),
            TextPassage::from_text("third"),
        ];

        let results = annotate_passages(&pipeline, passages);
        assert_eq!(results.len(), 3);
        assert_eq!(
            results[0].as_ref().unwrap().document.sentences[0].text(),
            "First One"
        );
        assert!(matches!(results[1], Err(PenemuuError::Pipeline(_))));
        assert!(results[2].is_ok());
    }
}
