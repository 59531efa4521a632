//! Entity-pair enumeration
//!
//! Full Cartesian product of the mentions of two labels, in mention order.
//! No deduplication: a token appears in every pair it can form.

use penemuu_core::{ParsedDocument, Sentence, TokenRef};

/// Anything that can list its entity mentions by label, in text order
pub trait MentionSource {
    fn mentions(&self, label: &str) -> Vec<TokenRef>;
}

impl MentionSource for Sentence {
    fn mentions(&self, label: &str) -> Vec<TokenRef> {
        Sentence::mentions(self, label)
    }
}

impl MentionSource for [Sentence] {
    fn mentions(&self, label: &str) -> Vec<TokenRef> {
        self.iter().flat_map(|s| Sentence::mentions(s, label)).collect()
    }
}

impl MentionSource for ParsedDocument {
    fn mentions(&self, label: &str) -> Vec<TokenRef> {
        self.sentences.as_slice().mentions(label)
    }
}

/// Every (label_a mention, label_b mention) pair
///
/// At document scope pairs may span sentences; such pairs have no common
/// ancestor and are rejected by the relation extractor.
pub fn entity_pairs<S: MentionSource + ?Sized>(
    source: &S,
    label_a: &str,
    label_b: &str,
) -> Vec<(TokenRef, TokenRef)> {
    let firsts = source.mentions(label_a);
    let seconds = source.mentions(label_b);

    let mut pairs = Vec::with_capacity(firsts.len() * seconds.len());
    for &first in &firsts {
        for &second in &seconds {
            pairs.push((first, second));
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use penemuu_core::Token;

    fn sentence(labels: &[Option<&str>]) -> Sentence {
        let tokens = labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let token = if i == 0 {
                    Token::root(format!("w{}", i), "NOUN")
                } else {
                    Token::new(format!("w{}", i), "NOUN", "dep", 0)
                };
                match label {
                    Some(l) => token.with_entity(*l),
                    None => token,
                }
            })
            .collect();
        Sentence::from_tokens(tokens).unwrap()
    }

    #[test]
    fn test_cartesian_order() {
        let sent = sentence(&[
            None,
            Some("BACTERIA"),
            Some("HABITAT"),
            Some("BACTERIA"),
            Some("HABITAT"),
            Some("HABITAT"),
        ]);
        let pairs: Vec<(usize, usize)> = entity_pairs(&sent, "BACTERIA", "HABITAT")
            .into_iter()
            .map(|(a, b)| (a.index(), b.index()))
            .collect();
        assert_eq!(
            pairs,
            vec![(1, 2), (1, 4), (1, 5), (3, 2), (3, 4), (3, 5)]
        );
    }

    #[test]
    fn test_missing_label_yields_nothing() {
        let sent = sentence(&[None, Some("BACTERIA")]);
        assert!(entity_pairs(&sent, "BACTERIA", "HABITAT").is_empty());
        assert!(entity_pairs(&sent, "HABITAT", "BACTERIA").is_empty());
    }

    #[test]
    fn test_same_label_pairs_with_itself() {
        let sent = sentence(&[None, Some("BACTERIA"), Some("BACTERIA")]);
        let pairs = entity_pairs(&sent, "BACTERIA", "BACTERIA");
        assert_eq!(pairs.len(), 4);
        assert_eq!(pairs[0].0, pairs[0].1);
    }

    #[test]
    fn test_document_scope_spans_sentences() {
        let doc = ParsedDocument::new(
            "doc",
            vec![
                sentence(&[Some("BACTERIA"), Some("HABITAT")]),
                sentence(&[None, Some("HABITAT")]),
            ],
        );
        let pairs = entity_pairs(&doc, "BACTERIA", "HABITAT");
        assert_eq!(pairs.len(), 2);
        assert_ne!(pairs[1].0.sentence(), pairs[1].1.sentence());
    }
}
