//! Corpus Breakdown Aggregator
//!
//! Buckets sentence indices by the grammatical role each entity type plays
//! in its candidate pairs, then derives the subject/object cross buckets by
//! set intersection.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use penemuu_core::{LabelScheme, PenemuuError, Result, Sentence};

use crate::pairs::entity_pairs;
use crate::roles::classify_roles;

// ============================================================================
// Bucket names
// ============================================================================

/// Bucket keys for one entity-type pair, e.g. `bacteria_subj_habitat_obj_sents`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketNames {
    pub a_subject: String,
    pub a_object: String,
    pub b_subject: String,
    pub b_object: String,
    pub a_subject_b_object: String,
    pub b_subject_a_object: String,
}

impl BucketNames {
    pub fn new(type_a: &str, type_b: &str) -> Self {
        let a = type_a.to_lowercase();
        let b = type_b.to_lowercase();
        Self {
            a_subject: format!("{}_subj_sents", a),
            a_object: format!("{}_obj_sents", a),
            b_subject: format!("{}_subj_sents", b),
            b_object: format!("{}_obj_sents", b),
            a_subject_b_object: format!("{}_subj_{}_obj_sents", a, b),
            b_subject_a_object: format!("{}_subj_{}_obj_sents", b, a),
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Mutable accumulator for one corpus pass
#[derive(Debug, Clone)]
pub struct BreakdownBuilder {
    type_a: String,
    type_b: String,
    names: BucketNames,
    scheme: LabelScheme,
    a_subject: BTreeSet<usize>,
    a_object: BTreeSet<usize>,
    b_subject: BTreeSet<usize>,
    b_object: BTreeSet<usize>,
    total_sentences: usize,
}

impl BreakdownBuilder {
    pub fn new(type_a: impl Into<String>, type_b: impl Into<String>, scheme: LabelScheme) -> Self {
        let type_a = type_a.into();
        let type_b = type_b.into();
        let names = BucketNames::new(&type_a, &type_b);
        Self {
            type_a,
            type_b,
            names,
            scheme,
            a_subject: BTreeSet::new(),
            a_object: BTreeSet::new(),
            b_subject: BTreeSet::new(),
            b_object: BTreeSet::new(),
            total_sentences: 0,
        }
    }

    /// Record one sentence under the given corpus index
    pub fn add_sentence(&mut self, index: usize, sentence: &Sentence) {
        self.total_sentences += 1;

        let roles = classify_roles(sentence, &self.scheme);
        for (first, second) in entity_pairs(sentence, &self.type_a, &self.type_b) {
            if roles.is_subject(first) {
                self.a_subject.insert(index);
            } else if roles.is_object(first) {
                self.a_object.insert(index);
            }

            if roles.is_subject(second) {
                self.b_subject.insert(index);
            } else if roles.is_object(second) {
                self.b_object.insert(index);
            }
        }
    }

    /// Derive the cross buckets and freeze the result
    pub fn finish(self) -> Breakdown {
        let a_subject_b_object: BTreeSet<usize> =
            self.a_subject.intersection(&self.b_object).copied().collect();
        let b_subject_a_object: BTreeSet<usize> =
            self.b_subject.intersection(&self.a_object).copied().collect();

        let names = self.names;
        let mut buckets = BTreeMap::new();
        buckets.insert(names.a_subject.clone(), self.a_subject);
        buckets.insert(names.a_object.clone(), self.a_object);
        buckets.insert(names.b_subject.clone(), self.b_subject);
        buckets.insert(names.b_object.clone(), self.b_object);
        buckets.insert(names.a_subject_b_object.clone(), a_subject_b_object);
        buckets.insert(names.b_subject_a_object.clone(), b_subject_a_object);

        tracing::debug!(
            type_a = %self.type_a,
            type_b = %self.type_b,
            sentences = self.total_sentences,
            "breakdown finished"
        );

        Breakdown {
            names,
            buckets,
            total_sentences: self.total_sentences,
        }
    }
}

// ============================================================================
// Result
// ============================================================================

/// Bucket value: raw count or proportion of the corpus
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BucketValue {
    Count(usize),
    Proportion(f64),
}

/// Read-only sentence buckets of one corpus pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakdown {
    names: BucketNames,
    buckets: BTreeMap<String, BTreeSet<usize>>,
    total_sentences: usize,
}

impl Breakdown {
    pub fn names(&self) -> &BucketNames {
        &self.names
    }

    pub fn buckets(&self) -> &BTreeMap<String, BTreeSet<usize>> {
        &self.buckets
    }

    pub fn bucket(&self, name: &str) -> Option<&BTreeSet<usize>> {
        self.buckets.get(name)
    }

    pub fn total_sentences(&self) -> usize {
        self.total_sentences
    }

    /// Cardinality of each bucket
    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.buckets
            .iter()
            .map(|(name, set)| (name.clone(), set.len()))
            .collect()
    }

    /// Cardinality of each bucket divided by the corpus size
    pub fn percentages(&self) -> Result<BTreeMap<String, f64>> {
        if self.total_sentences == 0 {
            return Err(PenemuuError::DivisionByZero(
                "breakdown over an empty corpus has no percentages".to_string(),
            ));
        }

        let total = self.total_sentences as f64;
        Ok(self
            .buckets
            .iter()
            .map(|(name, set)| (name.clone(), set.len() as f64 / total))
            .collect())
    }

    /// Counts, or proportions in [0, 1] when `as_percentage` is set
    pub fn counts_or_percentages(&self, as_percentage: bool) -> Result<BTreeMap<String, BucketValue>> {
        if as_percentage {
            Ok(self
                .percentages()?
                .into_iter()
                .map(|(name, p)| (name, BucketValue::Proportion(p)))
                .collect())
        } else {
            Ok(self
                .counts()
                .into_iter()
                .map(|(name, c)| (name, BucketValue::Count(c)))
                .collect())
        }
    }
}

/// Bucket a whole sentence collection; indices are positions in `sentences`
pub fn breakdown(
    sentences: &[Sentence],
    type_a: &str,
    type_b: &str,
    scheme: &LabelScheme,
) -> Breakdown {
    let mut builder = BreakdownBuilder::new(type_a, type_b, scheme.clone());
    for (index, sentence) in sentences.iter().enumerate() {
        builder.add_sentence(index, sentence);
    }
    builder.finish()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use penemuu_core::Token;

    /// "<a> grows in <b>" with the given dependency labels
    fn pair_sentence(a_dep: &str, b_dep: &str) -> Sentence {
        Sentence::from_tokens(vec![
            Token::new("x", "PROPN", a_dep, 1).with_entity("BACTERIA"),
            Token::root("grows", "VERB"),
            Token::new("in", "ADP", "prep", 1),
            Token::new("y", "PROPN", b_dep, 2).with_entity("HABITAT"),
        ])
        .unwrap()
    }

    fn no_entities() -> Sentence {
        Sentence::from_tokens(vec![Token::root("results", "NOUN")]).unwrap()
    }

    #[test]
    fn test_bucket_names() {
        let names = BucketNames::new("BACTERIA", "HABITAT");
        assert_eq!(names.a_subject, "bacteria_subj_sents");
        assert_eq!(names.b_object, "habitat_obj_sents");
        assert_eq!(names.a_subject_b_object, "bacteria_subj_habitat_obj_sents");
        assert_eq!(names.b_subject_a_object, "habitat_subj_bacteria_obj_sents");
    }

    #[test]
    fn test_breakdown_buckets() {
        let sentences = vec![
            pair_sentence("nsubj", "pobj"),
            pair_sentence("dobj", "nsubj"),
            pair_sentence("appos", "pobj"),
            no_entities(),
        ];
        let result = breakdown(&sentences, "BACTERIA", "HABITAT", &LabelScheme::default());

        assert_eq!(result.total_sentences(), 4);
        let get = |name: &str| result.bucket(name).unwrap().iter().copied().collect::<Vec<_>>();
        assert_eq!(get("bacteria_subj_sents"), vec![0]);
        assert_eq!(get("bacteria_obj_sents"), vec![1]);
        assert_eq!(get("habitat_subj_sents"), vec![1]);
        assert_eq!(get("habitat_obj_sents"), vec![0, 2]);
        assert_eq!(get("bacteria_subj_habitat_obj_sents"), vec![0]);
        assert_eq!(get("habitat_subj_bacteria_obj_sents"), vec![1]);
    }

    #[test]
    fn test_counts_and_percentages() {
        let sentences = vec![pair_sentence("nsubj", "pobj"), no_entities()];
        let result = breakdown(&sentences, "BACTERIA", "HABITAT", &LabelScheme::default());

        let counts = result.counts_or_percentages(false).unwrap();
        assert_eq!(counts["bacteria_subj_sents"], BucketValue::Count(1));
        assert_eq!(counts["habitat_subj_sents"], BucketValue::Count(0));

        let percentages = result.counts_or_percentages(true).unwrap();
        assert_eq!(percentages["bacteria_subj_sents"], BucketValue::Proportion(0.5));
        assert_eq!(percentages.len(), 6);
    }

    #[test]
    fn test_empty_corpus_percentages_fail() {
        let result = breakdown(&[], "BACTERIA", "HABITAT", &LabelScheme::default());
        assert_eq!(result.total_sentences(), 0);
        assert!(result.counts_or_percentages(false).is_ok());
        assert!(matches!(
            result.counts_or_percentages(true),
            Err(PenemuuError::DivisionByZero(_))
        ));
    }

    #[test]
    fn test_builder_uses_caller_indices() {
        let mut builder = BreakdownBuilder::new("BACTERIA", "HABITAT", LabelScheme::default());
        builder.add_sentence(42, &pair_sentence("nsubj", "dobj"));
        let result = builder.finish();
        assert!(result.bucket("bacteria_subj_habitat_obj_sents").unwrap().contains(&42));
        assert_eq!(result.total_sentences(), 1);
    }
}
