//! Relation Extraction (RE) module
//!
//! Decides the polarity of the relation between two entity tokens from the
//! dependency tree alone:
//!
//! 1. locate their lowest common ancestor (LCA)
//! 2. trace each entity up to the LCA; an odd number of negations on either
//!    path vetoes the relation outright
//! 3. otherwise trace the LCA up to the root; an odd number of negations
//!    there flips the relation to negative
//!
//! The veto in step 2 and the flip in step 3 are asymmetric. Whether that
//! asymmetry is linguistically intended is unresolved; it is reproduced
//! as-is and callers should not rely on it being permanent.
//!
//! The LCA's own negation children count only when the LCA is below the
//! root, since a trace never scans its target.

use serde::{Deserialize, Serialize};

use penemuu_core::{
    DependencyTree, LabelScheme, PenemuuError, Result, Sentence, SentenceId, TokenRef,
};

use crate::lca::{lowest_common_ancestor, LcaMatrix};
use crate::pairs::entity_pairs;
use crate::path::{trace_to_ancestor, trace_to_root, PathResult, Sign};
use crate::RelationExtractor;

// ============================================================================
// Relation record
// ============================================================================

/// Aggregate polarity of a candidate relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Polarity {
    Positive,
    Negative,
    NoRelation,
}

impl Polarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::NoRelation => "no-relation",
        }
    }
}

impl From<Sign> for Polarity {
    fn from(sign: Sign) -> Self {
        match sign {
            Sign::Positive => Self::Positive,
            Sign::Negative => Self::Negative,
        }
    }
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An entity's path to the LCA
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityPath {
    /// Unnegated path, entity first, LCA excluded
    Valid(Vec<TokenRef>),
    /// Odd negation count; the path is void
    Negated,
    /// The root was reached without meeting the LCA
    Blocked,
}

impl EntityPath {
    fn from_trace(trace: PathResult) -> Self {
        if !trace.target_reached() {
            Self::Blocked
        } else if trace.sign() == Sign::Negative {
            Self::Negated
        } else {
            Self::Valid(trace.into_path())
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn tokens(&self) -> Option<&[TokenRef]> {
        match self {
            Self::Valid(path) => Some(path),
            Self::Negated | Self::Blocked => None,
        }
    }
}

/// Result of one (sentence, entity pair) query. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationRecord {
    pub entity1: TokenRef,
    pub entity2: TokenRef,
    pub lca: TokenRef,
    pub entity1_path: EntityPath,
    pub entity2_path: EntityPath,
    /// LCA up to the root, root excluded; empty when an entity path is void
    pub lca_path: Vec<TokenRef>,
    pub polarity: Polarity,
}

impl RelationRecord {
    pub fn sentence(&self) -> SentenceId {
        self.entity1.sentence()
    }

    pub fn is_positive(&self) -> bool {
        self.polarity == Polarity::Positive
    }

    /// Flatten into token indices for serialization
    pub fn export<T: DependencyTree + ?Sized>(&self, tree: &T) -> RelationExport {
        let indices = |path: &[TokenRef]| path.iter().map(|t| t.index()).collect::<Vec<_>>();
        let path_export = |path: &EntityPath| match path {
            EntityPath::Valid(tokens) => PathExport::Valid(indices(tokens)),
            EntityPath::Negated => PathExport::Negated,
            EntityPath::Blocked => PathExport::Blocked,
        };

        RelationExport {
            sentence_id: self.sentence(),
            entity1_id: self.entity1.index(),
            entity1_text: tree.text(self.entity1).to_string(),
            entity2_id: self.entity2.index(),
            entity2_text: tree.text(self.entity2).to_string(),
            lca_token_index: self.lca.index(),
            polarity: self.polarity,
            path_ent1: path_export(&self.entity1_path),
            path_ent2: path_export(&self.entity2_path),
            path_lca_to_root: indices(&self.lca_path),
        }
    }
}

/// Serialized entity path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "tokens", rename_all = "snake_case")]
pub enum PathExport {
    Valid(Vec<usize>),
    Negated,
    Blocked,
}

/// Flat, index-based view of a `RelationRecord`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationExport {
    pub sentence_id: SentenceId,
    pub entity1_id: usize,
    pub entity1_text: String,
    pub entity2_id: usize,
    pub entity2_text: String,
    pub lca_token_index: usize,
    pub polarity: Polarity,
    pub path_ent1: PathExport,
    pub path_ent2: PathExport,
    pub path_lca_to_root: Vec<usize>,
}

// ============================================================================
// Dependency-based RE
// ============================================================================

/// Relation extractor driven by dependency paths and negation parity
#[derive(Debug, Clone, Default)]
pub struct DependencyRelationExtractor {
    scheme: LabelScheme,
}

impl DependencyRelationExtractor {
    pub fn new(scheme: LabelScheme) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> &LabelScheme {
        &self.scheme
    }

    /// Decide the relation between two tokens of one tree
    pub fn extract_relation<T: DependencyTree + ?Sized>(
        &self,
        tree: &T,
        entity1: TokenRef,
        entity2: TokenRef,
    ) -> Result<RelationRecord> {
        let lca = lowest_common_ancestor(tree, entity1, entity2)?;
        Ok(self.assemble(tree, entity1, entity2, lca))
    }

    /// Same as `extract_relation`, reading the LCA from a prebuilt matrix.
    ///
    /// The matrix must have been built for `tree`; otherwise the pair fails
    /// with `NoCommonAncestor`.
    pub fn extract_with_matrix<T: DependencyTree + ?Sized>(
        &self,
        tree: &T,
        matrix: &LcaMatrix,
        entity1: TokenRef,
        entity2: TokenRef,
    ) -> Result<RelationRecord> {
        if matrix.sentence() != tree.sentence_id()
            || !tree.contains(entity1)
            || !tree.contains(entity2)
        {
            return Err(PenemuuError::NoCommonAncestor {
                first: entity1,
                second: entity2,
            });
        }
        let lca = matrix.get(entity1, entity2)?;
        Ok(self.assemble(tree, entity1, entity2, lca))
    }

    fn assemble<T: DependencyTree + ?Sized>(
        &self,
        tree: &T,
        entity1: TokenRef,
        entity2: TokenRef,
        lca: TokenRef,
    ) -> RelationRecord {
        let entity1_path = EntityPath::from_trace(trace_to_ancestor(tree, entity1, lca, &self.scheme));
        let entity2_path = EntityPath::from_trace(trace_to_ancestor(tree, entity2, lca, &self.scheme));

        let (lca_path, polarity) = if entity1_path.is_valid() && entity2_path.is_valid() {
            let lca_trace = trace_to_root(tree, lca, &self.scheme);
            // Both entity paths are positive here, so the product is the LCA sign
            let polarity = Polarity::from(Sign::Positive * Sign::Positive * lca_trace.sign());
            (lca_trace.into_path(), polarity)
        } else {
            (Vec::new(), Polarity::NoRelation)
        };

        tracing::debug!(
            entity1 = tree.text(entity1),
            entity2 = tree.text(entity2),
            lca = tree.text(lca),
            %polarity,
            "relation decided"
        );

        RelationRecord {
            entity1,
            entity2,
            lca,
            entity1_path,
            entity2_path,
            lca_path,
            polarity,
        }
    }
}

impl RelationExtractor for DependencyRelationExtractor {
    fn extract(
        &self,
        sentence: &Sentence,
        label_a: &str,
        label_b: &str,
    ) -> Result<Vec<RelationRecord>> {
        let pairs = entity_pairs(sentence, label_a, label_b);
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        let matrix = LcaMatrix::build(sentence);
        pairs
            .into_iter()
            .map(|(first, second)| self.extract_with_matrix(sentence, &matrix, first, second))
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
