//! penemuu Extractor - Dependency-path relation extraction
//!
//! Decides whether two entity mentions in a parsed sentence stand in a
//! positive, negative or void relation, from the dependency tree and the
//! negation markers along it. Also provides the corpus-level helpers built
//! on the same primitives: entity-pair enumeration, role classification and
//! the subject/object breakdown.

use penemuu_core::{Result, Sentence};

pub mod breakdown;
pub mod corpus;
pub mod lca;
pub mod pairs;
pub mod path;
pub mod relation;
pub mod roles;

pub use breakdown::{breakdown, Breakdown, BreakdownBuilder, BucketNames, BucketValue};
pub use corpus::{annotate_passages, sentences_with_labels, AnnotatedPassage};
pub use lca::{ancestors, lowest_common_ancestor, LcaMatrix};
pub use pairs::{entity_pairs, MentionSource};
pub use path::{trace_to_ancestor, trace_to_root, PathResult, Sign};
pub use relation::{
    DependencyRelationExtractor, EntityPath, PathExport, Polarity, RelationExport, RelationRecord,
};
pub use roles::{classify_roles, role_of, Role, RoleAssignment};

/// Trait for relation extractors
pub trait RelationExtractor: Send + Sync {
    /// One record per (label_a mention, label_b mention) pair of `sentence`
    fn extract(&self, sentence: &Sentence, label_a: &str, label_b: &str) -> Result<Vec<RelationRecord>>;
}
