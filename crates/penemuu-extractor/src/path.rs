//! Path & Polarity Tracer
//!
//! Walks head links from a start token towards a target ancestor, counting
//! negation-marked children of every visited token. The walk stops at the
//! target or at the sentence root, whichever comes first; the target itself
//! is never scanned. Polarity follows the parity of the negation count.

use std::ops::Mul;

use serde::{Deserialize, Serialize};

use penemuu_core::{DependencyTree, LabelScheme, TokenRef};

/// Polarity multiplier of a traced path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    /// Even counts (including zero) are positive
    pub fn from_negations(count: usize) -> Self {
        if count % 2 == 0 {
            Self::Positive
        } else {
            Self::Negative
        }
    }

    pub fn as_i8(self) -> i8 {
        match self {
            Self::Positive => 1,
            Self::Negative => -1,
        }
    }
}

impl Mul for Sign {
    type Output = Sign;

    fn mul(self, rhs: Sign) -> Sign {
        if self == rhs {
            Sign::Positive
        } else {
            Sign::Negative
        }
    }
}

/// Outcome of a head-chain walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathResult {
    /// The target was reached
    Success {
        path: Vec<TokenRef>,
        negation_count: usize,
    },
    /// The root was reached first and is not the target
    Blocked {
        path: Vec<TokenRef>,
        negation_count: usize,
    },
}

impl PathResult {
    pub fn target_reached(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Visited tokens, start first, target excluded
    pub fn path(&self) -> &[TokenRef] {
        match self {
            Self::Success { path, .. } | Self::Blocked { path, .. } => path,
        }
    }

    pub fn into_path(self) -> Vec<TokenRef> {
        match self {
            Self::Success { path, .. } | Self::Blocked { path, .. } => path,
        }
    }

    pub fn negation_count(&self) -> usize {
        match self {
            Self::Success { negation_count, .. } | Self::Blocked { negation_count, .. } => {
                *negation_count
            }
        }
    }

    pub fn sign(&self) -> Sign {
        Sign::from_negations(self.negation_count())
    }
}

/// Walk from `start` towards `target`.
///
/// The stop check runs before each step's negation scan, so
/// `start == target` yields an empty successful path and
/// `start == root != target` an empty blocked one. A handle from another
/// tree yields an empty blocked path.
pub fn trace_to_ancestor<T: DependencyTree + ?Sized>(
    tree: &T,
    start: TokenRef,
    target: TokenRef,
    scheme: &LabelScheme,
) -> PathResult {
    if !tree.contains(start) || !tree.contains(target) {
        tracing::debug!(%start, %target, "trace handles outside tree");
        return PathResult::Blocked {
            path: Vec::new(),
            negation_count: 0,
        };
    }

    let root = tree.root();
    let mut path = Vec::new();
    let mut negation_count = 0;
    let mut current = start;

    while current != target && current != root {
        let negations = tree
            .children(current)
            .iter()
            .filter(|&&child| tree.is_negation_marker(child, scheme))
            .count();
        negation_count += negations;

        tracing::trace!(
            token = tree.token_index(current),
            text = tree.text(current),
            dep = tree.dependency_label(current),
            pos = tree.part_of_speech(current),
            negations,
            "visit"
        );

        path.push(current);
        current = tree.head(current);
    }

    let reached = current == target;
    tracing::debug!(
        start = tree.token_index(start),
        target = tree.token_index(target),
        steps = path.len(),
        negation_count,
        reached,
        "traced path"
    );

    if reached {
        PathResult::Success {
            path,
            negation_count,
        }
    } else {
        PathResult::Blocked {
            path,
            negation_count,
        }
    }
}

/// Walk from `start` to the sentence root
pub fn trace_to_root<T: DependencyTree + ?Sized>(
    tree: &T,
    start: TokenRef,
    scheme: &LabelScheme,
) -> PathResult {
    trace_to_ancestor(tree, start, tree.root(), scheme)
}

// ============================================================================
// Tests
// ============================================================================
