//! Ancestor Locator
//!
//! Lowest common ancestor of two tokens in one dependency tree. A token is
//! its own ancestor. `lowest_common_ancestor` intersects the two head
//! chains on demand; `LcaMatrix` precomputes every pair for callers that
//! query the same sentence many times.

use std::collections::HashSet;

use penemuu_core::{DependencyTree, PenemuuError, Result, SentenceId, TokenRef};

/// Head chain from `token` up to and including the root
pub fn ancestors<T: DependencyTree + ?Sized>(tree: &T, token: TokenRef) -> Vec<TokenRef> {
    let root = tree.root();
    let mut chain = vec![token];
    let mut current = token;
    while current != root {
        current = tree.head(current);
        chain.push(current);
    }
    chain
}

fn check_membership<T: DependencyTree + ?Sized>(
    tree: &T,
    first: TokenRef,
    second: TokenRef,
) -> Result<()> {
    if tree.contains(first) && tree.contains(second) {
        Ok(())
    } else {
        Err(PenemuuError::NoCommonAncestor { first, second })
    }
}

/// Deepest token that is an ancestor of both `first` and `second`
pub fn lowest_common_ancestor<T: DependencyTree + ?Sized>(
    tree: &T,
    first: TokenRef,
    second: TokenRef,
) -> Result<TokenRef> {
    check_membership(tree, first, second)?;

    let first_chain: HashSet<TokenRef> = ancestors(tree, first).into_iter().collect();
    let mut current = second;
    loop {
        if first_chain.contains(&current) {
            return Ok(current);
        }
        // Both chains end at the root, so this is reached at the latest there
        current = tree.head(current);
    }
}

/// Pairwise lowest-common-ancestor table for one sentence
#[derive(Debug, Clone)]
pub struct LcaMatrix {
    sentence: SentenceId,
    size: usize,
    cells: Vec<usize>,
}

impl LcaMatrix {
    /// Build the table by comparing root-anchored head chains
    pub fn build<T: DependencyTree + ?Sized>(tree: &T) -> Self {
        let n = tree.len();
        let sentence = tree.sentence_id();

        let chains: Vec<Vec<TokenRef>> = (0..n)
            .map(|i| ancestors(tree, TokenRef::new(sentence, i)))
            .collect();

        let mut cells = vec![0; n * n];
        for i in 0..n {
            cells[i * n + i] = i;
            for j in (i + 1)..n {
                let lca = common_suffix_head(&chains[i], &chains[j]);
                cells[i * n + j] = lca;
                cells[j * n + i] = lca;
            }
        }

        Self {
            sentence,
            size: n,
            cells,
        }
    }

    /// Sentence the table was built for
    pub fn sentence(&self) -> SentenceId {
        self.sentence
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Look up the ancestor of a pair
    pub fn get(&self, first: TokenRef, second: TokenRef) -> Result<TokenRef> {
        let in_table = |t: TokenRef| t.sentence() == self.sentence && t.index() < self.size;
        if !in_table(first) || !in_table(second) {
            return Err(PenemuuError::NoCommonAncestor { first, second });
        }
        let lca = self.cells[first.index() * self.size + second.index()];
        Ok(TokenRef::new(self.sentence, lca))
    }
}

/// Both chains end at the root; the last shared element walking down from
/// the root is the lowest common ancestor
fn common_suffix_head(a: &[TokenRef], b: &[TokenRef]) -> usize {
    let mut lca = a[a.len() - 1];
    for (x, y) in a.iter().rev().zip(b.iter().rev()) {
        if x != y {
            break;
        }
        lca = *x;
    }
    lca.index()
}

// ============================================================================
// Tests
// ============================================================================
