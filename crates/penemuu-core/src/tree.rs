//! Dependency Tree Adapter
//!
//! Wraps an externally produced parse (tokens, head links, dependency
//! labels, part-of-speech tags, a single root) behind the `DependencyTree`
//! query interface. A `Sentence` is validated once at construction and is
//! immutable afterwards, so every head chain is guaranteed to end at the
//! root within `len()` steps.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::LabelScheme;
use crate::{PenemuuError, Result};

// ============================================================================
// Identity
// ============================================================================

/// Identity of one parsed sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentenceId(Uuid);

impl SentenceId {
    /// Create a fresh random identity
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SentenceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SentenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to a token: its index within a sentence plus that sentence's identity.
///
/// Two handles are equal only when both the sentence and the index match,
/// so tokens from different sentences never compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenRef {
    sentence: SentenceId,
    index: usize,
}

impl TokenRef {
    pub fn new(sentence: SentenceId, index: usize) -> Self {
        Self { sentence, index }
    }

    pub fn sentence(&self) -> SentenceId {
        self.sentence
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl std::fmt::Display for TokenRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "token {} of sentence {}", self.index, self.sentence)
    }
}

// ============================================================================
// Token
// ============================================================================

/// A token as produced by the external pipeline
///
/// `head` is the index of the head token within the same sentence. The root
/// has no head, or points at itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Surface text (a merged entity span is a single token)
    pub text: String,

    /// Part-of-speech tag
    #[serde(default)]
    pub pos: String,

    /// Dependency relation label towards the head
    pub dep: String,

    /// Head token index
    #[serde(default)]
    pub head: Option<usize>,

    /// Entity label, if this token is (part of) an entity mention
    #[serde(default, alias = "ent_type", skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl Token {
    /// Create a token attached to `head`
    pub fn new(
        text: impl Into<String>,
        pos: impl Into<String>,
        dep: impl Into<String>,
        head: usize,
    ) -> Self {
        Self {
            text: text.into(),
            pos: pos.into(),
            dep: dep.into(),
            head: Some(head),
            entity: None,
        }
    }

    /// Create the root token
    pub fn root(text: impl Into<String>, pos: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pos: pos.into(),
            dep: "ROOT".to_string(),
            head: None,
            entity: None,
        }
    }

    /// Tag this token with an entity label
    pub fn with_entity(mut self, label: impl Into<String>) -> Self {
        self.entity = Some(label.into());
        self
    }

    /// Check the entity label
    pub fn has_entity(&self, label: &str) -> bool {
        self.entity.as_deref() == Some(label)
    }
}

// ============================================================================
// Capability trait
// ============================================================================

/// Read-only query interface over one sentence's dependency tree.
///
/// Every method taking a `TokenRef` expects a handle produced by this tree;
/// use [`DependencyTree::contains`] to check foreign handles first.
pub trait DependencyTree {
    fn sentence_id(&self) -> SentenceId;

    /// Number of tokens
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The single root token
    fn root(&self) -> TokenRef;

    /// Head of a token; the root is its own head
    fn head(&self, token: TokenRef) -> TokenRef;

    /// Children ordered by token index
    fn children(&self, token: TokenRef) -> &[TokenRef];

    fn dependency_label(&self, token: TokenRef) -> &str;

    fn part_of_speech(&self, token: TokenRef) -> &str;

    fn text(&self, token: TokenRef) -> &str;

    fn entity_label(&self, token: TokenRef) -> Option<&str>;

    /// Offset of the token within the sentence
    fn token_index(&self, token: TokenRef) -> usize {
        token.index()
    }

    /// Whether the handle belongs to this tree
    fn contains(&self, token: TokenRef) -> bool {
        token.sentence() == self.sentence_id() && token.index() < self.len()
    }

    /// True iff the token's dependency label is a negation label of `scheme`
    fn is_negation_marker(&self, token: TokenRef, scheme: &LabelScheme) -> bool {
        scheme.is_negation(self.dependency_label(token))
    }
}

// ============================================================================
// Sentence
// ============================================================================

/// A validated dependency tree over one sentence
#[derive(Debug, Clone)]
pub struct Sentence {
    id: SentenceId,
    tokens: Vec<Token>,
    heads: Vec<usize>,
    children: Vec<Vec<TokenRef>>,
    root: usize,
}

impl Sentence {
    /// Build a sentence with a fresh identity
    pub fn from_tokens(tokens: Vec<Token>) -> Result<Self> {
        Self::with_id(SentenceId::new(), tokens)
    }

    /// Build a sentence, validating that the head links form a single tree
    pub fn with_id(id: SentenceId, tokens: Vec<Token>) -> Result<Self> {
        let n = tokens.len();
        if n == 0 {
            return Err(PenemuuError::invalid_parse("sentence has no tokens"));
        }

        let mut heads = Vec::with_capacity(n);
        let mut roots = Vec::new();
        for (i, token) in tokens.iter().enumerate() {
            match token.head {
                None => {
                    roots.push(i);
                    heads.push(i);
                }
                Some(h) if h == i => {
                    roots.push(i);
                    heads.push(i);
                }
                Some(h) if h >= n => {
                    return Err(PenemuuError::invalid_parse(format!(
                        "token {} ('{}') has head {} outside sentence of {} tokens",
                        i, token.text, h, n
                    )));
                }
                Some(h) => heads.push(h),
            }
        }

        let root = match roots.as_slice() {
            [root] => *root,
            [] => return Err(PenemuuError::invalid_parse("sentence has no root")),
            many => {
                return Err(PenemuuError::invalid_parse(format!(
                    "sentence has {} roots: {:?}",
                    many.len(),
                    many
                )))
            }
        };

        // With a single root, a chain that does not reach it within n steps is a cycle
        for start in 0..n {
            let mut current = start;
            let mut steps = 0;
            while current != root {
                if steps > n {
                    return Err(PenemuuError::invalid_parse(format!(
                        "cycle detected in head chain starting at token {}",
                        start
                    )));
                }
                current = heads[current];
                steps += 1;
            }
        }

        let mut children = vec![Vec::new(); n];
        for (i, &h) in heads.iter().enumerate() {
            if i != root {
                children[h].push(TokenRef::new(id, i));
            }
        }

        Ok(Self {
            id,
            tokens,
            heads,
            children,
            root,
        })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Token data behind a handle
    pub fn token(&self, token: TokenRef) -> &Token {
        &self.tokens[token.index()]
    }

    /// Handle for a token index, if in bounds
    pub fn token_ref(&self, index: usize) -> Option<TokenRef> {
        (index < self.tokens.len()).then(|| TokenRef::new(self.id, index))
    }

    /// Handles for every token, in order
    pub fn token_refs(&self) -> impl Iterator<Item = TokenRef> + '_ {
        (0..self.tokens.len()).map(move |i| TokenRef::new(self.id, i))
    }

    /// Tokens carrying any entity label
    pub fn entity_tokens(&self) -> Vec<TokenRef> {
        self.token_refs()
            .filter(|&t| self.tokens[t.index()].entity.is_some())
            .collect()
    }

    /// Tokens carrying the given entity label, in sentence order
    pub fn mentions(&self, label: &str) -> Vec<TokenRef> {
        self.token_refs()
            .filter(|&t| self.tokens[t.index()].has_entity(label))
            .collect()
    }

    /// Whitespace-joined surface text
    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Depth of a token (root is 0)
    pub fn depth(&self, token: TokenRef) -> usize {
        let mut depth = 0;
        let mut current = token.index();
        while current != self.root {
            current = self.heads[current];
            depth += 1;
        }
        depth
    }
}

impl DependencyTree for Sentence {
    fn sentence_id(&self) -> SentenceId {
        self.id
    }

    fn len(&self) -> usize {
        self.tokens.len()
    }

    fn root(&self) -> TokenRef {
        TokenRef::new(self.id, self.root)
    }

    fn head(&self, token: TokenRef) -> TokenRef {
        TokenRef::new(self.id, self.heads[token.index()])
    }

    fn children(&self, token: TokenRef) -> &[TokenRef] {
        &self.children[token.index()]
    }

    fn dependency_label(&self, token: TokenRef) -> &str {
        &self.tokens[token.index()].dep
    }

    fn part_of_speech(&self, token: TokenRef) -> &str {
        &self.tokens[token.index()].pos
    }

    fn text(&self, token: TokenRef) -> &str {
        &self.tokens[token.index()].text
    }

    fn entity_label(&self, token: TokenRef) -> Option<&str> {
        self.tokens[token.index()].entity.as_deref()
    }
}

// ============================================================================
// Tests
// ============================================================================
