//! Role classification
//!
//! Labels tokens as grammatical subject, object or neither from their
//! dependency label. Subject and object label sets are disjoint
//! (`LabelScheme::validate`), so no token is both.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use penemuu_core::{DependencyTree, LabelScheme, TokenRef};

/// Grammatical role of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Subject,
    Object,
    Neither,
}

/// Role of a single token; subject labels are checked first
pub fn role_of<T: DependencyTree + ?Sized>(tree: &T, token: TokenRef, scheme: &LabelScheme) -> Role {
    let label = tree.dependency_label(token);
    if scheme.is_subject(label) {
        Role::Subject
    } else if scheme.is_object(label) {
        Role::Object
    } else {
        Role::Neither
    }
}

/// Subjects and objects of one sentence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleAssignment {
    pub subjects: BTreeSet<TokenRef>,
    pub objects: BTreeSet<TokenRef>,
}

impl RoleAssignment {
    pub fn is_subject(&self, token: TokenRef) -> bool {
        self.subjects.contains(&token)
    }

    pub fn is_object(&self, token: TokenRef) -> bool {
        self.objects.contains(&token)
    }

    pub fn role(&self, token: TokenRef) -> Role {
        if self.is_subject(token) {
            Role::Subject
        } else if self.is_object(token) {
            Role::Object
        } else {
            Role::Neither
        }
    }
}

/// Classify every token of a sentence
pub fn classify_roles<T: DependencyTree + ?Sized>(tree: &T, scheme: &LabelScheme) -> RoleAssignment {
    let sentence = tree.sentence_id();
    let mut roles = RoleAssignment::default();

    for i in 0..tree.len() {
        let token = TokenRef::new(sentence, i);
        match role_of(tree, token, scheme) {
            Role::Subject => {
                roles.subjects.insert(token);
            }
            Role::Object => {
                roles.objects.insert(token);
            }
            Role::Neither => {}
        }
    }

    roles
}
