//! Property tests over randomly generated dependency trees

use penemuu_core::{DependencyTree, LabelScheme, Sentence, Token, TokenRef};
use penemuu_extractor::{
    ancestors, entity_pairs, lowest_common_ancestor, trace_to_ancestor, trace_to_root,
    DependencyRelationExtractor, LcaMatrix, Polarity, RelationExtractor, Sign,
};
use proptest::prelude::*;

const DEPS: &[&str] = &["nsubj", "dobj", "pobj", "prep", "amod", "neg", "NEG", "conj"];
const ENTITIES: &[Option<&str>] = &[None, None, Some("BACTERIA"), Some("HABITAT")];

/// Build a sentence where token `i` (before reversal) hangs below an earlier
/// token, so every parent choice yields a tree rooted at token 0.
fn build(parents: Vec<usize>, deps: Vec<&str>, entities: Vec<Option<&str>>, reversed: bool) -> Sentence {
    let n = deps.len();
    let position = |i: usize| if reversed { n - 1 - i } else { i };

    let mut tokens: Vec<Option<Token>> = vec![None; n];
    for i in 0..n {
        let text = format!("w{}", i);
        let token = if i == 0 {
            Token::root(text, "X")
        } else {
            Token::new(text, "X", deps[i], position(parents[i - 1] % i))
        };
        let token = match entities[i] {
            Some(label) => token.with_entity(label),
            None => token,
        };
        tokens[position(i)] = Some(token);
    }

    Sentence::from_tokens(tokens.into_iter().flatten().collect()).unwrap()
}

fn arb_sentence() -> impl Strategy<Value = Sentence> {
    (1usize..14)
        .prop_flat_map(|n| {
            (
                prop::collection::vec(any::<usize>(), n - 1),
                prop::collection::vec(prop::sample::select(DEPS.to_vec()), n),
                prop::collection::vec(prop::sample::select(ENTITIES.to_vec()), n),
                any::<bool>(),
            )
        })
        .prop_map(|(parents, deps, entities, reversed)| build(parents, deps, entities, reversed))
}

fn all_tokens(sent: &Sentence) -> Vec<TokenRef> {
    sent.token_refs().collect()
}

proptest! {
    #[test]
    fn test_token_is_its_own_ancestor(sent in arb_sentence()) {
        for t in all_tokens(&sent) {
            prop_assert_eq!(lowest_common_ancestor(&sent, t, t).unwrap(), t);
        }
    }

    #[test]
    fn test_lca_is_shared_ancestor(sent in arb_sentence()) {
        for a in all_tokens(&sent) {
            for b in all_tokens(&sent) {
                let lca = lowest_common_ancestor(&sent, a, b).unwrap();
                prop_assert!(ancestors(&sent, a).contains(&lca));
                prop_assert!(ancestors(&sent, b).contains(&lca));
                prop_assert_eq!(lowest_common_ancestor(&sent, b, a).unwrap(), lca);
            }
        }
    }

    #[test]
    fn test_matrix_agrees_with_walk(sent in arb_sentence()) {
        let matrix = LcaMatrix::build(&sent);
        prop_assert_eq!(matrix.len(), sent.len());
        for a in all_tokens(&sent) {
            for b in all_tokens(&sent) {
                prop_assert_eq!(matrix.get(a, b).unwrap(), lowest_common_ancestor(&sent, a, b).unwrap());
            }
        }
    }

    #[test]
    fn test_trace_to_root_always_reaches(sent in arb_sentence()) {
        let scheme = LabelScheme::default();
        for t in all_tokens(&sent) {
            let trace = trace_to_root(&sent, t, &scheme);
            prop_assert!(trace.target_reached());
            prop_assert_eq!(trace.path().len(), sent.depth(t));
        }
    }

    #[test]
    fn test_sign_follows_negation_parity(sent in arb_sentence()) {
        let scheme = LabelScheme::default();
        for t in all_tokens(&sent) {
            let trace = trace_to_ancestor(&sent, t, sent.root(), &scheme);
            let recount: usize = trace
                .path()
                .iter()
                .map(|&p| {
                    sent.children(p)
                        .iter()
                        .filter(|&&c| sent.dependency_label(c).eq_ignore_ascii_case("neg"))
                        .count()
                })
                .sum();
            prop_assert_eq!(trace.negation_count(), recount);
            prop_assert_eq!(trace.sign() == Sign::Negative, recount % 2 == 1);
        }
    }

    #[test]
    fn test_pair_count_is_product(sent in arb_sentence()) {
        let pairs = entity_pairs(&sent, "BACTERIA", "HABITAT");
        prop_assert_eq!(
            pairs.len(),
            sent.mentions("BACTERIA").len() * sent.mentions("HABITAT").len()
        );
    }

    #[test]
    fn test_extraction_is_idempotent(sent in arb_sentence()) {
        let re = DependencyRelationExtractor::default();
        let first = re.extract(&sent, "BACTERIA", "HABITAT").unwrap();
        let second = re.extract(&sent, "BACTERIA", "HABITAT").unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_polarity_rules(sent in arb_sentence()) {
        let re = DependencyRelationExtractor::default();
        for record in re.extract(&sent, "BACTERIA", "HABITAT").unwrap() {
            match record.polarity {
                Polarity::NoRelation => {
                    prop_assert!(!record.entity1_path.is_valid() || !record.entity2_path.is_valid());
                    prop_assert!(record.lca_path.is_empty());
                }
                Polarity::Positive | Polarity::Negative => {
                    prop_assert!(record.entity1_path.is_valid() && record.entity2_path.is_valid());
                }
            }
            // An LCA at the root has an empty upward path and so cannot flip
            if record.lca == sent.root() {
                prop_assert_ne!(record.polarity, Polarity::Negative);
            }
        }
    }
}
