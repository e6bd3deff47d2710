//! C7: the transitive-upstream resolver.

use std::collections::{HashMap, HashSet};

/// `adj[dst] = {src, ...}` — the set of services whose outbound calls land
/// on `dst`. This is the mesh overview consulted in reverse.
pub type ReverseAdjacency = HashMap<String, HashSet<String>>;

/// Returns every service transitively upstream of `target`: services whose
/// outbound calls reach `target`, directly or through intermediate
/// services.
///
/// The mesh may be cyclic (pairs of services that call each other); the DFS
/// marks a node visited when it is pushed onto the stack, not when it is
/// popped, so a cycle cannot cause the same node to be re-queued and the
/// search always terminates. `target` itself is excluded from the result
/// even if a cycle routes back through it.
#[must_use]
pub fn resolve(reverse: &ReverseAdjacency, target: &str) -> HashSet<String> {
    let mut visited: HashSet<String> = HashSet::new();
    let mut stack: Vec<String> = Vec::new();

    if let Some(direct) = reverse.get(target) {
        for node in direct {
            if visited.insert(node.clone()) {
                stack.push(node.clone());
            }
        }
    }

    while let Some(node) = stack.pop() {
        if let Some(callers) = reverse.get(&node) {
            for caller in callers {
                if caller != target && visited.insert(caller.clone()) {
                    stack.push(caller.clone());
                }
            }
        }
    }

    visited
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges(pairs: &[(&str, &str)]) -> ReverseAdjacency {
        let mut reverse: ReverseAdjacency = HashMap::new();
        for (src, dst) in pairs {
            reverse
                .entry((*dst).to_string())
                .or_default()
                .insert((*src).to_string());
        }
        reverse
    }

    #[test]
    fn finds_transitive_upstreams() {
        // frontend -> checkout -> payment, checkout -> cart
        let reverse = edges(&[
            ("frontend", "checkout"),
            ("checkout", "payment"),
            ("checkout", "cart"),
        ]);

        let upstreams = resolve(&reverse, "payment");
        assert_eq!(
            upstreams,
            ["checkout", "frontend"].into_iter().map(String::from).collect()
        );
    }

    #[test]
    fn cycle_does_not_cause_nontermination() {
        // frontend -> checkout -> payment, checkout -> cart -> frontend (cycle)
        let reverse = edges(&[
            ("frontend", "checkout"),
            ("checkout", "payment"),
            ("checkout", "cart"),
            ("cart", "frontend"),
        ]);

        let upstreams = resolve(&reverse, "payment");
        assert_eq!(
            upstreams,
            ["checkout", "cart", "frontend"]
                .into_iter()
                .map(String::from)
                .collect()
        );
    }

    #[test]
    fn target_excluded_from_its_own_upstream_set() {
        let reverse = edges(&[("a", "b"), ("b", "a")]);
        let upstreams = resolve(&reverse, "a");
        assert!(!upstreams.contains("a"));
        assert!(upstreams.contains("b"));
    }

    #[test]
    fn no_incoming_edges_yields_empty_set() {
        let reverse: ReverseAdjacency = HashMap::new();
        assert!(resolve(&reverse, "lonely").is_empty());
    }

    proptest::proptest! {
        #[test]
        fn resolve_always_terminates_on_arbitrary_small_graphs(
            edges_list in proptest::collection::vec(
                (0usize..6, 0usize..6), 0..20
            )
        ) {
            let names: Vec<String> = (0..6).map(|i| format!("s{i}")).collect();
            let pairs: Vec<(&str, &str)> = edges_list
                .iter()
                .map(|&(a, b)| (names[a].as_str(), names[b].as_str()))
                .collect();
            let reverse = edges(&pairs);

            for target in &names {
                let upstreams = resolve(&reverse, target);
                prop_assert!(!upstreams.contains(target));
            }
        }
    }
}
