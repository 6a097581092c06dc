/// Outcome of one traversal strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Traversal<N> {
    Found(Vec<N>),
    /// The strategy does not apply to this host (missing API, old version).
    Unsupported(String),
}

/// One way of listing every node in a scene graph `G`.
///
/// Hosts differ in which listing calls they offer. Adapters declare their
/// options as strategies, most preferred first, and
/// [`traverse_with`] picks the first that applies.
pub trait TraversalStrategy<G, N> {
    fn name(&self) -> &'static str;

    fn traverse(&self, graph: &G) -> Traversal<N>;
}

/// Run `strategies` in order and return the first result.
///
/// If none applies the scene is treated as empty.
pub fn traverse_with<G, N>(graph: &G, strategies: &[&dyn TraversalStrategy<G, N>]) -> Vec<N> {
    for strategy in strategies {
        match strategy.traverse(graph) {
            Traversal::Found(nodes) => {
                tracing::trace!("Traversal '{}' found {} nodes", strategy.name(), nodes.len());
                return nodes;
            }
            Traversal::Unsupported(reason) => {
                tracing::debug!("Traversal '{}' unsupported: {}", strategy.name(), reason);
            }
        }
    }

    tracing::debug!("No traversal strategy applied; treating scene as empty");
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Option<Vec<u32>>);

    impl TraversalStrategy<(), u32> for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn traverse(&self, _graph: &()) -> Traversal<u32> {
            match &self.0 {
                Some(nodes) => Traversal::Found(nodes.clone()),
                None => Traversal::Unsupported("disabled".to_string()),
            }
        }
    }

    #[test]
    fn test_first_supported_wins() {
        let unsupported = Fixed(None);
        let first = Fixed(Some(vec![1, 2]));
        let second = Fixed(Some(vec![3]));

        let strategies: [&dyn TraversalStrategy<(), u32>; 3] = [&unsupported, &first, &second];
        let nodes = traverse_with(&(), &strategies);
        assert_eq!(nodes, vec![1, 2]);
    }

    #[test]
    fn test_all_unsupported_is_empty() {
        let a = Fixed(None);
        let b = Fixed(None);

        let strategies: [&dyn TraversalStrategy<(), u32>; 2] = [&a, &b];
        assert!(traverse_with(&(), &strategies).is_empty());
    }

    #[test]
    fn test_empty_found_is_still_an_answer() {
        let empty = Fixed(Some(vec![]));
        let fallback = Fixed(Some(vec![9]));

        let strategies: [&dyn TraversalStrategy<(), u32>; 2] = [&empty, &fallback];
        assert!(traverse_with(&(), &strategies).is_empty());
    }
}
