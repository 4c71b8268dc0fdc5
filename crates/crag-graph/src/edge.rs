use std::collections::BTreeMap;
use std::sync::Arc;

/// A fixed edge from source node to target node.
#[derive(Debug, Clone)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

/// Inspects the state and returns a routing label.
pub type RouterFn<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

/// A conditional edge whose router label is mapped to a target node.
pub struct ConditionalEdge<S> {
    pub source: String,
    pub router: RouterFn<S>,
    pub path_map: BTreeMap<String, String>,
}
