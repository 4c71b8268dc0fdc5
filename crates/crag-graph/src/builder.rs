use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crag_core::CragError;

use crate::compiled::CompiledGraph;
use crate::edge::{ConditionalEdge, Edge};
use crate::node::Node;
use crate::state::State;
use crate::{DEFAULT_RECURSION_LIMIT, END};

/// Builder for a [`CompiledGraph`].
///
/// Problems found while building (duplicate node names, dangling edges)
/// are reported by [`compile`](StateGraph::compile).
pub struct StateGraph<S: State> {
    nodes: HashMap<String, Box<dyn Node<S>>>,
    order: Vec<String>,
    duplicates: Vec<String>,
    edges: Vec<Edge>,
    conditional_edges: Vec<ConditionalEdge<S>>,
    entry_point: Option<String>,
    recursion_limit: usize,
}

impl<S: State> StateGraph<S> {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            order: Vec::new(),
            duplicates: Vec::new(),
            edges: Vec::new(),
            conditional_edges: Vec::new(),
            entry_point: None,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    /// Add a named node to the graph.
    pub fn add_node(mut self, name: impl Into<String>, node: impl Node<S> + 'static) -> Self {
        let name = name.into();
        if self.nodes.insert(name.clone(), Box::new(node)).is_some() {
            self.duplicates.push(name);
        } else {
            self.order.push(name);
        }
        self
    }

    /// Add a fixed edge from source to target.
    pub fn add_edge(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.edges.push(Edge {
            source: source.into(),
            target: target.into(),
        });
        self
    }

    /// Add a conditional edge. The router's label is looked up in
    /// `path_map` to find the next node.
    pub fn add_conditional_edges<K, V>(
        mut self,
        source: impl Into<String>,
        router: impl Fn(&S) -> String + Send + Sync + 'static,
        path_map: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.conditional_edges.push(ConditionalEdge {
            source: source.into(),
            router: Arc::new(router),
            path_map: path_map
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect::<BTreeMap<_, _>>(),
        });
        self
    }

    /// Set the entry point node for graph execution.
    pub fn set_entry_point(mut self, name: impl Into<String>) -> Self {
        self.entry_point = Some(name.into());
        self
    }

    /// Maximum number of node executions in one run before the run fails.
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    fn check_target(&self, target: &str, what: &str) -> Result<(), CragError> {
        if target == END || self.nodes.contains_key(target) {
            Ok(())
        } else {
            Err(CragError::Graph(format!("{what} target '{target}' not found")))
        }
    }

    /// Validate the topology and produce an executable graph.
    pub fn compile(self) -> Result<CompiledGraph<S>, CragError> {
        if let Some(name) = self.duplicates.first() {
            return Err(CragError::Graph(format!("node '{name}' added twice")));
        }
        if self.nodes.contains_key(END) {
            return Err(CragError::Graph(format!("'{END}' is reserved")));
        }
        if self.recursion_limit == 0 {
            return Err(CragError::Graph("recursion limit must be positive".to_string()));
        }

        let entry = self
            .entry_point
            .clone()
            .ok_or_else(|| CragError::Graph("no entry point set".to_string()))?;
        if !self.nodes.contains_key(&entry) {
            return Err(CragError::Graph(format!("entry point node '{entry}' not found")));
        }

        let mut sources = HashSet::new();
        for edge in &self.edges {
            if !self.nodes.contains_key(&edge.source) {
                return Err(CragError::Graph(format!("edge source '{}' not found", edge.source)));
            }
            self.check_target(&edge.target, "edge")?;
            if !sources.insert(edge.source.as_str()) {
                return Err(CragError::Graph(format!(
                    "node '{}' has more than one outgoing edge",
                    edge.source
                )));
            }
        }

        for ce in &self.conditional_edges {
            if !self.nodes.contains_key(&ce.source) {
                return Err(CragError::Graph(format!(
                    "conditional edge source '{}' not found",
                    ce.source
                )));
            }
            if ce.path_map.is_empty() {
                return Err(CragError::Graph(format!(
                    "conditional edge from '{}' has an empty path map",
                    ce.source
                )));
            }
            for (label, target) in &ce.path_map {
                self.check_target(target, &format!("path map label '{label}'"))?;
            }
            if !sources.insert(ce.source.as_str()) {
                return Err(CragError::Graph(format!(
                    "node '{}' has more than one outgoing edge",
                    ce.source
                )));
            }
        }

        Ok(CompiledGraph {
            nodes: self.nodes,
            order: self.order,
            edges: self.edges,
            conditional_edges: self.conditional_edges,
            entry_point: entry,
            recursion_limit: self.recursion_limit,
        })
    }
}

impl<S: State> Default for StateGraph<S> {
    fn default() -> Self {
        Self::new()
    }
}
