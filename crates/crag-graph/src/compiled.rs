use std::collections::HashMap;
use std::fmt::Write;
use std::pin::Pin;

use crag_core::CragError;
use futures::{Stream, StreamExt};

use crate::edge::{ConditionalEdge, Edge};
use crate::node::Node;
use crate::state::State;
use crate::{END, START};

/// Emitted after each node finishes, carrying the merged state.
#[derive(Debug, Clone)]
pub struct GraphEvent<S> {
    pub node: String,
    pub state: S,
}

pub type GraphStream<'a, S> = Pin<Box<dyn Stream<Item = Result<GraphEvent<S>, CragError>> + Send + 'a>>;

/// The compiled, executable graph.
pub struct CompiledGraph<S: State> {
    pub(crate) nodes: HashMap<String, Box<dyn Node<S>>>,
    pub(crate) order: Vec<String>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) conditional_edges: Vec<ConditionalEdge<S>>,
    pub(crate) entry_point: String,
    pub(crate) recursion_limit: usize,
}

impl<S: State> std::fmt::Debug for CompiledGraph<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledGraph")
            .field("entry_point", &self.entry_point)
            .field("nodes", &self.order)
            .field("edge_count", &self.edges.len())
            .field("conditional_edge_count", &self.conditional_edges.len())
            .field("recursion_limit", &self.recursion_limit)
            .finish()
    }
}

impl<S: State> CompiledGraph<S> {
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }

    /// Run the graph to completion and return the final state.
    pub async fn invoke(&self, state: S) -> Result<S, CragError> {
        let mut last = state.clone();
        let mut events = self.stream(state);
        while let Some(event) = events.next().await {
            last = event?.state;
        }
        Ok(last)
    }

    /// Run the graph, yielding an event after every node.
    ///
    /// The stream ends after the node whose successor is [`END`], or with an
    /// error if a node fails, a router label is not in its path map, or the
    /// recursion limit is reached.
    pub fn stream(&self, state: S) -> GraphStream<'_, S> {
        Box::pin(async_stream::stream! {
            let mut state = state;
            let mut current = self.entry_point.clone();
            let mut steps = 0usize;

            while current != END {
                if steps == self.recursion_limit {
                    yield Err(CragError::Graph(format!(
                        "recursion limit of {} reached before END (next node '{current}')",
                        self.recursion_limit
                    )));
                    return;
                }
                steps += 1;

                let Some(node) = self.nodes.get(&current) else {
                    yield Err(CragError::Graph(format!("node '{current}' not found")));
                    return;
                };
                tracing::debug!(node = %current, step = steps, "running node");
                match node.process(state.clone()).await {
                    Ok(update) => state.merge(update),
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }

                let next = self.next_node(&current, &state);
                yield Ok(GraphEvent { node: current.clone(), state: state.clone() });
                match next {
                    Ok(next) => current = next,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
        })
    }

    fn next_node(&self, current: &str, state: &S) -> Result<String, CragError> {
        if let Some(ce) = self.conditional_edges.iter().find(|ce| ce.source == current) {
            let label = (ce.router)(state);
            tracing::debug!(node = current, %label, "routing");
            return ce.path_map.get(&label).cloned().ok_or_else(|| {
                CragError::Graph(format!(
                    "router for '{current}' returned unmapped label '{label}'"
                ))
            });
        }
        Ok(self
            .edges
            .iter()
            .find(|e| e.source == current)
            .map(|e| e.target.clone())
            .unwrap_or_else(|| END.to_string()))
    }

    /// Render the topology as a Mermaid flowchart. Conditional edges are
    /// dotted and labelled with their router label.
    pub fn draw_mermaid(&self) -> String {
        let mut out = String::from("graph TD\n");
        let _ = writeln!(out, "    {START}([start])");
        for name in &self.order {
            let _ = writeln!(out, "    {name}[{name}]");
        }
        let _ = writeln!(out, "    {END}([end])");
        let _ = writeln!(out, "    {START} --> {}", self.entry_point);

        for name in &self.order {
            if let Some(edge) = self.edges.iter().find(|e| &e.source == name) {
                let _ = writeln!(out, "    {name} --> {}", edge.target);
            }
            if let Some(ce) = self.conditional_edges.iter().find(|ce| &ce.source == name) {
                for (label, target) in &ce.path_map {
                    let _ = writeln!(out, "    {name} -. {label} .-> {target}");
                }
            }
        }
        out
    }
}
