//! A small state-graph engine.
//!
//! Nodes receive a snapshot of the state and return a partial update which
//! the interpreter merges back. After each node, a fixed edge or a
//! conditional router picks the next node; routers return labels that are
//! resolved through an explicit path map, so the full topology is known at
//! compile time and can be rendered with
//! [`CompiledGraph::draw_mermaid`].

mod builder;
mod compiled;
mod edge;
mod node;
mod state;

pub use builder::StateGraph;
pub use compiled::{CompiledGraph, GraphEvent, GraphStream};
pub use edge::{ConditionalEdge, Edge, RouterFn};
pub use node::{FnNode, Node};
pub use state::State;

/// Sentinel name for the graph start point, used in rendered diagrams.
pub const START: &str = "__start__";
/// Sentinel name for the graph end point.
pub const END: &str = "__end__";

/// Default maximum number of node executions per run.
pub const DEFAULT_RECURSION_LIMIT: usize = 25;
