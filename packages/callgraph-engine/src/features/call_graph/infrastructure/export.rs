//! petgraph export

use crate::features::call_graph::domain::{CallGraph, NodeId};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

/// Copy the graph into a petgraph `DiGraph`; node weights are `NodeId`s and
/// petgraph indices coincide with them.
pub fn to_petgraph(graph: &CallGraph) -> DiGraph<NodeId, ()> {
    let mut out = DiGraph::with_capacity(graph.node_count(), graph.edge_count());
    for node in graph.nodes() {
        out.add_node(node.id);
    }
    for (caller, callee) in graph.edges() {
        out.add_edge(NodeIndex::new(caller.index()), NodeIndex::new(callee.index()), ());
    }
    out
}

/// Strongly connected components that contain a cycle (mutual or self recursion)
pub fn recursive_components(graph: &CallGraph) -> Vec<Vec<NodeId>> {
    let pg = to_petgraph(graph);
    let mut components: Vec<Vec<NodeId>> = tarjan_scc(&pg)
        .into_iter()
        .filter(|scc| scc.len() > 1 || scc.iter().any(|&i| pg.contains_edge(i, i)))
        .map(|scc| {
            let mut ids: Vec<NodeId> = scc.into_iter().map(|i| pg[i]).collect();
            ids.sort();
            ids
        })
        .collect();
    components.sort();
    components
}
