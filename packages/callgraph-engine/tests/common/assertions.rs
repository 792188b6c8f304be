//! Call graph assertions
//!
//! Helpers that query a `BuildResult` by method identity and fail with a
//! message listing what was actually there.

use callgraph_engine::features::builder::{BuildResult, WarningKind};
use callgraph_engine::features::call_graph::{CallGraph, CgNode, NodeId};
use callgraph_engine::shared::models::MethodRef;
use std::collections::{BTreeSet, HashSet};

pub fn nodes_of<'g>(graph: &'g CallGraph, method: &MethodRef) -> Vec<&'g CgNode> {
    graph
        .nodes_for_method(method)
        .iter()
        .filter_map(|id| graph.node(*id))
        .collect()
}

/// Methods of the successors of `node`
pub fn successor_methods(graph: &CallGraph, node: NodeId) -> BTreeSet<MethodRef> {
    graph
        .successors(node)
        .filter_map(|id| graph.node(id))
        .map(|n| n.method.clone())
        .collect()
}

/// Methods called from any node of `method`
pub fn callees_of(graph: &CallGraph, method: &MethodRef) -> BTreeSet<MethodRef> {
    graph
        .nodes_for_method(method)
        .iter()
        .flat_map(|id| successor_methods(graph, *id))
        .collect()
}

fn reachable_methods(graph: &CallGraph) -> Vec<String> {
    let mut methods: Vec<String> = graph.methods().map(|m| m.to_string()).collect();
    methods.sort();
    methods
}

pub fn assert_reachable(result: &BuildResult, method: &MethodRef) {
    let graph = &result.call_graph;
    assert!(
        !graph.nodes_for_method(method).is_empty(),
        "Expected {method} to be reachable. Reachable methods: {:?}",
        reachable_methods(graph)
    );
}

pub fn assert_not_reachable(result: &BuildResult, method: &MethodRef) {
    let graph = &result.call_graph;
    let nodes: Vec<String> = nodes_of(graph, method)
        .iter()
        .map(|n| format!("{} [{}]", n.method, n.context))
        .collect();
    assert!(nodes.is_empty(), "Expected {method} to be unreachable, found nodes: {nodes:?}");
}

/// Some node of `caller` has an edge to some node of `callee`
pub fn assert_calls(result: &BuildResult, caller: &MethodRef, callee: &MethodRef) {
    let callees = callees_of(&result.call_graph, caller);
    assert!(
        callees.contains(callee),
        "Expected an edge {caller} -> {callee}. Callees of {caller}: {callees:?}"
    );
}

pub fn assert_not_calls(result: &BuildResult, caller: &MethodRef, callee: &MethodRef) {
    let callees = callees_of(&result.call_graph, caller);
    assert!(
        !callees.contains(callee),
        "Expected no edge {caller} -> {callee}. Callees of {caller}: {callees:?}"
    );
}

pub fn assert_no_warning_mentions(result: &BuildResult, needle: &str) {
    let hits: Vec<String> = result
        .warnings
        .iter()
        .filter(|w| w.mentions(needle))
        .map(|w| w.to_string())
        .collect();
    assert!(hits.is_empty(), "Expected no warning mentioning {needle:?}, got: {hits:?}");
}

pub fn assert_warning(result: &BuildResult, kind: WarningKind, needle: &str) {
    let all: Vec<String> = result.warnings.iter().map(|w| w.to_string()).collect();
    assert!(
        result.warnings.iter().any(|w| w.kind == kind && w.mentions(needle)),
        "Expected a {} warning mentioning {needle:?}, got: {all:?}",
        kind.as_str()
    );
}

/// Graph invariants that must hold for complete and partial builds alike
pub fn assert_consistent(result: &BuildResult) {
    let graph = &result.call_graph;
    if let Err(e) = graph.check_consistency() {
        panic!("Call graph is inconsistent: {e}");
    }

    let mut seen = HashSet::new();
    for node in graph.nodes() {
        assert!(
            seen.insert((node.method.clone(), node.context.clone())),
            "Duplicate node for {} in {}",
            node.method,
            node.context
        );
    }
    for (caller, callee) in graph.edges() {
        assert!(
            graph.predecessors(callee).any(|p| p == caller),
            "Edge {caller} -> {callee} missing from predecessors"
        );
        assert!(
            !graph.edge_provenance(caller, callee).is_empty(),
            "Edge {caller} -> {callee} has no provenance"
        );
    }
}
