//! Canonical, id-free rendering of a build
//!
//! Node and instance-key ids depend on discovery order. A snapshot replaces
//! every id by a structural description (method, context, allocation site) so
//! two runs over the same input can be compared for equality regardless of
//! the order in which the worklist processed them.

use crate::errors::Result;
use crate::features::call_graph::domain::{CallGraph, NodeId};
use crate::features::context::domain::Context;
use crate::features::points_to::domain::{InstanceKey, InstanceKeyId, PointerKey};
use crate::features::points_to::PointerAnalysis;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: BTreeSet<String>,
    pub edges: BTreeSet<(String, String)>,
    /// (caller, callee, "cause@site")
    pub provenance: BTreeSet<(String, String, String)>,
    /// (pointer key, instance key) pairs of the points-to relation
    pub points_to: BTreeSet<(String, String)>,
}

struct Renderer<'a> {
    graph: &'a CallGraph,
    analysis: &'a PointerAnalysis,
    nodes: Vec<Option<String>>,
}

impl<'a> Renderer<'a> {
    fn new(graph: &'a CallGraph, analysis: &'a PointerAnalysis) -> Self {
        Self {
            graph,
            analysis,
            nodes: vec![None; graph.node_count()],
        }
    }

    fn node(&mut self, id: NodeId) -> String {
        if let Some(Some(done)) = self.nodes.get(id.index()) {
            return done.clone();
        }
        let graph = self.graph;
        let Some(node) = graph.node(id) else {
            return id.to_string();
        };
        // Keys in a context were interned before the node existed, so the
        // recursion through `instance` only reaches older nodes.
        let context = self.context(&node.context);
        let rendered = format!("{} [{context}]", node.method);
        if let Some(slot) = self.nodes.get_mut(id.index()) {
            *slot = Some(rendered.clone());
        }
        rendered
    }

    fn context(&mut self, context: &Context) -> String {
        match context {
            Context::ReceiverInstance(ik) => format!("Receiver({})", self.instance(*ik)),
            Context::ConstantParameter { index, key } => {
                format!("Parameter{index}({})", self.instance(*key))
            }
            other => other.to_string(),
        }
    }

    fn instance(&mut self, id: InstanceKeyId) -> String {
        match self.analysis.instance_key(id).clone() {
            InstanceKey::AllocationSite { node, site, ty, .. } => {
                format!("new {ty} in {}#{site}", self.node(node))
            }
            InstanceKey::TypeBased(ty) => format!("type {ty}"),
            InstanceKey::Constant(value) => value.to_string(),
        }
    }

    fn pointer(&mut self, key: &PointerKey) -> String {
        match key {
            PointerKey::Local { node, value } => format!("{}:v{value}", self.node(*node)),
            PointerKey::ReturnValue(node) => format!("{}:ret", self.node(*node)),
            PointerKey::ExceptionalReturn(node) => format!("{}:exc", self.node(*node)),
            PointerKey::InstanceField { object, field } => {
                format!("({}).{field}", self.instance(*object))
            }
            PointerKey::StaticField(field) => field.to_string(),
            PointerKey::ArrayContents(object) => format!("({})[]", self.instance(*object)),
        }
    }
}

impl GraphSnapshot {
    pub fn capture(graph: &CallGraph, analysis: &PointerAnalysis) -> Self {
        let mut r = Renderer::new(graph, analysis);
        let mut snapshot = GraphSnapshot::default();

        for node in graph.nodes() {
            let rendered = r.node(node.id);
            snapshot.nodes.insert(rendered);
        }

        for (caller, callee) in graph.edges() {
            let (from, to) = (r.node(caller), r.node(callee));
            for p in graph.edge_provenance(caller, callee) {
                let site = p.site.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
                snapshot
                    .provenance
                    .insert((from.clone(), to.clone(), format!("{}@{site}", p.cause)));
            }
            snapshot.edges.insert((from, to));
        }

        let relation: Vec<(PointerKey, Vec<InstanceKeyId>)> = analysis
            .non_empty()
            .map(|(pk, set)| (pk.clone(), set.iter().collect()))
            .collect();
        for (pk, keys) in relation {
            let pointer = r.pointer(&pk);
            for ik in keys {
                let instance = r.instance(ik);
                snapshot.points_to.insert((pointer.clone(), instance));
            }
        }
        snapshot
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Lines present in exactly one of the two snapshots, for test failure messages
    pub fn difference(&self, other: &GraphSnapshot) -> Vec<String> {
        let mut out = Vec::new();
        for n in self.nodes.symmetric_difference(&other.nodes) {
            out.push(format!("node {n}"));
        }
        for (a, b) in self.edges.symmetric_difference(&other.edges) {
            out.push(format!("edge {a} -> {b}"));
        }
        for (p, i) in self.points_to.symmetric_difference(&other.points_to) {
            out.push(format!("pts {p} -> {i}"));
        }
        out
    }
}
