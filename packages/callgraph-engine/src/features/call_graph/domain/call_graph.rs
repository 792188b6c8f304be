//! Call graph arena
//!
//! Nodes live in a `Vec` addressed by `NodeId`; successor and predecessor
//! sets hold ids, never references, so cycles in the program are plain data.
//! The graph only grows while it is built.
//!
//! # Invariants
//! - At most one node per (method, context); `add_node` rejects duplicates
//! - `successors` and `predecessors` mirror each other
//! - Every edge carries at least one `EdgeProvenance`

use super::edge::{EdgeCause, EdgeProvenance};
use super::node::{CgNode, NodeId};
use crate::errors::{CallGraphError, Result};
use crate::features::context::domain::Context;
use crate::shared::constants::capacity;
use crate::shared::models::MethodRef;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

#[derive(Debug, Default)]
pub struct CallGraph {
    nodes: Vec<CgNode>,
    index: FxHashMap<(MethodRef, Context), NodeId>,
    by_method: FxHashMap<MethodRef, Vec<NodeId>>,
    successors: Vec<BTreeSet<NodeId>>,
    predecessors: Vec<BTreeSet<NodeId>>,
    provenance: FxHashMap<(NodeId, NodeId), Vec<EdgeProvenance>>,
    site_targets: FxHashMap<(NodeId, u32), BTreeSet<NodeId>>,
    root: Option<NodeId>,
    entry_nodes: Vec<NodeId>,
    edge_count: usize,
}

impl CallGraph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::with_capacity(capacity::INITIAL_NODE_CAPACITY),
            successors: Vec::with_capacity(capacity::INITIAL_NODE_CAPACITY),
            predecessors: Vec::with_capacity(capacity::INITIAL_NODE_CAPACITY),
            ..Default::default()
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Nodes
    // ═══════════════════════════════════════════════════════════════════════

    /// Create the node for (method, context). A second request for the same
    /// pair is an internal-consistency fault.
    pub fn add_node(&mut self, method: MethodRef, context: Context) -> Result<NodeId> {
        let key = (method, context);
        if self.index.contains_key(&key) {
            return Err(CallGraphError::DuplicateNode {
                method: key.0.to_string(),
                context: key.1.to_string(),
            });
        }
        let id = NodeId(self.nodes.len() as u32);
        let (method, context) = key.clone();
        self.by_method.entry(method.clone()).or_default().push(id);
        self.nodes.push(CgNode {
            id,
            method,
            context,
        });
        self.successors.push(BTreeSet::new());
        self.predecessors.push(BTreeSet::new());
        self.index.insert(key, id);
        Ok(id)
    }

    /// Existing node for (method, context), or a new one. The flag is true
    /// when the node was created by this call.
    pub fn find_or_create(&mut self, method: &MethodRef, context: &Context) -> Result<(NodeId, bool)> {
        if let Some(id) = self.find_node(method, context) {
            return Ok((id, false));
        }
        let id = self.add_node(method.clone(), context.clone())?;
        Ok((id, true))
    }

    pub fn find_node(&self, method: &MethodRef, context: &Context) -> Option<NodeId> {
        self.index.get(&(method.clone(), context.clone())).copied()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&CgNode> {
        self.nodes.get(id.index())
    }

    pub fn nodes(&self) -> impl Iterator<Item = &CgNode> + '_ {
        self.nodes.iter()
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Every node of `method`, across contexts
    pub fn nodes_for_method(&self, method: &MethodRef) -> &[NodeId] {
        self.by_method.get(method).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Methods with at least one node
    pub fn methods(&self) -> impl Iterator<Item = &MethodRef> + '_ {
        self.by_method.keys()
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn add_entry_node(&mut self, id: NodeId) {
        if !self.entry_nodes.contains(&id) {
            self.entry_nodes.push(id);
        }
    }

    pub fn entry_nodes(&self) -> &[NodeId] {
        &self.entry_nodes
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Edges
    // ═══════════════════════════════════════════════════════════════════════

    /// Record `caller → callee` with its provenance; returns true for a new edge
    pub fn add_edge(&mut self, caller: NodeId, site: Option<u32>, callee: NodeId, cause: EdgeCause) -> bool {
        let new_edge = self.successors[caller.index()].insert(callee);
        if new_edge {
            self.predecessors[callee.index()].insert(caller);
            self.edge_count += 1;
        }

        let provenance = EdgeProvenance::new(site, cause);
        let entries = self.provenance.entry((caller, callee)).or_default();
        if !entries.contains(&provenance) {
            entries.push(provenance);
        }

        if let Some(site) = site {
            self.site_targets.entry((caller, site)).or_default().insert(callee);
        }
        new_edge
    }

    pub fn successors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.successors
            .get(id.index())
            .into_iter()
            .flat_map(|s| s.iter().copied())
    }

    pub fn predecessors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.predecessors
            .get(id.index())
            .into_iter()
            .flat_map(|s| s.iter().copied())
    }

    pub fn has_edge(&self, caller: NodeId, callee: NodeId) -> bool {
        self.successors
            .get(caller.index())
            .is_some_and(|s| s.contains(&callee))
    }

    /// Targets of one call site
    pub fn site_targets(&self, caller: NodeId, site: u32) -> Vec<NodeId> {
        self.site_targets
            .get(&(caller, site))
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn edge_provenance(&self, caller: NodeId, callee: NodeId) -> &[EdgeProvenance] {
        self.provenance
            .get(&(caller, callee))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All edges as (caller, callee), in caller order
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.successors
            .iter()
            .enumerate()
            .flat_map(|(i, succ)| succ.iter().map(move |&callee| (NodeId(i as u32), callee)))
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Consistency
    // ═══════════════════════════════════════════════════════════════════════

    /// Verify arena, index and edge sets agree
    pub fn check_consistency(&self) -> Result<()> {
        if self.index.len() != self.nodes.len() {
            return Err(CallGraphError::invariant(format!(
                "index holds {} entries for {} nodes",
                self.index.len(),
                self.nodes.len()
            )));
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if node.id.index() != i {
                return Err(CallGraphError::invariant(format!("node {} stored at slot {i}", node.id)));
            }
            if self.find_node(&node.method, &node.context) != Some(node.id) {
                return Err(CallGraphError::invariant(format!("node {node} missing from index")));
            }
        }

        let mut edges = 0;
        for (caller, callee) in self.edges() {
            edges += 1;
            if callee.index() >= self.nodes.len() {
                return Err(CallGraphError::invariant(format!("edge to unknown node {callee}")));
            }
            if !self.predecessors[callee.index()].contains(&caller) {
                return Err(CallGraphError::invariant(format!(
                    "edge {caller} -> {callee} has no reverse entry"
                )));
            }
            if self.edge_provenance(caller, callee).is_empty() {
                return Err(CallGraphError::invariant(format!(
                    "edge {caller} -> {callee} has no provenance"
                )));
            }
        }
        let reverse: usize = self.predecessors.iter().map(BTreeSet::len).sum();
        if edges != self.edge_count || reverse != self.edge_count {
            return Err(CallGraphError::invariant(format!(
                "edge count {} disagrees with successor ({edges}) or predecessor ({reverse}) sets",
                self.edge_count
            )));
        }
        Ok(())
    }
}
