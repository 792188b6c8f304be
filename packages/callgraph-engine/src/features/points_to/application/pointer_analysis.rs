//! Queryable points-to relation produced by a build

use crate::features::call_graph::domain::{CallGraph, NodeId};
use crate::features::ir::domain::ValueId;
use crate::features::points_to::domain::{InstanceKey, InstanceKeyId, PointerKey};
use crate::features::points_to::infrastructure::{HeapModel, PointsToSet, PropagationStats};
use crate::shared::models::TypeName;

/// Final (or, for cancelled builds, partial) points-to relation
#[derive(Debug)]
pub struct PointerAnalysis {
    heap: HeapModel,
    sets: Vec<PointsToSet>,
    stats: PropagationStats,
}

impl PointerAnalysis {
    pub fn new(heap: HeapModel, sets: Vec<PointsToSet>, stats: PropagationStats) -> Self {
        Self { heap, sets, stats }
    }

    /// Instance keys a pointer key may reference; empty for unknown keys
    pub fn points_to(&self, key: &PointerKey) -> Vec<InstanceKeyId> {
        self.heap
            .find_pointer(key)
            .and_then(|id| self.sets.get(id.index()))
            .map(|set| set.iter().collect())
            .unwrap_or_default()
    }

    pub fn points_to_local(&self, node: NodeId, value: ValueId) -> Vec<InstanceKeyId> {
        self.points_to(&PointerKey::local(node, value))
    }

    pub fn points_to_return(&self, node: NodeId) -> Vec<InstanceKeyId> {
        self.points_to(&PointerKey::ReturnValue(node))
    }

    #[inline]
    pub fn instance_key(&self, id: InstanceKeyId) -> &InstanceKey {
        self.heap.instance_key(id)
    }

    /// Every pointer key with a non-empty set, paired with that set
    pub fn non_empty(&self) -> impl Iterator<Item = (&PointerKey, &PointsToSet)> + '_ {
        self.heap
            .pointer_keys()
            .filter_map(|(id, key)| self.sets.get(id.index()).filter(|s| !s.is_empty()).map(|s| (key, s)))
    }

    /// Distinct concrete types among the keys a pointer may reference
    pub fn types_of(&self, key: &PointerKey) -> Vec<TypeName> {
        let mut types: Vec<TypeName> = self
            .points_to(key)
            .into_iter()
            .map(|ik| self.heap.instance_type(ik))
            .collect();
        types.sort();
        types.dedup();
        types
    }

    /// Human-readable rendering of an instance key, naming the allocating method
    pub fn describe_instance_key(&self, id: InstanceKeyId, graph: &CallGraph) -> String {
        match self.heap.instance_key(id) {
            InstanceKey::AllocationSite { node, site, ty, .. } => match graph.node(*node) {
                Some(n) => format!("new {ty} @ {}[{}]#{site}", n.method, n.context),
                None => format!("new {ty} @ {node}#{site}"),
            },
            other => other.to_string(),
        }
    }

    pub fn heap(&self) -> &HeapModel {
        &self.heap
    }

    pub fn instance_count(&self) -> usize {
        self.heap.instance_count()
    }

    pub fn pointer_count(&self) -> usize {
        self.heap.pointer_count()
    }

    pub fn stats(&self) -> &PropagationStats {
        &self.stats
    }
}
