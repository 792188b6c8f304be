//! Incremental Andersen-style propagation engine
//!
//! Inclusion-based pointer analysis with difference propagation: every pointer
//! key keeps the instance keys added since it was last processed, and only that
//! delta is pushed along copy edges, through load/store constraints keyed on
//! the pointer as a base, and to registered observers.
//!
//! Constraints can be added at any time. A new copy edge, load, store or
//! observer immediately sees the full current set of its source, so the order
//! in which constraints arrive does not change the fixpoint.
//!
//! # References
//! - Andersen, L. O. "Program Analysis and Specialization for C" (PhD 1994)
//! - Pearce et al. "Efficient Field-Sensitive Pointer Analysis" (CC 2004)
//! - Lhoták & Hendren "Scaling Java Points-to Analysis using Spark" (CC 2003)

use super::heap_model::HeapModel;
use super::points_to_set::PointsToSet;
use super::worklist::{Worklist, WorklistOrder};
use crate::features::hierarchy::ports::ClassHierarchy;
use crate::features::points_to::domain::{
    InstanceKey, InstanceKeyId, PointerKey, PointerKeyId, Slot,
};
use crate::shared::models::TypeName;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

/// Index into the owner's observer table
pub type ObserverId = u32;

/// New instance keys reached an observed pointer key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub observer: ObserverId,
    pub pointer: PointerKeyId,
    pub keys: Vec<InstanceKeyId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CopyEdge {
    dst: PointerKeyId,
    /// Only keys whose type is a subtype of the filter pass
    filter: Option<TypeName>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Deref {
    /// dst ⊇ base.slot
    Load { slot: Slot, dst: PointerKeyId },
    /// base.slot ⊇ src
    Store { slot: Slot, src: PointerKeyId },
}

/// Propagation statistics
#[derive(Debug, Clone, Default)]
pub struct PropagationStats {
    pub steps: usize,
    pub propagations: usize,
    pub copy_edges: usize,
    pub deref_constraints: usize,
    pub notifications: usize,
}

pub struct PropagationEngine<'a> {
    hierarchy: &'a dyn ClassHierarchy,

    /// Interned instance and pointer keys
    heap: HeapModel,

    /// Points-to sets indexed by pointer key id
    points_to: Vec<PointsToSet>,

    /// Keys added since the pointer key was last processed
    deltas: FxHashMap<PointerKeyId, PointsToSet>,

    /// Copy edges (src → {dst})
    copy_edges: FxHashMap<PointerKeyId, Vec<CopyEdge>>,
    copy_index: FxHashSet<(PointerKeyId, CopyEdge)>,

    /// Load/store constraints keyed on the base pointer
    derefs: FxHashMap<PointerKeyId, Vec<Deref>>,
    deref_index: FxHashSet<(PointerKeyId, Deref)>,

    observers: FxHashMap<PointerKeyId, Vec<ObserverId>>,

    worklist: Worklist<PointerKeyId>,
    notifications: VecDeque<Notification>,

    stats: PropagationStats,
}

impl<'a> PropagationEngine<'a> {
    pub fn new(hierarchy: &'a dyn ClassHierarchy, order: WorklistOrder) -> Self {
        Self {
            hierarchy,
            heap: HeapModel::new(),
            points_to: Vec::new(),
            deltas: FxHashMap::default(),
            copy_edges: FxHashMap::default(),
            copy_index: FxHashSet::default(),
            derefs: FxHashMap::default(),
            deref_index: FxHashSet::default(),
            observers: FxHashMap::default(),
            worklist: Worklist::new(order),
            notifications: VecDeque::new(),
            stats: PropagationStats::default(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Keys
    // ═══════════════════════════════════════════════════════════════════════

    pub fn heap(&self) -> &HeapModel {
        &self.heap
    }

    pub fn pointer_key(&mut self, key: PointerKey) -> PointerKeyId {
        let id = self.heap.intern_pointer(key);
        if id.index() >= self.points_to.len() {
            self.points_to.resize_with(id.index() + 1, PointsToSet::new);
        }
        id
    }

    pub fn instance_key(&mut self, key: InstanceKey) -> InstanceKeyId {
        self.heap.intern_instance(key)
    }

    /// Current points-to set of a pointer key
    pub fn points_to(&self, pk: PointerKeyId) -> &PointsToSet {
        &self.points_to[pk.index()]
    }

    pub fn stats(&self) -> &PropagationStats {
        &self.stats
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Constraints
    // ═══════════════════════════════════════════════════════════════════════

    /// pk ⊇ {ik}
    pub fn add_points_to(&mut self, pk: PointerKeyId, ik: InstanceKeyId) -> bool {
        self.add_all(pk, &PointsToSet::singleton(ik))
    }

    /// dst ⊇ src, optionally restricted to subtypes of `filter`
    pub fn add_copy(&mut self, src: PointerKeyId, dst: PointerKeyId, filter: Option<TypeName>) {
        if src == dst && filter.is_none() {
            return;
        }
        let edge = CopyEdge { dst, filter };
        if !self.copy_index.insert((src, edge.clone())) {
            return;
        }
        self.stats.copy_edges += 1;
        self.copy_edges.entry(src).or_default().push(edge.clone());

        let current = self.points_to[src.index()].clone();
        self.propagate_along(&edge, &current);
    }

    /// dst ⊇ base.slot
    pub fn add_load(&mut self, base: PointerKeyId, slot: Slot, dst: PointerKeyId) {
        self.add_deref(base, Deref::Load { slot, dst });
    }

    /// base.slot ⊇ src
    pub fn add_store(&mut self, base: PointerKeyId, slot: Slot, src: PointerKeyId) {
        self.add_deref(base, Deref::Store { slot, src });
    }

    /// Notify `observer` of every key that reaches `pk`, starting with the current set
    pub fn observe(&mut self, pk: PointerKeyId, observer: ObserverId) {
        self.observers.entry(pk).or_default().push(observer);
        let current = &self.points_to[pk.index()];
        if !current.is_empty() {
            self.notifications.push_back(Notification {
                observer,
                pointer: pk,
                keys: current.as_slice().to_vec(),
            });
            self.stats.notifications += 1;
        }
    }

    fn add_deref(&mut self, base: PointerKeyId, deref: Deref) {
        if !self.deref_index.insert((base, deref.clone())) {
            return;
        }
        self.stats.deref_constraints += 1;
        self.derefs.entry(base).or_default().push(deref.clone());

        let current = self.points_to[base.index()].clone();
        for object in current.iter() {
            self.apply_deref(&deref, object);
        }
    }

    fn apply_deref(&mut self, deref: &Deref, object: InstanceKeyId) {
        match deref {
            Deref::Load { slot, dst } => {
                let field = self.pointer_key(slot.of(object));
                self.add_copy(field, *dst, None);
            }
            Deref::Store { slot, src } => {
                let field = self.pointer_key(slot.of(object));
                self.add_copy(*src, field, None);
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Propagation
    // ═══════════════════════════════════════════════════════════════════════

    fn add_all(&mut self, pk: PointerKeyId, incoming: &PointsToSet) -> bool {
        let new = incoming.difference(&self.points_to[pk.index()]);
        if new.is_empty() {
            return false;
        }
        self.stats.propagations += 1;
        self.points_to[pk.index()].union_with(&new);
        self.deltas.entry(pk).or_default().union_with(&new);
        self.worklist.push(pk);
        true
    }

    fn propagate_along(&mut self, edge: &CopyEdge, keys: &PointsToSet) {
        if keys.is_empty() {
            return;
        }
        match &edge.filter {
            None => {
                self.add_all(edge.dst, keys);
            }
            Some(bound) => {
                let passing = keys.filtered(|ik| {
                    self.hierarchy
                        .is_subtype(&self.heap.instance_type(ik), bound)
                });
                self.add_all(edge.dst, &passing);
            }
        }
    }

    /// Process one pointer key with a pending delta. Returns false when idle.
    pub fn step(&mut self) -> bool {
        let Some(pk) = self.worklist.pop() else {
            return false;
        };
        let Some(delta) = self.deltas.remove(&pk) else {
            return true;
        };
        self.stats.steps += 1;

        if let Some(edges) = self.copy_edges.get(&pk).cloned() {
            for edge in &edges {
                self.propagate_along(edge, &delta);
            }
        }

        if let Some(derefs) = self.derefs.get(&pk).cloned() {
            for deref in &derefs {
                for object in delta.iter() {
                    self.apply_deref(deref, object);
                }
            }
        }

        if let Some(observers) = self.observers.get(&pk) {
            for &observer in observers {
                self.notifications.push_back(Notification {
                    observer,
                    pointer: pk,
                    keys: delta.as_slice().to_vec(),
                });
                self.stats.notifications += 1;
            }
        }
        true
    }

    pub fn pop_notification(&mut self) -> Option<Notification> {
        self.notifications.pop_front()
    }

    /// No pending deltas and no undelivered notifications
    pub fn is_quiescent(&self) -> bool {
        self.worklist.is_empty() && self.notifications.is_empty()
    }

    /// Run until idle; notifications are left queued for the owner
    pub fn solve(&mut self) {
        while self.step() {}
    }

    /// Hand over the final relation
    pub fn into_parts(self) -> (HeapModel, Vec<PointsToSet>, PropagationStats) {
        (self.heap, self.points_to, self.stats)
    }
}
