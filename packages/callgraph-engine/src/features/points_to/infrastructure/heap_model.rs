//! Interning tables for instance keys and pointer keys
//!
//! Both key kinds are interned into dense ids on first use so that points-to
//! sets and solver tables can be indexed by `u32`. Ids are stable for the
//! lifetime of one build and never reused.

use crate::features::points_to::domain::{InstanceKey, InstanceKeyId, PointerKey, PointerKeyId};
use crate::shared::constants::capacity;
use crate::shared::models::TypeName;
use rustc_hash::FxHashMap;

#[derive(Debug, Default)]
pub struct HeapModel {
    instance_keys: Vec<InstanceKey>,
    instance_index: FxHashMap<InstanceKey, InstanceKeyId>,
    pointer_keys: Vec<PointerKey>,
    pointer_index: FxHashMap<PointerKey, PointerKeyId>,
}

impl HeapModel {
    pub fn new() -> Self {
        Self {
            instance_keys: Vec::new(),
            instance_index: FxHashMap::default(),
            pointer_keys: Vec::with_capacity(capacity::INITIAL_POINTER_KEY_CAPACITY),
            pointer_index: FxHashMap::default(),
        }
    }

    /// Intern an instance key, returning its id
    pub fn intern_instance(&mut self, key: InstanceKey) -> InstanceKeyId {
        if let Some(&id) = self.instance_index.get(&key) {
            return id;
        }
        let id = InstanceKeyId(self.instance_keys.len() as u32);
        self.instance_keys.push(key.clone());
        self.instance_index.insert(key, id);
        id
    }

    /// Intern a pointer key, returning its id
    pub fn intern_pointer(&mut self, key: PointerKey) -> PointerKeyId {
        if let Some(&id) = self.pointer_index.get(&key) {
            return id;
        }
        let id = PointerKeyId(self.pointer_keys.len() as u32);
        self.pointer_keys.push(key.clone());
        self.pointer_index.insert(key, id);
        id
    }

    #[inline]
    pub fn instance_key(&self, id: InstanceKeyId) -> &InstanceKey {
        &self.instance_keys[id.index()]
    }

    #[inline]
    pub fn pointer_key(&self, id: PointerKeyId) -> &PointerKey {
        &self.pointer_keys[id.index()]
    }

    pub fn find_instance(&self, key: &InstanceKey) -> Option<InstanceKeyId> {
        self.instance_index.get(key).copied()
    }

    pub fn find_pointer(&self, key: &PointerKey) -> Option<PointerKeyId> {
        self.pointer_index.get(key).copied()
    }

    /// Concrete type of the objects an instance key stands for
    pub fn instance_type(&self, id: InstanceKeyId) -> TypeName {
        self.instance_key(id).concrete_type()
    }

    pub fn instance_count(&self) -> usize {
        self.instance_keys.len()
    }

    pub fn pointer_count(&self) -> usize {
        self.pointer_keys.len()
    }

    pub fn instance_keys(&self) -> impl Iterator<Item = (InstanceKeyId, &InstanceKey)> + '_ {
        self.instance_keys
            .iter()
            .enumerate()
            .map(|(i, k)| (InstanceKeyId(i as u32), k))
    }

    pub fn pointer_keys(&self) -> impl Iterator<Item = (PointerKeyId, &PointerKey)> + '_ {
        self.pointer_keys
            .iter()
            .enumerate()
            .map(|(i, k)| (PointerKeyId(i as u32), k))
    }
}
