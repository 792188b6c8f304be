//! Deduplicating worklist with a configurable processing order
//!
//! The fixpoint does not depend on the order items are processed in; the
//! order is configurable so that this can be exercised.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::hash::Hash;

/// Order in which queued items are processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorklistOrder {
    Fifo,
    Lifo,
    /// Pseudo-random order derived from `seed`
    Scrambled { seed: u64 },
}

impl Default for WorklistOrder {
    fn default() -> Self {
        WorklistOrder::Fifo
    }
}

#[derive(Debug)]
pub struct Worklist<T> {
    items: VecDeque<T>,
    queued: FxHashSet<T>,
    order: WorklistOrder,
    state: u64,
}

impl<T: Copy + Eq + Hash> Worklist<T> {
    pub fn new(order: WorklistOrder) -> Self {
        let state = match order {
            WorklistOrder::Scrambled { seed } => seed ^ 0x9e37_79b9_7f4a_7c15,
            _ => 0,
        };
        Self {
            items: VecDeque::new(),
            queued: FxHashSet::default(),
            order,
            state,
        }
    }

    /// Queue an item unless it is already queued
    pub fn push(&mut self, item: T) -> bool {
        if self.queued.insert(item) {
            self.items.push_back(item);
            true
        } else {
            false
        }
    }

    pub fn pop(&mut self) -> Option<T> {
        let item = match self.order {
            WorklistOrder::Fifo => self.items.pop_front(),
            WorklistOrder::Lifo => self.items.pop_back(),
            WorklistOrder::Scrambled { .. } => {
                if self.items.is_empty() {
                    None
                } else {
                    let idx = (self.next_random() % self.items.len() as u64) as usize;
                    self.items.swap_remove_back(idx)
                }
            }
        }?;
        self.queued.remove(&item);
        Some(item)
    }

    /// Remove up to `max` items in processing order
    pub fn drain_batch(&mut self, max: usize) -> Vec<T> {
        let mut batch = Vec::with_capacity(max.min(self.items.len()));
        while batch.len() < max {
            match self.pop() {
                Some(item) => batch.push(item),
                None => break,
            }
        }
        batch
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // xorshift64*
    fn next_random(&mut self) -> u64 {
        let mut x = self.state.max(1);
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_f491_4f6c_dd1d)
    }
}
