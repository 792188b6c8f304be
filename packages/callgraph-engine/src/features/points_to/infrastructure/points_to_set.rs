//! Points-to sets
//!
//! Sorted, de-duplicated vectors of instance key ids. Sets only grow during
//! construction, so the operations the solver needs are insertion, union and
//! the difference used to compute propagation deltas.
//!
//! # Performance Characteristics
//! - Insert: O(n) worst case, O(1) when appending the largest id
//! - Contains: O(log n)
//! - Union / difference: O(n + m) merge

use crate::features::points_to::domain::InstanceKeyId;
use std::cmp::Ordering;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PointsToSet {
    elements: Vec<InstanceKeyId>,
}

impl PointsToSet {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn singleton(element: InstanceKeyId) -> Self {
        Self {
            elements: vec![element],
        }
    }

    /// Insert one element, returning whether it was new
    pub fn insert(&mut self, element: InstanceKeyId) -> bool {
        match self.elements.last() {
            None => {
                self.elements.push(element);
                true
            }
            Some(last) if *last < element => {
                self.elements.push(element);
                true
            }
            _ => match self.elements.binary_search(&element) {
                Ok(_) => false,
                Err(pos) => {
                    self.elements.insert(pos, element);
                    true
                }
            },
        }
    }

    #[inline]
    pub fn contains(&self, element: InstanceKeyId) -> bool {
        self.elements.binary_search(&element).is_ok()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = InstanceKeyId> + '_ {
        self.elements.iter().copied()
    }

    pub fn as_slice(&self) -> &[InstanceKeyId] {
        &self.elements
    }

    /// Union `other` into `self`, returning whether `self` grew
    pub fn union_with(&mut self, other: &PointsToSet) -> bool {
        if other.is_empty() {
            return false;
        }
        if self.is_empty() {
            self.elements = other.elements.clone();
            return true;
        }

        let mut merged = Vec::with_capacity(self.elements.len() + other.elements.len());
        let (mut i, mut j) = (0, 0);
        while i < self.elements.len() && j < other.elements.len() {
            match self.elements[i].cmp(&other.elements[j]) {
                Ordering::Less => {
                    merged.push(self.elements[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    merged.push(other.elements[j]);
                    j += 1;
                }
                Ordering::Equal => {
                    merged.push(self.elements[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        merged.extend_from_slice(&self.elements[i..]);
        merged.extend_from_slice(&other.elements[j..]);

        let grew = merged.len() > self.elements.len();
        self.elements = merged;
        grew
    }

    /// Elements of `self` missing from `other`
    pub fn difference(&self, other: &PointsToSet) -> PointsToSet {
        if other.is_empty() {
            return self.clone();
        }
        let mut out = Vec::new();
        let mut j = 0;
        for &e in &self.elements {
            while j < other.elements.len() && other.elements[j] < e {
                j += 1;
            }
            if j >= other.elements.len() || other.elements[j] != e {
                out.push(e);
            }
        }
        PointsToSet { elements: out }
    }

    /// Keep only elements satisfying `keep`
    pub fn filtered(&self, mut keep: impl FnMut(InstanceKeyId) -> bool) -> PointsToSet {
        PointsToSet {
            elements: self.elements.iter().copied().filter(|e| keep(*e)).collect(),
        }
    }

    pub fn is_subset_of(&self, other: &PointsToSet) -> bool {
        self.difference(other).is_empty()
    }
}

impl FromIterator<InstanceKeyId> for PointsToSet {
    fn from_iter<T: IntoIterator<Item = InstanceKeyId>>(iter: T) -> Self {
        let mut elements: Vec<InstanceKeyId> = iter.into_iter().collect();
        elements.sort_unstable();
        elements.dedup();
        Self { elements }
    }
}
