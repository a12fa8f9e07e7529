//! # Free List
//!
//! LIFO cache of idle instances of one type, with an optional capacity.

use crate::entity::Poolable;
use crate::identity::Identity;
use std::any::Any;
use std::collections::HashSet;

/// Counters kept per pooled type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Instances currently waiting in the free list.
    pub free: usize,
    /// Configured capacity (`None` = unbounded).
    pub max_count: Option<usize>,
    /// Fresh constructions (by `create` on an empty list or by `full_fill`).
    pub created: u64,
    /// Instances handed back out by `create`.
    pub reused: u64,
    /// Instances accepted by `recycle`.
    pub recycled: u64,
    /// Instances dropped by `recycle` because the list was full.
    pub discarded: u64,
}

/// Free list for a single type.
pub(crate) struct FreeList<T> {
    /// Idle instances; the most recently recycled one is last.
    items: Vec<T>,
    /// Identities of everything in `items`.
    members: HashSet<Identity>,
    /// Capacity. `None` = unbounded, `Some(0)` = pooling disabled.
    max_count: Option<usize>,
    stats: PoolStats,
}

impl<T: Poolable> FreeList<T> {
    pub(crate) fn new() -> Self {
        Self {
            items: Vec::new(),
            members: HashSet::new(),
            max_count: None,
            stats: PoolStats::default(),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub(crate) const fn max_count(&self) -> Option<usize> {
        self.max_count
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.max_count.is_some_and(|max| self.items.len() >= max)
    }

    #[inline]
    pub(crate) fn contains(&self, identity: Identity) -> bool {
        self.members.contains(&identity)
    }

    pub(crate) fn pop(&mut self) -> Option<T> {
        let item = self.items.pop()?;
        self.members.remove(&item.identity());
        self.stats.reused += 1;
        Some(item)
    }

    /// Pushes without checking capacity or duplicates; callers do that.
    pub(crate) fn push(&mut self, item: T) {
        self.members.insert(item.identity());
        self.items.push(item);
        self.stats.recycled += 1;
    }

    pub(crate) fn fill_fresh(&mut self) {
        let item = T::default();
        self.members.insert(item.identity());
        self.items.push(item);
        self.stats.created += 1;
    }

    pub(crate) fn note_created(&mut self) {
        self.stats.created += 1;
    }

    pub(crate) fn note_discarded(&mut self) {
        self.stats.discarded += 1;
    }

    pub(crate) fn set_max_count(&mut self, max: usize) {
        self.max_count = Some(max);
        self.truncate(max);
    }

    /// Drops the most recently recycled entries until `len <= n`.
    pub(crate) fn truncate(&mut self, n: usize) {
        while self.items.len() > n {
            if let Some(item) = self.items.pop() {
                self.members.remove(&item.identity());
            }
        }
    }
}

/// Type-erased view of a [`FreeList`], so the pool can hold every type in one map.
pub(crate) trait ErasedFreeList: Send {
    fn stats(&self) -> PoolStats;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Poolable> ErasedFreeList for FreeList<T> {
    fn stats(&self) -> PoolStats {
        PoolStats {
            free: self.items.len(),
            max_count: self.max_count,
            ..self.stats
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
