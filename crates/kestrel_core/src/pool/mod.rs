//! # Object Pool
//!
//! Per-type free-list cache for [`Poolable`] entities.
//!
//! ## Design
//!
//! - One free list per concrete type, keyed by [`TypeTag`]
//! - Free lists are created lazily the first time a type is touched
//! - Lists are LIFO: `create` hands back the most recently recycled instance
//! - A list never grows past its capacity; overflow is dropped, not reported
//!
//! # Thread Safety
//!
//! `ObjectPool` itself is a plain value. Use [`shared`] for the process-wide
//! instance guarded by a mutex.

mod free_list;
mod shared;

pub use free_list::PoolStats;
pub use shared::shared;

use crate::config::PoolConfig;
use crate::entity::Poolable;
use crate::error::{PoolError, PoolResult};
use crate::tag::TypeTag;
use free_list::{ErasedFreeList, FreeList};
use std::collections::BTreeMap;

/// A cache of idle entities, one free list per type.
///
/// # Example
///
/// ```rust
/// use kestrel_core::{Identity, ObjectPool, Poolable};
///
/// #[derive(Default)]
/// struct Spark { id: Identity }
///
/// impl Poolable for Spark {
///     fn identity(&self) -> Identity { self.id }
/// }
///
/// let mut pool = ObjectPool::new();
/// pool.set_max_count::<Spark>(2);
/// pool.full_fill::<Spark>(None);
/// assert_eq!(pool.free_count::<Spark>(), 2);
///
/// pool.release::<Spark>(Some(0));
/// assert_eq!(pool.free_count::<Spark>(), 0);
/// ```
#[derive(Default)]
pub struct ObjectPool {
    lists: BTreeMap<TypeTag, Box<dyn ErasedFreeList>>,
}

impl ObjectPool {
    /// Creates an empty pool.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lists: BTreeMap::new(),
        }
    }

    /// Returns an idle `T` if one is cached, otherwise constructs a fresh one.
    pub fn create<T: Poolable>(&mut self) -> T {
        let list = self.list_mut::<T>();
        if let Some(item) = list.pop() {
            tracing::trace!(ty = TypeTag::of::<T>().short_name(), identity = %item.identity(), "reused pooled instance");
            return item;
        }
        list.note_created();
        T::default()
    }

    /// Returns `instance` to the free list of its own type.
    ///
    /// If the list is at capacity the instance is simply dropped.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::DuplicateRecycle`] if an instance with the same
    /// identity is already in the free list. The pool is left unchanged.
    pub fn recycle<T: Poolable>(&mut self, instance: T) -> PoolResult<()> {
        let identity = instance.identity();
        let list = self.list_mut::<T>();

        if list.contains(identity) {
            let type_name = TypeTag::of::<T>().name();
            tracing::warn!(ty = type_name, %identity, "rejected duplicate recycle");
            return Err(PoolError::DuplicateRecycle {
                type_name,
                identity,
            });
        }

        if list.is_full() {
            list.note_discarded();
            tracing::debug!(ty = TypeTag::of::<T>().short_name(), %identity, "free list full, dropping instance");
            return Ok(());
        }

        list.push(instance);
        Ok(())
    }

    /// Sets the capacity of `T`'s free list.
    ///
    /// Negative values clamp to 0, which disables pooling for `T`: every later
    /// `recycle` becomes a no-op. Entries above the new capacity are dropped.
    pub fn set_max_count<T: Poolable>(&mut self, n: isize) {
        let max = usize::try_from(n).unwrap_or(0);
        self.list_mut::<T>().set_max_count(max);
    }

    /// Pre-warms `T`'s free list with fresh instances until it holds `n`
    /// entries, or as many as the capacity allows when `n` is `None`.
    ///
    /// Never removes entries and never fills past the capacity. With `None`
    /// and no capacity configured there is no target, so nothing happens.
    pub fn full_fill<T: Poolable>(&mut self, n: Option<usize>) {
        let list = self.list_mut::<T>();
        let target = match (n, list.max_count()) {
            (Some(n), Some(max)) => n.min(max),
            (Some(n), None) => n,
            (None, Some(max)) => max,
            (None, None) => return,
        };

        let before = list.len();
        while list.len() < target {
            list.fill_fresh();
        }
        if list.len() > before {
            tracing::debug!(
                ty = TypeTag::of::<T>().short_name(),
                added = list.len() - before,
                "pre-warmed free list"
            );
        }
    }

    /// Trims `T`'s free list down to `n` entries, or to the capacity when `n`
    /// is `None`. `Some(0)` empties it.
    pub fn release<T: Poolable>(&mut self, n: Option<usize>) {
        let list = self.list_mut::<T>();
        let Some(target) = n.or(list.max_count()) else {
            return;
        };
        list.truncate(target);
    }

    /// Drops every free list of every type, capacities included.
    pub fn release_all(&mut self) {
        tracing::debug!(types = self.lists.len(), "releasing all free lists");
        self.lists.clear();
    }

    /// Applies the `[pools.<name>]` section of `config` to `T`: capacity
    /// first, then pre-warm. Missing sections leave `T` untouched.
    pub fn configure<T: Poolable>(&mut self, name: &str, config: &PoolConfig) {
        let Some(settings) = config.get(name) else {
            return;
        };
        if let Some(max) = settings.max_count {
            self.list_mut::<T>().set_max_count(max);
        }
        if settings.prewarm > 0 {
            self.full_fill::<T>(Some(settings.prewarm));
        }
    }

    /// Number of idle `T` instances.
    #[must_use]
    pub fn free_count<T: Poolable>(&self) -> usize {
        self.list::<T>().map_or(0, FreeList::len)
    }

    /// Capacity of `T`'s free list (`None` = unbounded).
    #[must_use]
    pub fn max_count<T: Poolable>(&self) -> Option<usize> {
        self.list::<T>().and_then(FreeList::max_count)
    }

    /// Counters for `T`, if its free list exists.
    #[must_use]
    pub fn stats_of<T: Poolable>(&self) -> Option<PoolStats> {
        self.lists.get(&TypeTag::of::<T>()).map(|list| list.stats())
    }

    /// Counters for every type that currently has a free list.
    pub fn stats(&self) -> impl Iterator<Item = (TypeTag, PoolStats)> + '_ {
        self.lists.iter().map(|(tag, list)| (*tag, list.stats()))
    }

    fn list<T: Poolable>(&self) -> Option<&FreeList<T>> {
        self.lists
            .get(&TypeTag::of::<T>())
            .and_then(|list| list.as_any().downcast_ref::<FreeList<T>>())
    }

    fn list_mut<T: Poolable>(&mut self) -> &mut FreeList<T> {
        self.lists
            .entry(TypeTag::of::<T>())
            .or_insert_with(|| Box::new(FreeList::<T>::new()))
            .as_any_mut()
            .downcast_mut::<FreeList<T>>()
            .expect("free list is keyed by the tag of its element type")
    }
}

impl std::fmt::Debug for ObjectPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.lists.iter().map(|(tag, list)| (tag.short_name(), list.stats())))
            .finish()
    }
}
