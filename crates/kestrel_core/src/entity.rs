//! # Pooled Entities
//!
//! The base contract for anything that can live in an [`ObjectPool`]:
//! a stable identity and a disposal hook.

use crate::error::PoolResult;
use crate::identity::Identity;
use crate::pool::{self, ObjectPool};

/// An entity that can be created from and returned to an object pool.
///
/// `Default` is the zero-argument constructor the pool falls back on when a
/// free list is empty. Implementors usually embed an [`Identity`] field and
/// derive `Default`, which allocates a fresh identity per construction.
///
/// # Example
///
/// ```rust
/// use kestrel_core::{Identity, ObjectPool, Poolable};
///
/// #[derive(Default)]
/// struct Packet { id: Identity, bytes: Vec<u8> }
///
/// impl Poolable for Packet {
///     fn identity(&self) -> Identity { self.id }
///
///     fn on_dispose(&mut self) {
///         self.bytes.clear();
///     }
/// }
///
/// let mut pool = ObjectPool::new();
/// let mut packet = pool.create::<Packet>();
/// packet.bytes.extend_from_slice(b"hello");
/// packet.dispose(&mut pool).unwrap();
///
/// assert!(pool.create::<Packet>().bytes.is_empty());
/// ```
pub trait Poolable: Default + Send + 'static {
    /// Returns the entity's identity. Must be the same value for its whole life.
    fn identity(&self) -> Identity;

    /// Called by [`dispose`](Self::dispose) right before the entity goes back
    /// into its free list.
    fn on_dispose(&mut self) {}

    /// Runs [`on_dispose`](Self::on_dispose) and recycles the entity into `pool`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::DuplicateRecycle`](crate::PoolError::DuplicateRecycle)
    /// if an entity with the same identity is already in the free list.
    fn dispose(mut self, pool: &mut ObjectPool) -> PoolResult<()> {
        self.on_dispose();
        pool.recycle(self)
    }

    /// Same as [`dispose`](Self::dispose), targeting the process-wide pool.
    ///
    /// The hook runs before the shared pool is locked, so it may itself use
    /// the shared pool.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::DuplicateRecycle`](crate::PoolError::DuplicateRecycle)
    /// if an entity with the same identity is already in the free list.
    fn dispose_shared(mut self) -> PoolResult<()> {
        self.on_dispose();
        pool::shared().recycle(self)
    }
}
