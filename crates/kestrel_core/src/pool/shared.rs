//! Process-wide pool.

use super::ObjectPool;
use parking_lot::{Mutex, MutexGuard};

static SHARED_POOL: Mutex<ObjectPool> = parking_lot::const_mutex(ObjectPool::new());

/// Locks and returns the process-wide pool.
///
/// Keep the guard short-lived: holding it across a call that disposes into
/// the shared pool deadlocks.
///
/// # Example
///
/// ```rust
/// use kestrel_core::{pool, Identity, Poolable};
///
/// #[derive(Default)]
/// struct Token { id: Identity }
///
/// impl Poolable for Token {
///     fn identity(&self) -> Identity { self.id }
/// }
///
/// let token = pool::shared().create::<Token>();
/// token.dispose_shared().unwrap();
/// assert_eq!(pool::shared().free_count::<Token>(), 1);
/// ```
pub fn shared() -> MutexGuard<'static, ObjectPool> {
    SHARED_POOL.lock()
}
