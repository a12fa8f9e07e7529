//! # Entity Identity
//!
//! Identities are handed out from a single process-wide counter. They start at 1,
//! only ever increase, and are never reused, even after the entity is dropped.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Next identity to hand out. Zero is reserved for [`Identity::NULL`].
static NEXT_IDENTITY: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of an entity.
///
/// `Default` allocates a fresh identity, so `#[derive(Default)]` on an entity
/// struct that embeds an `Identity` gives every constructed value its own id.
/// Cloning a value copies its identity: both copies are handles to the same
/// entity as far as the pool is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Identity(u64);

impl Identity {
    /// Placeholder identity that no entity ever receives.
    pub const NULL: Self = Self(0);

    /// Allocates the next identity.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw counter value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Checks if this is the null identity.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::next()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_monotonic() {
        let a = Identity::next();
        let b = Identity::next();
        assert!(b > a);
        assert!(!a.is_null());
    }

    #[test]
    fn test_default_allocates_fresh_identity() {
        let a = Identity::default();
        let b = Identity::default();
        assert_ne!(a, b);
    }

    #[test]
    fn test_null_is_never_allocated() {
        assert!(Identity::NULL.is_null());
        assert_ne!(Identity::next(), Identity::NULL);
        assert_eq!(Identity::NULL.to_string(), "#0");
    }
}
