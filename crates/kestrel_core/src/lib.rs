//! # KESTREL Core
//!
//! Identity and object reuse for the KESTREL runtime:
//! - Every entity carries a process-unique [`Identity`]
//! - Entities are recycled through per-type free lists ([`ObjectPool`])
//! - Pool capacities and pre-warm counts can be loaded from TOML ([`PoolConfig`])
//!
//! ## Rules
//!
//! 1. **One free list per type** - a recycled `Foo` never satisfies a `create::<Bar>()`
//! 2. **Bounded caches discard silently** - recycling into a full list is not an error
//! 3. **Double recycling is a bug** - it is reported as [`PoolError::DuplicateRecycle`]
//!
//! ## Example
//!
//! ```rust
//! use kestrel_core::{Identity, ObjectPool, Poolable};
//!
//! #[derive(Default)]
//! struct Particle { id: Identity, life: f32 }
//!
//! impl Poolable for Particle {
//!     fn identity(&self) -> Identity { self.id }
//! }
//!
//! let mut pool = ObjectPool::new();
//! pool.set_max_count::<Particle>(128);
//!
//! let particle = pool.create::<Particle>();
//! let id = particle.identity();
//! particle.dispose(&mut pool).unwrap();
//!
//! assert_eq!(pool.create::<Particle>().identity(), id);
//! ```

#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod entity;
pub mod error;
pub mod identity;
pub mod pool;
pub mod tag;

pub use config::{PoolConfig, PoolSettings};
pub use entity::Poolable;
pub use error::{ConfigError, ConfigResult, PoolError, PoolResult};
pub use identity::Identity;
pub use pool::{ObjectPool, PoolStats};
pub use tag::TypeTag;
