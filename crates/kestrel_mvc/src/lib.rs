//! # KESTREL MVC
//!
//! Single-instance registries with event fan-out, built on `kestrel_core`.
//!
//! ## Architecture
//!
//! - [`ControllerRegistry`]: one controller per command string
//! - [`ModelRegistry`]: one instance per model type
//! - [`ViewRegistry`]: one instance per view type, plus interest-based fan-out
//! - [`App`]: owns the three and constructs everything that goes into them
//!
//! ## Rules
//!
//! 1. **Singletons** - registering a second controller for a command, or a
//!    second instance of a model or view type, fails with no side effects
//! 2. **Ordered fan-out** - views receive an event in subscription order
//! 3. **Layering** - models only talk to views
//! 4. **One thread** - registries are `!Sync`; hooks take `&self` and may
//!    re-enter the runtime freely
//!
//! ## Example
//!
//! ```rust
//! use kestrel_mvc::{App, Context, DataBag, Envelope, Model, Sponsor, View};
//! use std::borrow::Cow;
//! use std::cell::Cell;
//!
//! type Event = Envelope<()>;
//!
//! #[derive(Default)]
//! struct Counter { data: DataBag }
//!
//! impl Model<Event> for Counter {
//!     fn data(&self) -> &DataBag { &self.data }
//! }
//!
//! #[derive(Default)]
//! struct Badge { seen: Cell<u32> }
//!
//! impl View<Event> for Badge {
//!     fn event_interests(&self) -> Vec<Cow<'static, str>> { vec!["inc".into()] }
//!
//!     fn handle_event(&self, _event: &Event, _sponsor: &Sponsor, _ctx: &Context<'_, Event>) {
//!         self.seen.set(self.seen.get() + 1);
//!     }
//! }
//!
//! let app = App::<Event>::new();
//! app.register_model::<Counter>(Some(toml::from_str("count = 0").unwrap())).unwrap();
//! let badge = app.register_view::<Badge>(None).unwrap();
//!
//! app.model_context::<Counter>().unwrap().send_event(Envelope::signal("inc"));
//! assert_eq!(badge.seen.get(), 1);
//! ```

#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod app;
pub mod context;
pub mod controller;
pub mod data;
pub mod error;
pub mod model;
pub mod notification;
pub mod view;

pub use app::App;
pub use context::Context;
pub use controller::{Controller, ControllerRegistry};
pub use data::DataBag;
pub use error::{DataError, RegistryError, RegistryResult};
pub use model::{Model, ModelRegistry};
pub use notification::{Envelope, Notification, Sponsor};
pub use view::{Component, View, ViewRegistry};

pub use kestrel_core::{Identity, ObjectPool, PoolError, Poolable, TypeTag};
