//! # App
//!
//! Composition root. Owns the three registries and is the only way to put
//! controllers, models and views into them.
//!
//! ```text
//!   Controller ──send_event──> views ──> controller[kind]
//!   View       ──send_event──> controller[kind] ──> views
//!   Model      ──send_event──> views
//! ```

use crate::context::Context;
use crate::controller::{Controller, ControllerRegistry};
use crate::error::RegistryResult;
use crate::model::{Model, ModelRegistry};
use crate::notification::{Notification, Sponsor};
use crate::view::{Component, View, ViewRegistry};
use kestrel_core::TypeTag;
use std::rc::Rc;
use toml::Table;

/// The runtime: controller, model and view registries for events of type `E`.
///
/// Independent `App`s share nothing, which keeps tests isolated.
///
/// # Example
///
/// ```rust
/// use kestrel_mvc::{App, Context, Controller, Envelope, Sponsor};
/// use std::cell::Cell;
///
/// type Event = Envelope<u32>;
///
/// #[derive(Default)]
/// struct Save { calls: Cell<u32> }
///
/// impl Controller<Event> for Save {
///     fn execute(&self, event: &Event, _sponsor: &Sponsor, _ctx: &Context<'_, Event>) {
///         self.calls.set(self.calls.get() + event.payload());
///     }
/// }
///
/// let app = App::<Event>::new();
/// let save = app.register_controller::<Save>("save").unwrap();
///
/// app.send_external(Envelope::new("save", 2));
/// assert_eq!(save.calls.get(), 2);
///
/// assert!(app.register_controller::<Save>("save").is_err());
/// ```
pub struct App<E: Notification> {
    controllers: ControllerRegistry<E>,
    models: ModelRegistry<E>,
    views: ViewRegistry<E>,
}

impl<E: Notification> App<E> {
    /// Creates a runtime with empty registries.
    #[must_use]
    pub fn new() -> Self {
        Self {
            controllers: ControllerRegistry::new(),
            models: ModelRegistry::new(),
            views: ViewRegistry::new(),
        }
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Constructs a `C` and registers it under `command`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateCommand`](crate::RegistryError::DuplicateCommand)
    /// if `command` already has a controller. Nothing is constructed then.
    pub fn register_controller<C: Controller<E> + Default>(
        &self,
        command: impl Into<Rc<str>>,
    ) -> RegistryResult<Rc<C>> {
        self.controllers.register(self, command.into(), C::default)
    }

    /// Like [`register_controller`](Self::register_controller), building the
    /// controller with `factory`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateCommand`](crate::RegistryError::DuplicateCommand)
    /// if `command` already has a controller.
    pub fn register_controller_with<C, F>(
        &self,
        command: impl Into<Rc<str>>,
        factory: F,
    ) -> RegistryResult<Rc<C>>
    where
        C: Controller<E>,
        F: FnOnce() -> C,
    {
        self.controllers.register(self, command.into(), factory)
    }

    /// Constructs an `M`, seeds its data bag with `data` and registers it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateModel`](crate::RegistryError::DuplicateModel)
    /// if an `M` is already registered.
    pub fn register_model<M: Model<E> + Default>(&self, data: Option<Table>) -> RegistryResult<Rc<M>> {
        self.models.register(self, M::default, data)
    }

    /// Like [`register_model`](Self::register_model), building the model with
    /// `factory`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateModel`](crate::RegistryError::DuplicateModel)
    /// if an `M` is already registered.
    pub fn register_model_with<M, F>(&self, factory: F, data: Option<Table>) -> RegistryResult<Rc<M>>
    where
        M: Model<E>,
        F: FnOnce() -> M,
    {
        self.models.register(self, factory, data)
    }

    /// Constructs a `V` driving `component` and registers it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateView`](crate::RegistryError::DuplicateView)
    /// if a `V` is already registered.
    pub fn register_view<V: View<E> + Default>(
        &self,
        component: Option<Component>,
    ) -> RegistryResult<Rc<V>> {
        self.views.register(self, V::default, component)
    }

    /// Like [`register_view`](Self::register_view), building the view with
    /// `factory`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateView`](crate::RegistryError::DuplicateView)
    /// if a `V` is already registered.
    pub fn register_view_with<V, F>(&self, factory: F, component: Option<Component>) -> RegistryResult<Rc<V>>
    where
        V: View<E>,
        F: FnOnce() -> V,
    {
        self.views.register(self, factory, component)
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Removes the controller under `command`. Returns `false` if there is none.
    pub fn remove_controller(&self, command: &str) -> bool {
        self.controllers.remove(self, command)
    }

    /// Removes the live `M`. Returns `false` if there is none.
    pub fn remove_model<M: Model<E>>(&self) -> bool {
        self.models.remove_tag(self, TypeTag::of::<M>())
    }

    /// Removes the live `V`. Returns `false` if there is none.
    pub fn remove_view<V: View<E>>(&self) -> bool {
        self.views.remove_tag(self, TypeTag::of::<V>())
    }

    /// Removes every view, then every model, then every controller, running
    /// each removal hook once.
    pub fn reset(&self) {
        for tag in self.views.tags() {
            self.views.remove_tag(self, tag);
        }
        for tag in self.models.tags() {
            self.models.remove_tag(self, tag);
        }
        for command in self.controllers.commands() {
            self.controllers.remove(self, &command);
        }
        tracing::debug!("app reset");
    }

    // ========================================================================
    // Routing
    // ========================================================================

    /// Runs the controller registered under `event.kind()`, if any.
    /// Returns whether one ran.
    pub fn dispatch(&self, event: &E, sponsor: &Sponsor) -> bool {
        self.controllers.dispatch(self, event, sponsor)
    }

    /// Delivers `event` to every view subscribed to its kind, in
    /// subscription order. Returns how many views received it.
    pub fn notify(&self, event: &E, sponsor: &Sponsor) -> usize {
        self.views.notify(self, event, sponsor)
    }

    /// Sends `event` from outside the registries: views, then controller.
    pub fn send_external(&self, event: E) {
        self.external_context().send_event(event);
    }

    /// Re-queries the live `V`'s interests. Returns `false` if there is none.
    pub fn refresh_interests<V: View<E>>(&self) -> bool {
        self.views.refresh_tag(TypeTag::of::<V>())
    }

    // ========================================================================
    // Contexts
    // ========================================================================

    /// Sending handle for code outside the registries.
    #[must_use]
    pub const fn external_context(&self) -> Context<'_, E> {
        Context::new(self, Sponsor::External)
    }

    /// Sending handle acting as the controller under `command`.
    #[must_use]
    pub fn controller_context(&self, command: &str) -> Option<Context<'_, E>> {
        Some(Context::new(self, self.controllers.sponsor_of(command)?))
    }

    /// Sending handle acting as the live `M`.
    #[must_use]
    pub fn model_context<M: Model<E>>(&self) -> Option<Context<'_, E>> {
        Some(Context::new(self, self.models.sponsor_of::<M>()?))
    }

    /// Sending handle acting as the live `V`.
    #[must_use]
    pub fn view_context<V: View<E>>(&self) -> Option<Context<'_, E>> {
        Some(Context::new(self, self.views.sponsor_of::<V>()?))
    }

    // ========================================================================
    // Registries
    // ========================================================================

    /// The controller registry.
    #[must_use]
    pub const fn controllers(&self) -> &ControllerRegistry<E> {
        &self.controllers
    }

    /// The model registry.
    #[must_use]
    pub const fn models(&self) -> &ModelRegistry<E> {
        &self.models
    }

    /// The view registry.
    #[must_use]
    pub const fn views(&self) -> &ViewRegistry<E> {
        &self.views
    }
}

impl<E: Notification> Default for App<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Notification> std::fmt::Debug for App<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("controllers", &self.controllers.len())
            .field("models", &self.models.len())
            .field("views", &self.views.len())
            .finish()
    }
}
