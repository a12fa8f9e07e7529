//! # Model Registry
//!
//! Maps a model type to its single live instance. Models are passive data
//! holders: they can notify views, but never address controllers.

use crate::app::App;
use crate::context::Context;
use crate::data::DataBag;
use crate::error::{RegistryError, RegistryResult};
use crate::notification::{Notification, Sponsor};
use kestrel_core::{Identity, TypeTag};
use std::any::Any;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use toml::Table;

/// A registered data holder.
pub trait Model<E: Notification>: 'static {
    /// The model's key/value store. Initial registration data is copied here.
    fn data(&self) -> &DataBag;

    /// Called once, after the initial data is copied and the model is inserted.
    fn on_register(&self, _ctx: &Context<'_, E>) {}

    /// Called once, right before the model is removed from the registry.
    fn on_remove(&self, _ctx: &Context<'_, E>) {}
}

struct ModelEntry<E: Notification> {
    tag: TypeTag,
    identity: Identity,
    model: Rc<dyn Model<E>>,
    any: Rc<dyn Any>,
}

impl<E: Notification> ModelEntry<E> {
    fn sponsor(&self) -> Sponsor {
        Sponsor::Model {
            tag: self.tag,
            identity: self.identity,
        }
    }
}

/// Model type -> model instance.
pub struct ModelRegistry<E: Notification> {
    entries: RefCell<HashMap<TypeTag, ModelEntry<E>>>,
    removing: RefCell<HashSet<TypeTag>>,
}

impl<E: Notification> ModelRegistry<E> {
    pub(crate) fn new() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            removing: RefCell::new(HashSet::new()),
        }
    }

    /// Builds an `M`, copies `initial` into its data bag, registers it and
    /// runs `on_register`.
    pub(crate) fn register<M, F>(
        &self,
        app: &App<E>,
        factory: F,
        initial: Option<Table>,
    ) -> RegistryResult<Rc<M>>
    where
        M: Model<E>,
        F: FnOnce() -> M,
    {
        let tag = TypeTag::of::<M>();
        self.ensure_vacant(tag)?;
        let model = Rc::new(factory());
        self.ensure_vacant(tag)?;

        if let Some(initial) = initial {
            model.data().merge(initial);
        }

        let entry = ModelEntry {
            tag,
            identity: Identity::next(),
            model: Rc::clone(&model) as Rc<dyn Model<E>>,
            any: Rc::clone(&model) as Rc<dyn Any>,
        };
        let sponsor = entry.sponsor();
        self.entries.borrow_mut().insert(tag, entry);
        tracing::debug!(model = tag.short_name(), keys = model.data().len(), "model registered");

        model.on_register(&Context::new(app, sponsor));
        Ok(model)
    }

    /// Runs `on_remove` on the model of type `tag`, then unregisters it.
    ///
    /// A nested removal of the same model, reached from its own hook, is a
    /// no-op returning `false`.
    pub(crate) fn remove_tag(&self, app: &App<E>, tag: TypeTag) -> bool {
        let target = self
            .entries
            .borrow()
            .get(&tag)
            .map(|entry| (Rc::clone(&entry.model), entry.sponsor()));
        let Some((model, own)) = target else {
            return false;
        };
        if !self.removing.borrow_mut().insert(tag) {
            return false;
        }
        let identity = own.identity();

        model.on_remove(&Context::new(app, own));

        let mut entries = self.entries.borrow_mut();
        if entries.get(&tag).map(|entry| entry.identity) == identity {
            entries.remove(&tag);
        }
        drop(entries);
        self.removing.borrow_mut().remove(&tag);
        tracing::debug!(model = tag.short_name(), "model removed");
        true
    }

    /// Returns the live `M`, if registered.
    #[must_use]
    pub fn retrieve<M: Model<E>>(&self) -> Option<Rc<M>> {
        let any = Rc::clone(&self.entries.borrow().get(&TypeTag::of::<M>())?.any);
        any.downcast::<M>().ok()
    }

    /// Checks if an `M` is registered.
    #[must_use]
    pub fn contains<M: Model<E>>(&self) -> bool {
        self.entries.borrow().contains_key(&TypeTag::of::<M>())
    }

    /// Sponsor value the `M` instance sends as.
    #[must_use]
    pub fn sponsor_of<M: Model<E>>(&self) -> Option<Sponsor> {
        self.entries
            .borrow()
            .get(&TypeTag::of::<M>())
            .map(ModelEntry::sponsor)
    }

    /// Tags of every registered model type.
    #[must_use]
    pub fn tags(&self) -> Vec<TypeTag> {
        self.entries.borrow().keys().copied().collect()
    }

    /// Number of registered models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Checks if no model is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn ensure_vacant(&self, tag: TypeTag) -> RegistryResult<()> {
        if self.entries.borrow().contains_key(&tag) {
            tracing::warn!(model = tag.short_name(), "rejected duplicate model registration");
            return Err(RegistryError::DuplicateModel { model: tag.name() });
        }
        Ok(())
    }
}
