//! # View Registry
//!
//! Maps a view type to its single live instance and keeps, for every event
//! kind, the ordered list of views interested in it.
//!
//! ## Fan-out
//!
//! `notify` delivers to subscribers in the order they subscribed. The list is
//! copied before delivery starts, so a handler that registers or removes
//! views (directly or through a nested send) never causes a subscriber of the
//! in-flight event to be skipped or called twice.

use crate::app::App;
use crate::context::Context;
use crate::error::{RegistryError, RegistryResult};
use crate::notification::{Notification, Sponsor};
use kestrel_core::{Identity, TypeTag};
use std::any::Any;
use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Opaque handle to the external UI component a view drives.
pub type Component = Rc<dyn Any>;

/// A registered event consumer.
pub trait View<E: Notification>: 'static {
    /// Event kinds this view wants. Queried once, at registration, and again
    /// only on an explicit [`App::refresh_interests`].
    fn event_interests(&self) -> Vec<Cow<'static, str>>;

    /// Handles one event of a kind this view is interested in. `sponsor` is
    /// whoever sent it; `ctx` sends as this view.
    fn handle_event(&self, event: &E, sponsor: &Sponsor, ctx: &Context<'_, E>);

    /// Called once, right after the view is inserted and subscribed.
    fn on_register(&self, _ctx: &Context<'_, E>) {}

    /// Called once, right before the view is unsubscribed and removed.
    fn on_remove(&self, _ctx: &Context<'_, E>) {}
}

struct ViewEntry<E: Notification> {
    identity: Identity,
    view: Rc<dyn View<E>>,
    any: Rc<dyn Any>,
    component: Option<Component>,
    interests: Vec<Rc<str>>,
}

struct ViewTable<E: Notification> {
    entries: HashMap<TypeTag, ViewEntry<E>>,
    /// Event kind -> subscribed view types, in subscription order.
    subscribers: HashMap<Rc<str>, Vec<TypeTag>>,
    /// Views whose `on_remove` is currently running.
    removing: HashSet<TypeTag>,
}

impl<E: Notification> ViewTable<E> {
    fn subscribe(&mut self, kind: &Rc<str>, tag: TypeTag) {
        let list = self.subscribers.entry(Rc::clone(kind)).or_default();
        if !list.contains(&tag) {
            list.push(tag);
        }
    }

    fn unsubscribe(&mut self, kind: &str, tag: TypeTag) {
        if let Some(list) = self.subscribers.get_mut(kind) {
            list.retain(|t| *t != tag);
            if list.is_empty() {
                self.subscribers.remove(kind);
            }
        }
    }
}

/// View type -> view instance, plus event kind -> subscribers.
pub struct ViewRegistry<E: Notification> {
    table: RefCell<ViewTable<E>>,
}

impl<E: Notification> ViewRegistry<E> {
    pub(crate) fn new() -> Self {
        Self {
            table: RefCell::new(ViewTable {
                entries: HashMap::new(),
                subscribers: HashMap::new(),
                removing: HashSet::new(),
            }),
        }
    }

    /// Builds a `V`, records its interests, subscribes it and runs
    /// `on_register`.
    pub(crate) fn register<V, F>(
        &self,
        app: &App<E>,
        factory: F,
        component: Option<Component>,
    ) -> RegistryResult<Rc<V>>
    where
        V: View<E>,
        F: FnOnce() -> V,
    {
        let tag = TypeTag::of::<V>();
        self.ensure_vacant(tag)?;
        let view = Rc::new(factory());
        let interests = dedup_interests(view.event_interests());
        self.ensure_vacant(tag)?;

        let identity = Identity::next();
        {
            let mut table = self.table.borrow_mut();
            for kind in &interests {
                table.subscribe(kind, tag);
            }
            table.entries.insert(
                tag,
                ViewEntry {
                    identity,
                    view: Rc::clone(&view) as Rc<dyn View<E>>,
                    any: Rc::clone(&view) as Rc<dyn Any>,
                    component,
                    interests,
                },
            );
        }
        tracing::debug!(view = tag.short_name(), %identity, "view registered");

        view.on_register(&Context::new(app, Sponsor::View { tag, identity }));
        Ok(view)
    }

    /// Runs `on_remove`, then drops the view's component and interests,
    /// unsubscribes it from every kind and unregisters it. Returns `false`
    /// if there is no such view or its removal is already underway.
    pub(crate) fn remove_tag(&self, app: &App<E>, tag: TypeTag) -> bool {
        let target = self
            .table
            .borrow()
            .entries
            .get(&tag)
            .map(|entry| (Rc::clone(&entry.view), entry.identity));
        let Some((view, identity)) = target else {
            return false;
        };
        if !self.table.borrow_mut().removing.insert(tag) {
            return false;
        }

        view.on_remove(&Context::new(app, Sponsor::View { tag, identity }));

        let mut table = self.table.borrow_mut();
        table.removing.remove(&tag);
        let still_same = table.entries.get(&tag).map(|entry| entry.identity) == Some(identity);
        if still_same {
            if let Some(mut entry) = table.entries.remove(&tag) {
                entry.component = None;
                for kind in std::mem::take(&mut entry.interests) {
                    table.unsubscribe(&kind, tag);
                }
            }
        }
        drop(table);
        tracing::debug!(view = tag.short_name(), "view removed");
        true
    }

    /// Delivers `event` to every view subscribed to its kind, in
    /// subscription order. Returns how many views received it.
    pub(crate) fn notify(&self, app: &App<E>, event: &E, sponsor: &Sponsor) -> usize {
        let snapshot: Vec<(Rc<dyn View<E>>, Sponsor)> = {
            let table = self.table.borrow();
            let Some(tags) = table.subscribers.get(event.kind()) else {
                return 0;
            };
            tags.iter()
                .filter_map(|tag| {
                    let entry = table.entries.get(tag)?;
                    let own = Sponsor::View {
                        tag: *tag,
                        identity: entry.identity,
                    };
                    Some((Rc::clone(&entry.view), own))
                })
                .collect()
        };

        tracing::trace!(kind = event.kind(), %sponsor, subscribers = snapshot.len(), "notify");
        for (view, own) in &snapshot {
            view.handle_event(event, sponsor, &Context::new(app, own.clone()));
        }
        snapshot.len()
    }

    /// Queries the interests of the live `V` again and updates its
    /// subscriptions. Kinds it keeps retain their position in the fan-out
    /// order; new kinds append it at the end.
    pub(crate) fn refresh_tag(&self, tag: TypeTag) -> bool {
        let Some(view) = self
            .table
            .borrow()
            .entries
            .get(&tag)
            .map(|entry| Rc::clone(&entry.view))
        else {
            return false;
        };
        let fresh = dedup_interests(view.event_interests());

        let mut table = self.table.borrow_mut();
        let Some(entry) = table.entries.get_mut(&tag) else {
            return false;
        };
        let stale = std::mem::replace(&mut entry.interests, fresh.clone());
        for kind in &stale {
            if !fresh.contains(kind) {
                table.unsubscribe(kind, tag);
            }
        }
        for kind in &fresh {
            table.subscribe(kind, tag);
        }
        tracing::debug!(view = tag.short_name(), interests = fresh.len(), "view interests refreshed");
        true
    }

    /// Returns the live `V`, if registered.
    #[must_use]
    pub fn retrieve<V: View<E>>(&self) -> Option<Rc<V>> {
        let any = Rc::clone(&self.table.borrow().entries.get(&TypeTag::of::<V>())?.any);
        any.downcast::<V>().ok()
    }

    /// Returns the component `V` was registered with, if it is a `C`.
    #[must_use]
    pub fn component<V: View<E>, C: 'static>(&self) -> Option<Rc<C>> {
        let component = self
            .table
            .borrow()
            .entries
            .get(&TypeTag::of::<V>())?
            .component
            .clone()?;
        component.downcast::<C>().ok()
    }

    /// Event kinds the live `V` is subscribed to, as recorded.
    #[must_use]
    pub fn interests<V: View<E>>(&self) -> Vec<Rc<str>> {
        self.table
            .borrow()
            .entries
            .get(&TypeTag::of::<V>())
            .map(|entry| entry.interests.clone())
            .unwrap_or_default()
    }

    /// View types subscribed to `kind`, in fan-out order.
    #[must_use]
    pub fn subscribers(&self, kind: &str) -> Vec<TypeTag> {
        self.table
            .borrow()
            .subscribers
            .get(kind)
            .cloned()
            .unwrap_or_default()
    }

    /// Checks if a `V` is registered.
    #[must_use]
    pub fn contains<V: View<E>>(&self) -> bool {
        self.table.borrow().entries.contains_key(&TypeTag::of::<V>())
    }

    /// Sponsor value the `V` instance sends as.
    #[must_use]
    pub fn sponsor_of<V: View<E>>(&self) -> Option<Sponsor> {
        let tag = TypeTag::of::<V>();
        let identity = self.table.borrow().entries.get(&tag)?.identity;
        Some(Sponsor::View { tag, identity })
    }

    /// Tags of every registered view type.
    #[must_use]
    pub fn tags(&self) -> Vec<TypeTag> {
        self.table.borrow().entries.keys().copied().collect()
    }

    /// Number of registered views.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.borrow().entries.len()
    }

    /// Checks if no view is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.borrow().entries.is_empty()
    }

    fn ensure_vacant(&self, tag: TypeTag) -> RegistryResult<()> {
        if self.table.borrow().entries.contains_key(&tag) {
            tracing::warn!(view = tag.short_name(), "rejected duplicate view registration");
            return Err(RegistryError::DuplicateView { view: tag.name() });
        }
        Ok(())
    }
}

/// Drops repeated kinds, keeping first occurrences in order.
fn dedup_interests(kinds: Vec<Cow<'static, str>>) -> Vec<Rc<str>> {
    let mut out: Vec<Rc<str>> = Vec::with_capacity(kinds.len());
    for kind in kinds {
        if !out.iter().any(|k| **k == *kind) {
            out.push(Rc::from(kind.as_ref()));
        }
    }
    out
}
