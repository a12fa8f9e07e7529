//! # Controller Registry
//!
//! Maps a command string to exactly one live controller.
//!
//! ```text
//! UNREGISTERED ──register──> REGISTERED ──remove──> UNREGISTERED
//! ```
//!
//! Registration and removal are atomic with respect to the map: a failed
//! registration leaves no trace, and a command is never half-registered.

use crate::app::App;
use crate::context::Context;
use crate::error::{RegistryError, RegistryResult};
use crate::notification::{Notification, Sponsor};
use kestrel_core::Identity;
use std::any::Any;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Handles the events whose kind equals the command it is registered under.
pub trait Controller<E: Notification>: 'static {
    /// Handles one dispatched event. `sponsor` is whoever sent it; `ctx`
    /// sends as this controller.
    fn execute(&self, event: &E, sponsor: &Sponsor, ctx: &Context<'_, E>);

    /// Called once, right after the controller is inserted into the registry.
    fn on_register(&self, _ctx: &Context<'_, E>) {}

    /// Called once, right before the controller is removed from the registry.
    fn on_remove(&self, _ctx: &Context<'_, E>) {}
}

struct ControllerEntry<E: Notification> {
    command: Rc<str>,
    identity: Identity,
    controller: Rc<dyn Controller<E>>,
    any: Rc<dyn Any>,
}

impl<E: Notification> ControllerEntry<E> {
    fn sponsor(&self) -> Sponsor {
        Sponsor::Controller {
            command: Rc::clone(&self.command),
            identity: self.identity,
        }
    }
}

/// Command string -> controller.
pub struct ControllerRegistry<E: Notification> {
    entries: RefCell<HashMap<Rc<str>, ControllerEntry<E>>>,
    /// Commands whose `on_remove` is currently running.
    removing: RefCell<HashSet<Rc<str>>>,
}

impl<E: Notification> ControllerRegistry<E> {
    pub(crate) fn new() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            removing: RefCell::new(HashSet::new()),
        }
    }

    /// Builds a controller with `factory`, registers it under `command` and
    /// runs its `on_register` hook.
    ///
    /// The factory is not called when the command is taken.
    pub(crate) fn register<C, F>(
        &self,
        app: &App<E>,
        command: Rc<str>,
        factory: F,
    ) -> RegistryResult<Rc<C>>
    where
        C: Controller<E>,
        F: FnOnce() -> C,
    {
        self.ensure_vacant(&command)?;
        let controller = Rc::new(factory());
        // The factory may have registered something itself.
        self.ensure_vacant(&command)?;

        let entry = ControllerEntry {
            command: Rc::clone(&command),
            identity: Identity::next(),
            controller: Rc::clone(&controller) as Rc<dyn Controller<E>>,
            any: Rc::clone(&controller) as Rc<dyn Any>,
        };
        let sponsor = entry.sponsor();
        self.entries.borrow_mut().insert(Rc::clone(&command), entry);
        tracing::debug!(%command, identity = ?sponsor.identity(), "controller registered");

        controller.on_register(&Context::new(app, sponsor));
        Ok(controller)
    }

    /// Runs `execute` on the controller registered under `event.kind()`.
    ///
    /// Returns `false` (and does nothing) when no controller is registered.
    pub(crate) fn dispatch(&self, app: &App<E>, event: &E, sponsor: &Sponsor) -> bool {
        let target = self
            .entries
            .borrow()
            .get(event.kind())
            .map(|entry| (Rc::clone(&entry.controller), entry.sponsor()));
        let Some((controller, own)) = target else {
            return false;
        };

        tracing::trace!(command = event.kind(), %sponsor, "dispatch");
        controller.execute(event, sponsor, &Context::new(app, own));
        true
    }

    /// Runs `on_remove` on the controller under `command`, then unregisters it.
    ///
    /// Returns `false` when the command is not registered, or when its
    /// removal is already in progress further up the stack. The controller is
    /// not disposed; callers that pool controllers do that themselves.
    pub(crate) fn remove(&self, app: &App<E>, command: &str) -> bool {
        let target = self
            .entries
            .borrow()
            .get(command)
            .map(|entry| {
                let controller = Rc::clone(&entry.controller);
                (Rc::clone(&entry.command), controller, entry.sponsor())
            });
        let Some((key, controller, own)) = target else {
            return false;
        };
        if !self.removing.borrow_mut().insert(Rc::clone(&key)) {
            tracing::trace!(command, "controller removal already in progress");
            return false;
        }
        let identity = own.identity();

        controller.on_remove(&Context::new(app, own));

        // The hook may have removed or replaced the entry already.
        let mut entries = self.entries.borrow_mut();
        if entries.get(command).map(|entry| entry.identity) == identity {
            entries.remove(command);
        }
        drop(entries);
        self.removing.borrow_mut().remove(&key);
        tracing::debug!(command, "controller removed");
        true
    }

    /// Returns the controller under `command` if it is a `C`.
    #[must_use]
    pub fn retrieve<C: Controller<E>>(&self, command: &str) -> Option<Rc<C>> {
        let any = Rc::clone(&self.entries.borrow().get(command)?.any);
        any.downcast::<C>().ok()
    }

    /// Checks if a controller is registered under `command`.
    #[must_use]
    pub fn has_command(&self, command: &str) -> bool {
        self.entries.borrow().contains_key(command)
    }

    /// Registered commands, in no particular order.
    #[must_use]
    pub fn commands(&self) -> Vec<Rc<str>> {
        self.entries.borrow().keys().cloned().collect()
    }

    /// Sponsor value the controller under `command` sends as.
    #[must_use]
    pub fn sponsor_of(&self, command: &str) -> Option<Sponsor> {
        self.entries.borrow().get(command).map(ControllerEntry::sponsor)
    }

    /// Number of registered controllers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Checks if no controller is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn ensure_vacant(&self, command: &Rc<str>) -> RegistryResult<()> {
        if self.entries.borrow().contains_key(command) {
            tracing::warn!(%command, "rejected duplicate controller registration");
            return Err(RegistryError::DuplicateCommand {
                command: command.to_string(),
            });
        }
        Ok(())
    }
}
