//! # Send Context
//!
//! Every hook receives a [`Context`] naming the entity it runs on. Sending
//! through it routes the event according to that entity's role:
//!
//! | Sender     | `send_event`                   | `send_event_strict` |
//! |------------|--------------------------------|---------------------|
//! | Controller | views, then controller         | views               |
//! | View       | controller, then views         | views               |
//! | Model      | views                          | views               |
//! | External   | views, then controller         | views               |
//!
//! Models never address controllers. There is no reentrancy guard: a handler
//! that sends during fan-out re-enters the registries before the outer send
//! returns.

use crate::app::App;
use crate::notification::{Notification, Sponsor};

/// Sending handle bound to one registered entity (or to the outside world).
pub struct Context<'a, E: Notification> {
    app: &'a App<E>,
    sponsor: Sponsor,
}

impl<'a, E: Notification> Context<'a, E> {
    pub(crate) const fn new(app: &'a App<E>, sponsor: Sponsor) -> Self {
        Self { app, sponsor }
    }

    /// The runtime the entity lives in.
    #[must_use]
    pub const fn app(&self) -> &'a App<E> {
        self.app
    }

    /// The entity this context sends as.
    #[must_use]
    pub const fn sponsor(&self) -> &Sponsor {
        &self.sponsor
    }

    /// Fans `event` out to views and, except from models, to the controller
    /// registered under its kind.
    pub fn send_event(&self, event: E) {
        self.send(&event, false);
    }

    /// Fans `event` out to views only.
    pub fn send_event_strict(&self, event: E) {
        self.send(&event, true);
    }

    fn send(&self, event: &E, strict: bool) {
        tracing::trace!(kind = event.kind(), sponsor = %self.sponsor, strict, "send");
        match self.sponsor {
            Sponsor::View { .. } => {
                if !strict {
                    self.app.dispatch(event, &self.sponsor);
                }
                self.app.notify(event, &self.sponsor);
            }
            Sponsor::Model { .. } => {
                self.app.notify(event, &self.sponsor);
            }
            Sponsor::Controller { .. } | Sponsor::External => {
                self.app.notify(event, &self.sponsor);
                if !strict {
                    self.app.dispatch(event, &self.sponsor);
                }
            }
        }
    }
}

impl<E: Notification> std::fmt::Debug for Context<'_, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context").field("sponsor", &self.sponsor).finish_non_exhaustive()
    }
}
