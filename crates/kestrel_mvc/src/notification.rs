//! # Notifications
//!
//! The runtime is generic over the application's event type. Anything that
//! can name its kind is routable: the kind selects the controller command and
//! the view subscribers.
//!
//! Two styles work out of the box:
//!
//! ```rust
//! use kestrel_mvc::{Envelope, Notification};
//!
//! // A closed set of events with typed payloads.
//! enum ShopEvent {
//!     AddToCart { sku: u32 },
//!     Checkout,
//! }
//!
//! impl Notification for ShopEvent {
//!     fn kind(&self) -> &str {
//!         match self {
//!             Self::AddToCart { .. } => "add_to_cart",
//!             Self::Checkout => "checkout",
//!         }
//!     }
//! }
//!
//! // An open, string-keyed event carrying one payload type.
//! let event = Envelope::new("resize", (800_u32, 600_u32));
//! assert_eq!(event.kind(), "resize");
//! assert_eq!(*event.payload(), (800, 600));
//! ```

use kestrel_core::{Identity, TypeTag};
use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

/// An event routable by the registries.
pub trait Notification: 'static {
    /// The event kind: the controller command and the view interest it targets.
    fn kind(&self) -> &str;
}

/// A string-keyed event with a typed payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope<P = ()> {
    kind: Cow<'static, str>,
    payload: P,
}

impl<P> Envelope<P> {
    /// Creates an event of `kind` carrying `payload`.
    pub fn new(kind: impl Into<Cow<'static, str>>, payload: P) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// Returns the payload.
    #[must_use]
    pub const fn payload(&self) -> &P {
        &self.payload
    }

    /// Consumes the envelope, returning the payload.
    pub fn into_payload(self) -> P {
        self.payload
    }
}

impl Envelope<()> {
    /// Creates an event that carries nothing but its kind.
    pub fn signal(kind: impl Into<Cow<'static, str>>) -> Self {
        Self::new(kind, ())
    }
}

impl<P: 'static> Notification for Envelope<P> {
    fn kind(&self) -> &str {
        &self.kind
    }
}

/// Who sent an event. Carried for tracing only, never used for routing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sponsor {
    /// A registered controller.
    Controller {
        /// Command it is registered under.
        command: Rc<str>,
        /// Registration identity.
        identity: Identity,
    },
    /// A registered model.
    Model {
        /// Model type.
        tag: TypeTag,
        /// Registration identity.
        identity: Identity,
    },
    /// A registered view.
    View {
        /// View type.
        tag: TypeTag,
        /// Registration identity.
        identity: Identity,
    },
    /// Code outside the registries (the host event loop, tests).
    External,
}

impl Sponsor {
    /// Registration identity, if the sponsor is a registered entity.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        match self {
            Self::Controller { identity, .. }
            | Self::Model { identity, .. }
            | Self::View { identity, .. } => Some(*identity),
            Self::External => None,
        }
    }

    /// Checks if the sponsor is the controller registered under `command`.
    #[must_use]
    pub fn is_controller(&self, command: &str) -> bool {
        matches!(self, Self::Controller { command: c, .. } if &**c == command)
    }

    /// Checks if the sponsor is the model of type `M`.
    #[must_use]
    pub fn is_model<M: 'static>(&self) -> bool {
        matches!(self, Self::Model { tag, .. } if *tag == TypeTag::of::<M>())
    }

    /// Checks if the sponsor is the view of type `V`.
    #[must_use]
    pub fn is_view<V: 'static>(&self) -> bool {
        matches!(self, Self::View { tag, .. } if *tag == TypeTag::of::<V>())
    }
}

impl fmt::Display for Sponsor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Controller { command, identity } => write!(f, "controller `{command}` {identity}"),
            Self::Model { tag, identity } => write!(f, "model {} {identity}", tag.short_name()),
            Self::View { tag, identity } => write!(f, "view {} {identity}", tag.short_name()),
            Self::External => f.write_str("external"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Header;

    #[test]
    fn test_envelope_kind_and_payload() {
        let event = Envelope::new(String::from("save"), vec![1, 2, 3]);
        assert_eq!(event.kind(), "save");
        assert_eq!(event.into_payload(), vec![1, 2, 3]);
        assert_eq!(Envelope::signal("ping").kind(), "ping");
    }

    #[test]
    fn test_sponsor_predicates() {
        let controller = Sponsor::Controller {
            command: Rc::from("save"),
            identity: Identity::next(),
        };
        assert!(controller.is_controller("save"));
        assert!(!controller.is_controller("load"));
        assert!(controller.identity().is_some());

        let view = Sponsor::View {
            tag: TypeTag::of::<Header>(),
            identity: Identity::next(),
        };
        assert!(view.is_view::<Header>());
        assert!(!view.is_model::<Header>());
        assert!(view.to_string().starts_with("view Header #"));

        assert_eq!(Sponsor::External.identity(), None);
    }
}
