//! # Registry Error Types
//!
//! All errors the registries and model data bags can raise.

use thiserror::Error;

/// Errors raised when registering a controller, model or view.
///
/// Each one means the registry already holds a live entry for the key. The
/// failed call has no side effects: nothing is constructed, inserted or
/// notified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A controller is already registered under this command.
    #[error("command `{command}` already has a controller")]
    DuplicateCommand {
        /// The contested command.
        command: String,
    },

    /// An instance of this model type is already registered.
    #[error("model {model} is already registered")]
    DuplicateModel {
        /// Model type name.
        model: &'static str,
    },

    /// An instance of this view type is already registered.
    #[error("view {view} is already registered")]
    DuplicateView {
        /// View type name.
        view: &'static str,
    },
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors raised by [`DataBag`](crate::DataBag) writes.
#[derive(Error, Debug)]
pub enum DataError {
    /// The value cannot be represented in the bag.
    #[error("cannot store `{key}` in data bag: {source}")]
    Unrepresentable {
        /// Key being written.
        key: String,
        /// Serializer error.
        #[source]
        source: toml::ser::Error,
    },
}
