//! Collaborator interfaces onto the host application's object graph.
//!
//! The dispatcher never owns host objects. It asks a [`Host`] for handles and
//! invokes members on them through [`HostObject`]; whatever the host does in
//! response (edit a note, run a query) is opaque to the bridge.

pub mod memory;

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

/// Entry points into the host's object graph.
pub trait Host: Send + Sync {
    /// Value of the named label on the host's current context, if set.
    fn label_value(&self, name: &str) -> Option<String>;

    /// The root scripting API.
    fn api(&self) -> Arc<dyn HostObject>;

    /// Note with the given identifier.
    fn note(&self, id: &str) -> Option<Arc<dyn HostObject>>;

    /// Branch with the given identifier.
    fn branch(&self, id: &str) -> Option<Arc<dyn HostObject>>;

    /// Attribute with the given identifier.
    fn attribute(&self, id: &str) -> Option<Arc<dyn HostObject>>;

    /// The SQL façade.
    fn sql(&self) -> Arc<dyn HostObject>;
}

impl<T> Host for Arc<T>
where
    T: Host + ?Sized,
{
    fn label_value(&self, name: &str) -> Option<String> {
        (**self).label_value(name)
    }

    fn api(&self) -> Arc<dyn HostObject> {
        (**self).api()
    }

    fn note(&self, id: &str) -> Option<Arc<dyn HostObject>> {
        (**self).note(id)
    }

    fn branch(&self, id: &str) -> Option<Arc<dyn HostObject>> {
        (**self).branch(id)
    }

    fn attribute(&self, id: &str) -> Option<Arc<dyn HostObject>> {
        (**self).attribute(id)
    }

    fn sql(&self) -> Arc<dyn HostObject> {
        (**self).sql()
    }
}

/// A single addressable object inside the host.
///
/// Both operations return `Value::Null` to signal an absent result.
pub trait HostObject: Send + Sync {
    /// Reads a property.
    fn read(&self, property: &str) -> Result<Value, HostError>;

    /// Calls a method with positional arguments.
    fn call(&self, method: &str, args: &[Value]) -> Result<Value, HostError>;
}

/// Failure raised by the host while reading or calling a member.
///
/// The message is relayed verbatim to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HostError {
    message: String,
}

impl HostError {
    /// Creates a host error carrying the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure text.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}
