//! JSONL request dispatch.
//!
//! Each connection carries one request line naming a target object, a member,
//! and positional arguments:
//!
//! ```json
//! {"token":"s3cret","objectKind":"note","objectId":"abc123","methodName":"getContent","args":[]}
//! ```
//!
//! The daemon answers with one line holding an HTTP-style status and body:
//!
//! ```json
//! {"status":201,"body":"\"<p>Buy milk</p>\""}
//! ```
//!
//! ## Pipeline
//!
//! Requests are authenticated by [`TokenGate`], resolved to a host handle by
//! [`ObjectResolver`], invoked through the per-kind [`MemberCatalogue`] by
//! [`Invoker`], and encoded under a [`SerializationPolicy`]. Failures at any
//! stage become a [`DispatchError`] whose status decides the response.
//!
//! | outcome | status | body |
//! |---|---|---|
//! | success | 201 | JSON text |
//! | absent result | 400 | none |
//! | malformed request, unsupported member, invalid arguments | 400 | error text |
//! | token mismatch | 401 | none |
//! | host failure, missing target, serialization failure | 500 | error text |

mod auth;
mod catalogue;
mod dispatcher;
mod errors;
mod handler;
mod invoker;
mod request;
mod resolver;
mod response;
mod serializer;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

pub use self::auth::TokenGate;
pub use self::catalogue::{Member, MemberCatalogue, MemberShape, Param, ParamType};
pub use self::dispatcher::RequestDispatcher;
pub use self::errors::DispatchError;
pub use self::handler::DispatchConnectionHandler;
pub use self::invoker::{InvocationResult, Invoker};
pub use self::request::BridgeRequest;
pub use self::resolver::{HandleKind, ObjectKind, ObjectResolver, TargetHandle};
pub use self::response::{BridgeResponse, ResponseWriter};
pub use self::serializer::{DEFAULT_OMITTED_KEYS, SerializationPolicy};
