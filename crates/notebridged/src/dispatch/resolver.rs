//! Target resolution.
//!
//! Maps a request's kind tag and identifier onto exactly one host handle.
//! Resolution itself never fails: an unknown identifier yields a handle with
//! no object, which the invoker reports when it is used.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::host::{Host, HostObject};

use super::DISPATCH_TARGET;

/// Kind tag the caller names the root API with.
const ROOT_API_TAG: &str = "api";

/// Parsed kind tag of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKind {
    Note,
    Branch,
    Attribute,
    Sql,
    /// Any other tag, including an absent one. Resolves to the root API.
    Other(String),
}

impl ObjectKind {
    /// Parses a kind tag (case-insensitive, trimmed). Never fails.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "note" => Self::Note,
            "branch" => Self::Branch,
            "attribute" => Self::Attribute,
            "sql" => Self::Sql,
            _ => Self::Other(trimmed.to_owned()),
        }
    }
}

/// Kind of the handle a request resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    RootApi,
    Note,
    Branch,
    Attribute,
    SqlFacade,
}

impl HandleKind {
    /// Returns the canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RootApi => "api",
            Self::Note => "note",
            Self::Branch => "branch",
            Self::Attribute => "attribute",
            Self::SqlFacade => "sql",
        }
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// The object a request targets.
#[derive(Clone)]
pub struct TargetHandle {
    kind: HandleKind,
    id: Option<String>,
    object: Option<Arc<dyn HostObject>>,
}

impl TargetHandle {
    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The host object, absent when the identifier did not resolve.
    pub fn object(&self) -> Option<&Arc<dyn HostObject>> {
        self.object.as_ref()
    }
}

impl fmt::Debug for TargetHandle {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TargetHandle")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("resolved", &self.object.is_some())
            .finish()
    }
}

/// Resolves requests to host handles.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjectResolver;

impl ObjectResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolves `kind` and `id` against `host`.
    pub fn resolve(&self, host: &dyn Host, kind: &ObjectKind, id: Option<&str>) -> TargetHandle {
        let located = |kind: HandleKind, object: Option<Arc<dyn HostObject>>| TargetHandle {
            kind,
            id: id.map(str::to_owned),
            object,
        };

        match kind {
            ObjectKind::Note => located(HandleKind::Note, id.and_then(|id| host.note(id))),
            ObjectKind::Branch => located(HandleKind::Branch, id.and_then(|id| host.branch(id))),
            ObjectKind::Attribute => {
                located(HandleKind::Attribute, id.and_then(|id| host.attribute(id)))
            }
            ObjectKind::Sql => TargetHandle {
                kind: HandleKind::SqlFacade,
                id: None,
                object: Some(host.sql()),
            },
            ObjectKind::Other(raw) => {
                if raw == ROOT_API_TAG {
                    debug!(target: DISPATCH_TARGET, "resolved root api");
                } else {
                    warn!(
                        target: DISPATCH_TARGET,
                        object_kind = raw.as_str(),
                        "unrecognised object kind, falling back to root api"
                    );
                }
                TargetHandle {
                    kind: HandleKind::RootApi,
                    id: None,
                    object: Some(host.api()),
                }
            }
        }
    }
}
