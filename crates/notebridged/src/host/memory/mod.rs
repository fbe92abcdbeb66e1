//! In-memory reference host.
//!
//! Holds a small note graph so the daemon can serve requests without an
//! embedding application. Notes carry `parents` and `children` arrays in their
//! JSON form, mirroring the back-references a real note tree exposes.

mod args;
mod calendar;
mod graph;
mod objects;

use std::fs;
use std::sync::{Arc, RwLock};

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use self::graph::{AttributeFilter, NoteGraph};
use self::objects::{
    ApiObject, AttributeObject, BranchObject, DetachedSql, NoteObject, SharedGraph,
};
use super::{Host, HostObject};

pub use self::graph::{
    AttributeRecord, BranchRecord, HostSnapshot, NoteRecord, NoteRevisionRecord,
};

/// Errors raised while loading a host snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot file could not be read.
    #[error("failed to read host snapshot '{path}': {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The snapshot file was not a valid snapshot document.
    #[error("failed to parse host snapshot '{path}': {source}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Host backed by an in-memory note graph.
#[derive(Clone)]
pub struct MemoryHost {
    graph: SharedGraph,
    context_note: String,
}

impl MemoryHost {
    /// Builds a host over the given snapshot with `context_note` as the
    /// current context.
    #[must_use]
    pub fn from_snapshot(snapshot: HostSnapshot, context_note: impl Into<String>) -> Self {
        Self {
            graph: Arc::new(RwLock::new(NoteGraph::from_snapshot(snapshot))),
            context_note: context_note.into(),
        }
    }

    /// Builds a host holding only the root note.
    #[must_use]
    pub fn with_root(context_note: impl Into<String>) -> Self {
        Self::from_snapshot(HostSnapshot::with_root(), context_note)
    }

    /// Loads a JSON snapshot from disk.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] when the file cannot be read or parsed.
    pub fn load(path: &Utf8Path, context_note: impl Into<String>) -> Result<Self, SnapshotError> {
        let text = fs::read_to_string(path).map_err(|source| SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot: HostSnapshot =
            serde_json::from_str(&text).map_err(|source| SnapshotError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_snapshot(snapshot, context_note))
    }

    /// Identifier of the note acting as the current context.
    #[must_use]
    pub fn context_note(&self) -> &str {
        &self.context_note
    }
}

impl Host for MemoryHost {
    fn label_value(&self, name: &str) -> Option<String> {
        let graph = self.graph.read().ok()?;
        let filter = AttributeFilter {
            attribute_type: Some("label"),
            name: Some(name),
            value: None,
        };
        graph
            .attributes_of(&self.context_note, filter)
            .next()
            .map(|label| label.value.clone())
    }

    fn api(&self) -> Arc<dyn HostObject> {
        Arc::new(ApiObject::new(
            Arc::clone(&self.graph),
            self.context_note.clone(),
        ))
    }

    fn note(&self, id: &str) -> Option<Arc<dyn HostObject>> {
        let graph = self.graph.read().ok()?;
        graph.note(id)?;
        Some(Arc::new(NoteObject::new(Arc::clone(&self.graph), id.to_owned())))
    }

    fn branch(&self, id: &str) -> Option<Arc<dyn HostObject>> {
        let graph = self.graph.read().ok()?;
        graph.branch(id)?;
        Some(Arc::new(BranchObject::new(
            Arc::clone(&self.graph),
            id.to_owned(),
        )))
    }

    fn attribute(&self, id: &str) -> Option<Arc<dyn HostObject>> {
        let graph = self.graph.read().ok()?;
        graph.attribute(id)?;
        Some(Arc::new(AttributeObject::new(
            Arc::clone(&self.graph),
            id.to_owned(),
        )))
    }

    fn sql(&self) -> Arc<dyn HostObject> {
        Arc::new(DetachedSql)
    }
}
