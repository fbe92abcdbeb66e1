//! Request deserialization for the dispatch loop.
//!
//! Parses a JSONL line into a [`BridgeRequest`]. Legacy client field
//! names (`pythonClientToken`, `objtype`, `objid`) are accepted as aliases.

use serde::Deserialize;
use serde_json::Value;

use super::errors::DispatchError;

/// A single invocation request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeRequest {
    /// Caller-supplied shared secret.
    #[serde(default, alias = "pythonClientToken")]
    pub token: Option<String>,
    /// Raw kind tag naming the target object.
    #[serde(default, alias = "objtype")]
    pub object_kind: Option<String>,
    /// Identifier of the target within its kind.
    #[serde(default, alias = "objid")]
    pub object_id: Option<String>,
    /// Member to read or call. Absence is reported by [`Self::validate`] so
    /// that authentication still runs first.
    #[serde(default)]
    pub method_name: String,
    /// Positional arguments.
    #[serde(default)]
    pub args: Vec<Value>,
}

impl BridgeRequest {
    /// Parses a JSONL line into a request.
    ///
    /// Trailing whitespace (including the newline delimiter) is trimmed before
    /// parsing.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::MalformedRequest` if the line is empty or is
    /// not a request object.
    pub fn parse(line: &[u8]) -> Result<Self, DispatchError> {
        let trimmed = trim_trailing_whitespace(line);
        if trimmed.is_empty() {
            return Err(DispatchError::malformed("empty request line"));
        }

        serde_json::from_slice(trimmed).map_err(DispatchError::from_json_error)
    }

    /// Validates that the member name is present.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::InvalidStructure` if `methodName` is empty or
    /// whitespace.
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.method_name.trim().is_empty() {
            return Err(DispatchError::invalid_structure("methodName field is empty"));
        }
        Ok(())
    }

    /// Kind tag, empty when absent.
    pub fn object_kind(&self) -> &str {
        self.object_kind.as_deref().unwrap_or_default()
    }

    /// Identifier, if supplied.
    pub fn object_id(&self) -> Option<&str> {
        self.object_id.as_deref()
    }

    /// Member name as sent. Lookup is case-sensitive, so only surrounding
    /// whitespace is removed.
    pub fn method_name(&self) -> &str {
        self.method_name.trim()
    }
}

/// Trims trailing ASCII whitespace from a byte slice.
fn trim_trailing_whitespace(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map(|pos| pos + 1)
        .unwrap_or(0);
    &bytes[..end]
}
