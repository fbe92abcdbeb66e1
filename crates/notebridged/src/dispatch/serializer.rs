//! Result serialization with back-reference pruning.
//!
//! Host objects link to their neighbours in both directions, so a naive
//! encoding of a note would walk the whole tree. The serializer drops every
//! mapping key the policy names (by default `children` and `parents`) at any
//! depth and refuses to encode values nested deeper than the policy allows.

use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;

use notebridge_config::DEFAULT_MAX_DEPTH;

use super::errors::DispatchError;

/// Keys omitted from every encoded mapping unless configured otherwise.
pub const DEFAULT_OMITTED_KEYS: &[&str] = &["children", "parents"];

/// What the serializer leaves out and how deep it will go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializationPolicy {
    omitted_keys: Vec<String>,
    max_depth: usize,
}

impl Default for SerializationPolicy {
    fn default() -> Self {
        Self {
            omitted_keys: DEFAULT_OMITTED_KEYS
                .iter()
                .map(|key| (*key).to_owned())
                .collect(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl SerializationPolicy {
    /// Default policy with a different nesting limit.
    #[must_use]
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    /// Replaces the omitted key set.
    #[must_use]
    pub fn omitting<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.omitted_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn omits(&self, key: &str) -> bool {
        self.omitted_keys.iter().any(|omitted| omitted == key)
    }

    /// Encodes `value` as JSON text under this policy.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::Serialization` when the value nests deeper than
    /// [`max_depth`](Self::max_depth).
    pub fn serialize(&self, value: &Value) -> Result<String, DispatchError> {
        serde_json::to_string(&Pruned {
            value,
            policy: self,
            depth: 0,
        })
        .map_err(|error| DispatchError::serialization(error.to_string()))
    }
}

/// Borrowed view of a value that prunes while it serializes.
struct Pruned<'a> {
    value: &'a Value,
    policy: &'a SerializationPolicy,
    depth: usize,
}

impl Pruned<'_> {
    fn child<'b>(&'b self, value: &'b Value) -> Pruned<'b> {
        Pruned {
            value,
            policy: self.policy,
            depth: self.depth + 1,
        }
    }
}

impl Serialize for Pruned<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let nested = matches!(self.value, Value::Array(_) | Value::Object(_));
        if nested && self.depth >= self.policy.max_depth {
            return Err(S::Error::custom(format!(
                "value nests deeper than {} levels",
                self.policy.max_depth
            )));
        }

        match self.value {
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&self.child(item))?;
                }
                seq.end()
            }
            Value::Object(entries) => {
                let kept = entries
                    .iter()
                    .filter(|(key, _)| !self.policy.omits(key));
                let mut map = serializer.serialize_map(None)?;
                for (key, value) in kept {
                    map.serialize_entry(key, &self.child(value))?;
                }
                map.end()
            }
            scalar => scalar.serialize(serializer),
        }
    }
}
