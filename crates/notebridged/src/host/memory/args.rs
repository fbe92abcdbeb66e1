//! Positional argument access for in-memory host members.

use serde_json::Value;

use crate::host::HostError;

/// Borrowed view over a call's positional arguments.
///
/// Omitted trailing arguments and explicit `null` are both treated as absent.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Args<'a> {
    method: &'a str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    pub(crate) fn new(method: &'a str, values: &'a [Value]) -> Self {
        Self { method, values }
    }

    pub(crate) fn value(&self, index: usize) -> Option<&'a Value> {
        self.values.get(index).filter(|value| !value.is_null())
    }

    pub(crate) fn string(&self, index: usize) -> Result<&'a str, HostError> {
        self.opt_string(index)
            .ok_or_else(|| self.missing(index, "a string"))
    }

    pub(crate) fn opt_string(&self, index: usize) -> Option<&'a str> {
        self.value(index).and_then(Value::as_str)
    }

    pub(crate) fn boolean(&self, index: usize) -> Result<bool, HostError> {
        self.value(index)
            .and_then(Value::as_bool)
            .ok_or_else(|| self.missing(index, "a boolean"))
    }

    pub(crate) fn opt_boolean(&self, index: usize) -> Option<bool> {
        self.value(index).and_then(Value::as_bool)
    }

    pub(crate) fn opt_integer(&self, index: usize) -> Option<i64> {
        self.value(index).and_then(Value::as_i64)
    }

    fn missing(&self, index: usize, expected: &str) -> HostError {
        HostError::new(format!(
            "{}: argument {} must be {expected}",
            self.method,
            index + 1
        ))
    }
}
