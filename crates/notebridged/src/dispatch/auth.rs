//! Shared-token authentication.

use notebridge_config::TokenSource;

use crate::host::Host;

/// Compares the caller's token against the expected one.
#[derive(Debug, Clone)]
pub struct TokenGate {
    source: TokenSource,
}

impl TokenGate {
    /// Creates a gate reading the expected token from `source`.
    pub fn new(source: TokenSource) -> Self {
        Self { source }
    }

    /// Returns `true` when `supplied` equals the expected token exactly.
    ///
    /// Fails closed: a missing supplied token, a missing host label, or an
    /// empty expected token never validates.
    pub fn validate(&self, host: &dyn Host, supplied: Option<&str>) -> bool {
        let Some(supplied) = supplied else {
            return false;
        };
        let expected = match &self.source {
            TokenSource::Static(secret) => Some(secret.clone()),
            TokenSource::HostLabel(label) => host.label_value(label),
        };
        expected.is_some_and(|expected| !expected.is_empty() && expected == supplied)
    }
}
