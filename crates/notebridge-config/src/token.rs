use std::fmt;

/// Where the bridge finds the token callers must present.
///
/// The host-label form mirrors the historical deployment where the secret is a
/// label on the host's current context note; the static form lets operators
/// pin the secret in configuration instead.
#[derive(Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// Read the named label from the host's current context on every request.
    HostLabel(String),
    /// Compare against a configured secret.
    Static(String),
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HostLabel(label) => formatter.debug_tuple("HostLabel").field(label).finish(),
            Self::Static(_) => formatter.write_str("Static(<redacted>)"),
        }
    }
}
