use crate::endpoint::ListenEndpoint;
use crate::logging::LogFormat;

/// Default TCP port for the bridge listener.
pub const DEFAULT_PORT: u16 = 8769;

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Label on the host's current context note that holds the shared token.
pub const DEFAULT_TOKEN_LABEL: &str = "pythonClientToken";

/// Note treated as the host's current context.
pub const DEFAULT_CONTEXT_NOTE: &str = "root";

/// Deepest nesting the result serializer will encode.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default log filter expression.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter for serde defaults.
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default log format.
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Loopback TCP endpoint on [`DEFAULT_PORT`].
pub fn default_listen_endpoint() -> ListenEndpoint {
    ListenEndpoint::tcp("127.0.0.1", DEFAULT_PORT)
}

pub(crate) fn default_token_label() -> String {
    DEFAULT_TOKEN_LABEL.to_owned()
}

pub(crate) fn default_context_note() -> String {
    DEFAULT_CONTEXT_NOTE.to_owned()
}

pub(crate) fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}
