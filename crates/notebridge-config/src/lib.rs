//! Shared configuration for the notebridge daemon.
//!
//! Configuration is layered by [`ortho_config`]: built-in defaults, then a
//! TOML file (discovered or passed with `--config-path`), then `NOTEBRIDGE_*`
//! environment variables, then command-line flags. Later layers win.
//!
//! ```toml
//! listen = { transport = "tcp", host = "127.0.0.1", port = 8769 }
//! log_filter = "notebridged=debug"
//! log_format = "compact"
//! token_label = "pythonClientToken"
//! ```

mod defaults;
mod endpoint;
mod logging;
mod token;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_CONTEXT_NOTE, DEFAULT_LOG_FILTER, DEFAULT_MAX_DEPTH, DEFAULT_PORT,
    DEFAULT_TOKEN_LABEL, default_listen_endpoint, default_log_filter, default_log_filter_string,
    default_log_format,
};
pub use endpoint::{EndpointParseError, EndpointPreparationError, ListenEndpoint};
pub use logging::{LogFormat, LogFormatParseError};
pub use token::TokenSource;

use defaults::{default_context_note, default_max_depth, default_token_label};

/// Resolved bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "NOTEBRIDGE")]
pub struct Config {
    /// Endpoint the daemon listens on.
    #[serde(default = "default_listen_endpoint")]
    #[ortho_config(default = default_listen_endpoint())]
    pub listen: ListenEndpoint,
    /// `tracing` filter directive.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log line format.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Static shared secret. When unset the token is read from the host.
    #[serde(default)]
    pub token: Option<String>,
    /// Label on the current context note holding the shared secret.
    #[serde(default = "default_token_label")]
    #[ortho_config(default = default_token_label())]
    pub token_label: String,
    /// Note the host treats as its current context.
    #[serde(default = "default_context_note")]
    #[ortho_config(default = default_context_note())]
    pub context_note: String,
    /// JSON snapshot seeding the in-memory host.
    #[serde(default)]
    pub host_snapshot: Option<Utf8PathBuf>,
    /// Deepest nesting the result serializer will encode.
    #[serde(default = "default_max_depth")]
    #[ortho_config(default = default_max_depth())]
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen_endpoint(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            token: None,
            token_label: default_token_label(),
            context_note: default_context_note(),
            host_snapshot: None,
            max_depth: default_max_depth(),
        }
    }
}

impl Config {
    /// Endpoint the daemon listens on.
    #[must_use]
    pub fn listen(&self) -> &ListenEndpoint {
        &self.listen
    }

    /// `tracing` filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log line format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Where the expected caller token comes from.
    ///
    /// A configured `token` takes precedence over the host label.
    #[must_use]
    pub fn token_source(&self) -> TokenSource {
        match self.token.as_deref().filter(|token| !token.is_empty()) {
            Some(token) => TokenSource::Static(token.to_owned()),
            None => TokenSource::HostLabel(self.token_label.clone()),
        }
    }

    /// Note the host treats as its current context.
    #[must_use]
    pub fn context_note(&self) -> &str {
        self.context_note.as_str()
    }

    /// Snapshot file seeding the in-memory host, if any.
    #[must_use]
    pub fn host_snapshot(&self) -> Option<&Utf8Path> {
        self.host_snapshot.as_deref()
    }

    /// Deepest nesting the result serializer will encode.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}
