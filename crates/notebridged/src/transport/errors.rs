//! Failures raised while binding or serving the bridge socket.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

use notebridge_config::ListenEndpoint;

/// Errors surfaced while binding or running the socket listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The TCP host did not resolve to any address.
    #[error("cannot resolve listen address {host}:{port}")]
    Unresolved {
        host: String,
        port: u16,
        #[source]
        source: Option<io::Error>,
    },
    /// The operating system refused the bind.
    #[error("cannot listen on {endpoint}: {source}")]
    Bind {
        endpoint: ListenEndpoint,
        #[source]
        source: io::Error,
    },
    /// The bound socket could not be switched to polling accepts.
    #[error("cannot poll {endpoint} for connections: {source}")]
    Poll {
        endpoint: ListenEndpoint,
        #[source]
        source: io::Error,
    },
    #[cfg(not(unix))]
    #[error("unix sockets are unavailable on this platform: {endpoint}")]
    UnixUnavailable { endpoint: ListenEndpoint },
    /// A running bridge still answers on the socket path.
    #[cfg(unix)]
    #[error("{path} is already served by a running bridge")]
    SocketBusy { path: Utf8PathBuf },
    /// Something other than a socket occupies the socket path.
    #[cfg(unix)]
    #[error("{path} exists and is not a socket")]
    NotASocket { path: Utf8PathBuf },
    /// A socket file left by a dead bridge could not be inspected or removed.
    #[cfg(unix)]
    #[error("cannot reclaim stale socket {path}: {source}")]
    StaleSocket {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("accept loop for {endpoint} panicked")]
    AcceptLoopPanicked { endpoint: ListenEndpoint },
}
