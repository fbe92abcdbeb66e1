//! Failures that end a bridge run.

use thiserror::Error;

use crate::bootstrap::BootstrapError;
use crate::transport::ListenerError;

use super::shutdown::ShutdownError;

/// Why [`run_bridge`](super::run_bridge) returned early or failed to stop
/// cleanly.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("bridge bootstrap failed: {0}")]
    Bootstrap(#[from] BootstrapError),
    #[error("bridge listener failed: {0}")]
    Listener(#[from] ListenerError),
    #[error("bridge shutdown wait failed: {0}")]
    Shutdown(#[from] ShutdownError),
}
