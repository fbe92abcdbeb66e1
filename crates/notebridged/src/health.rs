//! Structured health reporting for bridge lifecycle events.

use std::net::SocketAddr;
use std::sync::Arc;

use camino::Utf8Path;

use notebridge_config::{Config, ListenEndpoint};

use crate::bootstrap::BootstrapError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked before the host is built. `snapshot` is the seed file, if any.
    fn host_loading(&self, snapshot: Option<&Utf8Path>);

    /// Invoked once the host is ready to serve.
    fn host_ready(&self, snapshot: Option<&Utf8Path>);

    /// Invoked once the listener accepts connections.
    fn listener_ready(&self, endpoint: &ListenEndpoint, bound: Option<SocketAddr>);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn host_loading(&self, snapshot: Option<&Utf8Path>) {
        (**self).host_loading(snapshot);
    }

    fn host_ready(&self, snapshot: Option<&Utf8Path>) {
        (**self).host_ready(snapshot);
    }

    fn listener_ready(&self, endpoint: &ListenEndpoint, bound: Option<SocketAddr>) {
        (**self).listener_ready(endpoint, bound);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting bridge bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            listen = %config.listen(),
            log_filter = %config.log_filter(),
            log_format = %config.log_format(),
            token_source = ?config.token_source(),
            max_depth = config.max_depth(),
            "bridge bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "bridge bootstrap failed"
        );
    }

    fn host_loading(&self, snapshot: Option<&Utf8Path>) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "host_loading",
            snapshot = snapshot.map(Utf8Path::as_str),
            "loading host"
        );
    }

    fn host_ready(&self, snapshot: Option<&Utf8Path>) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "host_ready",
            snapshot = snapshot.map(Utf8Path::as_str),
            "host ready"
        );
    }

    fn listener_ready(&self, endpoint: &ListenEndpoint, bound: Option<SocketAddr>) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "listener_ready",
            endpoint = %endpoint,
            bound = bound.map(tracing::field::display),
            "bridge accepting connections"
        );
    }
}
