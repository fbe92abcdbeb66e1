//! Test double for [`HealthReporter`] that records structured events for assertions.

use std::net::SocketAddr;
use std::sync::Mutex;

use camino::Utf8Path;

use notebridge_config::{Config, ListenEndpoint};

use crate::bootstrap::BootstrapError;
use crate::health::HealthReporter;

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    /// Bootstrap started.
    BootstrapStarting,
    /// Bootstrap completed successfully.
    BootstrapSucceeded,
    /// Bootstrap failed with an error description.
    BootstrapFailed(String),
    /// Host construction began.
    HostLoading,
    /// Host construction finished.
    HostReady,
    /// The listener is accepting connections.
    ListenerReady(Option<SocketAddr>),
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    /// Address reported by the most recent `listener_ready` event.
    pub fn bound_address(&self) -> Option<SocketAddr> {
        self.events().iter().rev().find_map(|event| match event {
            HealthEvent::ListenerReady(bound) => *bound,
            _ => None,
        })
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn host_loading(&self, _snapshot: Option<&Utf8Path>) {
        self.record(HealthEvent::HostLoading);
    }

    fn host_ready(&self, _snapshot: Option<&Utf8Path>) {
        self.record(HealthEvent::HostReady);
    }

    fn listener_ready(&self, _endpoint: &ListenEndpoint, bound: Option<SocketAddr>) {
        self.record(HealthEvent::ListenerReady(bound));
    }
}
