//! Bridge bootstrap orchestration.

use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use notebridge_config::{Config, EndpointPreparationError};

use crate::dispatch::{
    DispatchConnectionHandler, RequestDispatcher, SerializationPolicy, TokenGate,
};
use crate::health::HealthReporter;
use crate::host::Host;
use crate::host::memory::{MemoryHost, SnapshotError};
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the bridge configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader returning a configuration resolved elsewhere.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Builds the host the bridge serves.
pub trait HostFactory: Send + Sync {
    /// Creates the host for `config`.
    fn create(&self, config: &Config) -> Result<Arc<dyn Host>, SnapshotError>;
}

impl<F> HostFactory for F
where
    F: Fn(&Config) -> Result<Arc<dyn Host>, SnapshotError> + Send + Sync,
{
    fn create(&self, config: &Config) -> Result<Arc<dyn Host>, SnapshotError> {
        self(config)
    }
}

/// Factory for the in-memory reference host.
///
/// Loads `host_snapshot` when configured and otherwise starts from a graph
/// holding only the root note.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryHostFactory;

impl HostFactory for MemoryHostFactory {
    fn create(&self, config: &Config) -> Result<Arc<dyn Host>, SnapshotError> {
        let host = match config.host_snapshot() {
            Some(path) => MemoryHost::load(path, config.context_note())?,
            None => MemoryHost::with_root(config.context_note()),
        };
        Ok(Arc::new(host))
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        #[source]
        source: TelemetryError,
    },
    /// The listen endpoint's directory could not be prepared.
    #[error("failed to prepare listen endpoint: {source}")]
    Endpoint {
        #[source]
        source: EndpointPreparationError,
    },
    /// The host could not be built.
    #[error("failed to build host: {source}")]
    Host {
        #[source]
        source: SnapshotError,
    },
}

/// Result of a successful bootstrap: configuration plus a ready dispatcher.
pub struct Bridge {
    config: Config,
    dispatcher: RequestDispatcher,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl Bridge {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The request pipeline serving this bridge.
    #[must_use]
    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    pub(crate) fn reporter(&self) -> &Arc<dyn HealthReporter> {
        &self.reporter
    }

    pub(crate) fn connection_handler(&self) -> Arc<DispatchConnectionHandler> {
        Arc::new(DispatchConnectionHandler::new(self.dispatcher.clone()))
    }
}

/// Bootstraps the bridge using the supplied collaborators.
///
/// Stages run in order: configuration, telemetry, endpoint filesystem, host,
/// dispatcher. The first failure is reported and returned.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    hosts: &dyn HostFactory,
) -> Result<Bridge, BootstrapError> {
    reporter.bootstrap_starting();

    let fail = |error: BootstrapError| {
        reporter.bootstrap_failed(&error);
        error
    };

    let config = loader
        .load()
        .map_err(|source| fail(BootstrapError::Configuration { source }))?;

    let telemetry = telemetry::initialise(&config)
        .map_err(|source| fail(BootstrapError::Telemetry { source }))?;

    config
        .listen()
        .prepare_filesystem()
        .map_err(|source| fail(BootstrapError::Endpoint { source }))?;

    reporter.host_loading(config.host_snapshot());
    let host = hosts
        .create(&config)
        .map_err(|source| fail(BootstrapError::Host { source }))?;
    reporter.host_ready(config.host_snapshot());

    let dispatcher = RequestDispatcher::new(
        host,
        TokenGate::new(config.token_source()),
        SerializationPolicy::with_max_depth(config.max_depth()),
    );
    reporter.bootstrap_succeeded(&config);

    Ok(Bridge {
        config,
        dispatcher,
        telemetry,
        reporter,
    })
}
