//! Supervises bridge launch sequencing and runtime orchestration.

use std::sync::Arc;

use tracing::info;

use crate::bootstrap::{
    ConfigLoader, HostFactory, MemoryHostFactory, SystemConfigLoader, bootstrap_with,
};
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::transport::SocketListener;

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Collaborators required to launch the bridge runtime.
pub struct LaunchPlan<L, H, S> {
    /// Source of the resolved configuration.
    pub loader: L,
    /// Builds the host the bridge serves.
    pub hosts: H,
    /// Blocks until the bridge should stop.
    pub shutdown: S,
    /// Receives lifecycle events.
    pub reporter: Arc<dyn HealthReporter>,
}

/// Runs the bridge using the production collaborators.
pub fn run_bridge() -> Result<(), LaunchError> {
    run_bridge_with(LaunchPlan {
        loader: SystemConfigLoader,
        hosts: MemoryHostFactory,
        shutdown: SystemShutdownSignal::new(),
        reporter: Arc::new(StructuredHealthReporter::new()),
    })
}

/// Runs the bridge with injected collaborators.
///
/// Returns once the shutdown signal fires and the listener thread has
/// stopped accepting connections.
pub fn run_bridge_with<L, H, S>(plan: LaunchPlan<L, H, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    H: HostFactory,
    S: ShutdownSignal,
{
    let LaunchPlan {
        loader,
        hosts,
        shutdown,
        reporter,
    } = plan;

    let bridge = bootstrap_with(&loader, reporter, &hosts)?;
    info!(
        target: PROCESS_TARGET,
        endpoint = %bridge.config().listen(),
        "starting bridge runtime"
    );

    let listener = SocketListener::bind(bridge.config().listen())?;
    let bound = listener.local_addr();
    let listener_handle = listener.start(bridge.connection_handler())?;
    bridge
        .reporter()
        .listener_ready(bridge.config().listen(), bound);

    shutdown.wait()?;
    listener_handle.shutdown();
    listener_handle.join()?;
    info!(
        target: PROCESS_TARGET,
        "shutdown sequence completed"
    );
    Ok(())
}
