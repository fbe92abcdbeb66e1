//! Remote-invocation bridge between an external scripting client and a
//! note-management host.
//!
//! Clients connect over the socket configured via [`notebridge_config`] and
//! send one JSON request per line naming a target object, a member, and
//! positional arguments. The bridge authenticates the request against the
//! host's shared secret, resolves the target, validates the member against a
//! static catalogue, invokes it on the host, and answers with a single JSON
//! line carrying an HTTP-style status and an optional body.
//!
//! The host itself sits behind the [`host::Host`] trait. The crate ships an
//! in-memory reference host ([`host::memory::MemoryHost`]) that can be seeded
//! from a JSON snapshot, which keeps the daemon runnable without an embedding
//! application.
//!
//! Every lifecycle stage reports through [`HealthReporter`] so operators can
//! follow bootstrap, host loading, and listener readiness in structured
//! telemetry.

mod bootstrap;
pub mod dispatch;
mod health;
pub mod host;
mod process;
mod telemetry;
mod transport;

pub use bootstrap::{
    BootstrapError, Bridge, ConfigLoader, HostFactory, MemoryHostFactory, StaticConfigLoader,
    SystemConfigLoader, bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{
    LaunchError, LaunchPlan, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_bridge,
    run_bridge_with,
};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
