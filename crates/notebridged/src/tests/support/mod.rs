//! Test harness utilities shared by the bridge behavioural suites.

mod config_loader;
mod host;
mod logs;
mod reporter;
mod shutdown;
mod world;

pub use config_loader::{FailingConfigLoader, TEST_TOKEN, TestConfigLoader};
pub use host::{HostAnswers, MockHostGraph, Target};
pub use logs::CapturedLogs;
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use shutdown::TestShutdownSignal;
pub use world::{TestWorld, world};
