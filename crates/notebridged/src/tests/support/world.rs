//! BDD test world: encapsulates loader, reporter, and bootstrap state for step functions.

use std::cell::RefCell;
use std::sync::Arc;

use tempfile::TempDir;

use crate::bootstrap::{BootstrapError, Bridge, ConfigLoader, MemoryHostFactory, bootstrap_with};

use super::config_loader::{FailingConfigLoader, TestConfigLoader};
use super::reporter::RecordingHealthReporter;

/// Scenario world shared across bootstrap steps.
pub struct TestWorld {
    loader: Box<dyn ConfigLoader>,
    pub reporter: Arc<RecordingHealthReporter>,
    scratch: TempDir,
    bridge: Option<Bridge>,
    bootstrap_error: Option<BootstrapError>,
}

impl TestWorld {
    /// Builds a world with a successful configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self {
            loader: Box::new(TestConfigLoader::new()),
            reporter: Arc::new(RecordingHealthReporter::default()),
            scratch: TempDir::new().expect("scratch directory"),
            bridge: None,
            bootstrap_error: None,
        }
    }

    /// Installs a loader that always fails.
    pub fn use_failing_loader(&mut self) {
        self.loader = Box::new(FailingConfigLoader);
        self.reset_results();
    }

    /// Installs a loader that succeeds.
    pub fn use_successful_loader(&mut self) {
        self.loader = Box::new(TestConfigLoader::new());
        self.reset_results();
    }

    /// Installs a loader pointing at a snapshot file holding `contents`.
    pub fn use_snapshot(&mut self, contents: &str) {
        let path = self.scratch.path().join("snapshot.json");
        std::fs::write(&path, contents).expect("write snapshot");
        self.use_snapshot_path(&path);
    }

    /// Installs a loader pointing at a snapshot file that was never written.
    pub fn use_missing_snapshot(&mut self) {
        let path = self.scratch.path().join("missing.json");
        self.use_snapshot_path(&path);
    }

    fn use_snapshot_path(&mut self, path: &std::path::Path) {
        let path = path.to_str().expect("utf8 snapshot path");
        self.loader = Box::new(TestConfigLoader::with_snapshot(path));
        self.reset_results();
    }

    /// Runs the bootstrap sequence once.
    pub fn bootstrap(&mut self) {
        if self.bridge.is_some() || self.bootstrap_error.is_some() {
            return;
        }

        let reporter = Arc::clone(&self.reporter);
        match bootstrap_with(&*self.loader, reporter, &MemoryHostFactory) {
            Ok(bridge) => self.bridge = Some(bridge),
            Err(error) => self.bootstrap_error = Some(error),
        }
    }

    /// Returns whether bootstrap produced an error.
    #[must_use]
    pub fn bootstrap_error(&self) -> Option<&BootstrapError> {
        self.bootstrap_error.as_ref()
    }

    /// Returns the bootstrapped bridge, if any.
    #[must_use]
    pub fn bridge(&self) -> Option<&Bridge> {
        self.bridge.as_ref()
    }

    fn reset_results(&mut self) {
        self.bridge = None;
        self.bootstrap_error = None;
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Default test world fixture.
#[must_use]
pub fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::new())
}
