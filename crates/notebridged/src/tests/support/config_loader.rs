//! Test configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::sync::Arc;

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoError};

use notebridge_config::{Config, ListenEndpoint};

use crate::bootstrap::ConfigLoader;

/// Static secret configured by [`TestConfigLoader`].
pub const TEST_TOKEN: &str = "s3cret";

/// Loader listening on an ephemeral loopback port with a static token.
#[derive(Debug, Clone, Default)]
pub struct TestConfigLoader {
    snapshot: Option<Utf8PathBuf>,
}

impl TestConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the in-memory host from `path`.
    #[must_use]
    pub fn with_snapshot(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            snapshot: Some(path.into()),
        }
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(Config {
            listen: ListenEndpoint::tcp("127.0.0.1", 0),
            token: Some(TEST_TOKEN.to_owned()),
            host_snapshot: self.snapshot.clone(),
            ..Config::default()
        })
    }
}

/// Loader that intentionally fails by passing an invalid endpoint flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("notebridged"),
            OsString::from("--listen"),
            OsString::from("invalid://socket"),
        ];
        Config::load_from_iter(args)
    }
}
