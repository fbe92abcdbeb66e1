use std::ffi::{OsStr, OsString};
use std::fs;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use ortho_config::{OrthoConfig, OrthoError};
use tempfile::TempDir;
use notebridge_config::Config;

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

struct EnvOverride {
    key: &'static str,
    previous: Option<OsString>,
    guard: Option<MutexGuard<'static, ()>>,
}

impl EnvOverride {
    fn set_var(key: &'static str, value: &OsStr) -> Self {
        let guard = ENV_MUTEX
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let previous = std::env::var_os(key);
        unsafe { std::env::set_var(key, value) };
        Self {
            key,
            previous,
            guard: Some(guard),
        }
    }
}

impl Drop for EnvOverride {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => unsafe { std::env::set_var(self.key, value) },
            None => unsafe { std::env::remove_var(self.key) },
        }
        drop(self.guard.take());
    }
}

#[test]
fn malformed_configs_return_aggregated_error() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let cli_path = temp_dir.path().join("cli_notebridge.toml");
    let env_path = temp_dir.path().join("env_notebridge.toml");

    fs::write(&cli_path, r#"listen = { transport = "tcp" host = "127.0.0.1" }"#)
        .expect("write malformed cli config");
    fs::write(&env_path, r#"listen = { transport = "tcp", port = not_a_number }"#)
        .expect("write malformed env config");

    let _env = EnvOverride::set_var("NOTEBRIDGE_CONFIG_PATH", env_path.as_os_str());

    let args = vec![
        OsString::from("notebridged"),
        OsString::from("--config-path"),
        cli_path.clone().into_os_string(),
    ];

    let error = Config::load_from_iter(args).expect_err("loading must fail");

    match error.as_ref() {
        OrthoError::Aggregate(aggregate) => {
            let mut mentioned_paths = aggregate
                .iter()
                .filter_map(|err| match err {
                    OrthoError::File { path, .. } => Some(path.clone()),
                    _ => None,
                })
                .collect::<Vec<_>>();
            mentioned_paths.sort();

            assert_eq!(
                mentioned_paths.len(),
                2,
                "expected both failing files to be reported, got {mentioned_paths:?}"
            );
            assert!(mentioned_paths.contains(&cli_path));
            assert!(mentioned_paths.contains(&env_path));
        }
        other => panic!("expected aggregated error, got {other:?}"),
    }
}

#[test]
fn rejects_unparseable_listen_flag() {
    let args = vec![
        OsString::from("notebridged"),
        OsString::from("--listen"),
        OsString::from("http://127.0.0.1:80"),
    ];
    assert!(Config::load_from_iter(args).is_err());
}
