use std::{
    path::PathBuf,
    sync::{Mutex, OnceLock},
};

use comment_predictor::app_dirs::CONFIG_HOME_ENV;
use comment_predictor::config::SERVICE_URL_ENV;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Points the config root at a temp dir and restores the environment on drop.
pub struct PredictorEnvGuard {
    previous: Vec<(&'static str, Option<String>)>,
    _lock: std::sync::MutexGuard<'static, ()>,
}

impl PredictorEnvGuard {
    pub fn set_config_home(path: PathBuf) -> Self {
        let lock = ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|err| err.into_inner());
        let mut guard = Self {
            previous: Vec::new(),
            _lock: lock,
        };
        guard.set(CONFIG_HOME_ENV, Some(path.to_string_lossy().into_owned()));
        guard.set(SERVICE_URL_ENV, None);
        guard
    }

    pub fn set_service_url(&mut self, url: &str) {
        self.set(SERVICE_URL_ENV, Some(url.to_string()));
    }

    fn set(&mut self, key: &'static str, value: Option<String>) {
        if !self.previous.iter().any(|(known, _)| *known == key) {
            self.previous.push((key, std::env::var(key).ok()));
        }
        write_var(key, value);
    }
}

impl Drop for PredictorEnvGuard {
    fn drop(&mut self) {
        for (key, value) in self.previous.drain(..) {
            write_var(key, value);
        }
    }
}

fn write_var(key: &str, value: Option<String>) {
    // SAFETY: tests run under a global lock to prevent concurrent env mutations.
    unsafe {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
}
