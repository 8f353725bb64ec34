//! Explicit host configuration context.
//!
//! [`Settings`] come from the environment, [`DataLayout`] places every
//! persisted file under one per-user root, and [`ConfigStore`] owns the
//! persisted [`HostConfig`]. [`HostContext`] bundles the three and builds
//! the file-backed adapters, so no component reads global state.

use crate::fs_utils;
use crate::workload::{
    adapters::{
        DetachedProcessLauncher, HostWorkloadCatalog, JsonRunStateStore, PidFileProxyProcesses,
    },
    ports::{ContainerEngine, ProxyProcesses},
    services::{LogDirectory, LogFollower, ReadinessPoller, ReadinessResult},
};
use camino::{Utf8Path, Utf8PathBuf};
use envconfig::Envconfig;
use mockable::{Clock, DefaultClock};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Directory created under the platform data directory.
pub const DATA_DIR_NAME: &str = "caretaker";
const CONFIG_FILE_NAME: &str = "config.json";

/// Errors raised while resolving or persisting configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable could not be parsed.
    #[error(transparent)]
    Env(#[from] envconfig::Error),
    /// The platform reports no per-user data directory.
    #[error("no per-user data directory available; set CARETAKER_DATA_DIR")]
    NoDataDir,
    /// A resolved path is not valid UTF-8.
    #[error("path is not valid UTF-8: {0:?}")]
    NonUtf8Path(PathBuf),
    /// Reading or writing the config file failed.
    #[error("config file error at {path}: {source}")]
    Io {
        /// Config file path.
        path: Utf8PathBuf,
        /// Underlying failure.
        source: std::io::Error,
    },
    /// The config file holds invalid JSON.
    #[error("invalid config file at {path}: {source}")]
    Parse {
        /// Config file path.
        path: Utf8PathBuf,
        /// Decoding failure.
        source: serde_json::Error,
    },
    /// The current executable could not be located.
    #[error("failed to locate the current executable: {0}")]
    CurrentExe(std::io::Error),
    /// The in-memory config lock was poisoned.
    #[error("config lock poisoned: {0}")]
    Lock(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Millisecond duration parsed from an environment variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvMsDuration(pub Duration);

/// Error for a duration that is not a whole number of milliseconds.
#[derive(Debug, PartialEq, Eq, Error)]
#[error("expected a whole number of milliseconds")]
pub struct ParseEnvMsDurationError;

impl FromStr for EnvMsDuration {
    type Err = ParseEnvMsDurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let millis = value
            .trim()
            .parse::<u64>()
            .map_err(|_| ParseEnvMsDurationError)?;
        Ok(Self(Duration::from_millis(millis)))
    }
}

/// Tunables read from the environment.
#[derive(Envconfig, Debug, Clone)]
pub struct Settings {
    /// Overrides the data root.
    #[envconfig(from = "CARETAKER_DATA_DIR")]
    pub data_dir: Option<String>,

    /// Delay between readiness checks.
    #[envconfig(from = "CARETAKER_READINESS_INTERVAL_MS", default = "3000")]
    pub readiness_interval: EnvMsDuration,

    /// Upper bound for one readiness request.
    #[envconfig(from = "CARETAKER_READINESS_REQUEST_TIMEOUT_MS", default = "5000")]
    pub readiness_request_timeout: EnvMsDuration,

    /// Delay between log follower polls.
    #[envconfig(from = "CARETAKER_LOG_POLL_INTERVAL_MS", default = "100")]
    pub log_poll_interval: EnvMsDuration,

    /// Supervisor program re-executed for detached launches. Defaults to
    /// the current executable.
    #[envconfig(from = "CARETAKER_SUPERVISOR_PROGRAM")]
    pub supervisor_program: Option<String>,
}

impl Settings {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] when a variable cannot be parsed.
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self::init_from_env()?)
    }

    /// Resolves the supervisor program.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CurrentExe`] when the current executable cannot
    /// be determined, or [`ConfigError::NonUtf8Path`] when its path is not
    /// UTF-8.
    pub fn supervisor_program(&self) -> ConfigResult<Utf8PathBuf> {
        if let Some(program) = self.supervisor_program.as_deref().filter(|value| !value.is_empty()) {
            return Ok(Utf8PathBuf::from(program));
        }
        let current = std::env::current_exe().map_err(ConfigError::CurrentExe)?;
        Utf8PathBuf::from_path_buf(current).map_err(ConfigError::NonUtf8Path)
    }
}

/// Locations of every persisted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: Utf8PathBuf,
}

impl DataLayout {
    /// Uses `root` as the data root.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves the data root from `settings`, falling back to
    /// `<platform data dir>/caretaker`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoDataDir`] when no override is set and the
    /// platform has no data directory.
    pub fn resolve(settings: &Settings) -> ConfigResult<Self> {
        if let Some(root) = settings.data_dir.as_deref().filter(|value| !value.is_empty()) {
            return Ok(Self::new(root));
        }
        let platform = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
        let root = Utf8PathBuf::from_path_buf(platform.join(DATA_DIR_NAME))
            .map_err(ConfigError::NonUtf8Path)?;
        Ok(Self { root })
    }

    /// Returns the data root.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Returns the PID record directory.
    #[must_use]
    pub fn pids_dir(&self) -> Utf8PathBuf {
        self.root.join("pids")
    }

    /// Returns the run-state directory.
    #[must_use]
    pub fn state_dir(&self) -> Utf8PathBuf {
        self.root.join("state")
    }

    /// Returns the log directory.
    #[must_use]
    pub fn logs_dir(&self) -> Utf8PathBuf {
        self.root.join("logs")
    }

    /// Returns the host config file path.
    #[must_use]
    pub fn config_file(&self) -> Utf8PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }
}

/// Persisted host-wide configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Clients whose configuration files are kept in sync.
    #[serde(default)]
    pub registered_clients: Vec<String>,
    /// Whether clients are discovered automatically.
    #[serde(default)]
    pub auto_discovery: bool,
    /// Secrets provider backing secret references.
    #[serde(default)]
    pub secrets_provider: Option<String>,
}

/// Owner of the persisted [`HostConfig`].
///
/// Updates are serialized. Each one is written to disk before it becomes
/// visible through [`ConfigStore::current`].
#[derive(Debug)]
pub struct ConfigStore {
    dir: Utf8PathBuf,
    path: Utf8PathBuf,
    current: Mutex<HostConfig>,
}

impl ConfigStore {
    /// Loads `config.json` from `layout`. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] or [`ConfigError::Parse`] when the file
    /// exists but cannot be read or decoded.
    pub fn load(layout: &DataLayout) -> ConfigResult<Self> {
        let path = layout.config_file();
        let contents = fs_utils::read_optional(layout.root(), CONFIG_FILE_NAME).map_err(
            |source| ConfigError::Io {
                path: path.clone(),
                source,
            },
        )?;
        let current = match contents {
            Some(text) => serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?,
            None => {
                debug!(path = %path, "no host config file; using defaults");
                HostConfig::default()
            }
        };
        Ok(Self {
            dir: layout.root().to_owned(),
            path,
            current: Mutex::new(current),
        })
    }

    /// Returns the current configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Lock`] when the lock is poisoned.
    pub fn current(&self) -> ConfigResult<HostConfig> {
        let guard = self
            .current
            .lock()
            .map_err(|err| ConfigError::Lock(err.to_string()))?;
        Ok(guard.clone())
    }

    /// Applies `mutate` to a copy of the configuration, persists the result
    /// atomically, then publishes it.
    ///
    /// A failed write leaves the published configuration unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be written.
    pub fn update<F>(&self, mutate: F) -> ConfigResult<HostConfig>
    where
        F: FnOnce(&mut HostConfig),
    {
        let mut guard = self
            .current
            .lock()
            .map_err(|err| ConfigError::Lock(err.to_string()))?;
        let mut next = guard.clone();
        mutate(&mut next);

        let contents = serde_json::to_string_pretty(&next).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })?;
        fs_utils::write_atomic(&self.dir, CONFIG_FILE_NAME, &contents).map_err(|source| {
            ConfigError::Io {
                path: self.path.clone(),
                source,
            }
        })?;

        guard.clone_from(&next);
        Ok(next)
    }
}

/// Configuration context passed to components.
#[derive(Debug, Clone)]
pub struct HostContext {
    settings: Settings,
    layout: DataLayout,
    config: Arc<ConfigStore>,
}

impl HostContext {
    /// Builds a context from the process environment.
    ///
    /// # Errors
    ///
    /// Returns configuration errors from [`Settings::from_env`],
    /// [`DataLayout::resolve`] or [`ConfigStore::load`].
    pub fn from_env() -> ConfigResult<Self> {
        Self::new(Settings::from_env()?)
    }

    /// Builds a context from explicit settings.
    ///
    /// # Errors
    ///
    /// Returns configuration errors from [`DataLayout::resolve`] or
    /// [`ConfigStore::load`].
    pub fn new(settings: Settings) -> ConfigResult<Self> {
        let layout = DataLayout::resolve(&settings)?;
        let config = Arc::new(ConfigStore::load(&layout)?);
        Ok(Self {
            settings,
            layout,
            config,
        })
    }

    /// Returns the environment settings.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the data layout.
    #[must_use]
    pub const fn layout(&self) -> &DataLayout {
        &self.layout
    }

    /// Returns the shared config store.
    #[must_use]
    pub const fn config(&self) -> &Arc<ConfigStore> {
        &self.config
    }

    /// Builds the PID-file proxy tracker.
    #[must_use]
    pub fn proxy_processes(&self) -> PidFileProxyProcesses {
        PidFileProxyProcesses::new(self.layout.pids_dir())
    }

    /// Builds the JSON run-state store.
    #[must_use]
    pub fn run_state_store(&self) -> JsonRunStateStore {
        JsonRunStateStore::new(self.layout.state_dir())
    }

    /// Returns the workload log directory.
    #[must_use]
    pub fn log_directory(&self) -> LogDirectory {
        LogDirectory::new(self.layout.logs_dir())
    }

    /// Builds a log follower with the configured poll interval.
    #[must_use]
    pub const fn log_follower(&self) -> LogFollower {
        LogFollower::new(self.settings.log_poll_interval.0)
    }

    /// Builds a readiness poller with the configured timings.
    ///
    /// # Errors
    ///
    /// Returns readiness errors when the HTTP client cannot be built.
    pub fn readiness_poller(&self) -> ReadinessResult<ReadinessPoller> {
        ReadinessPoller::new(
            self.settings.readiness_interval.0,
            self.settings.readiness_request_timeout.0,
        )
    }

    /// Builds the host workload catalog: managed containers from `engine`
    /// plus remote workloads from the saved run states under this root.
    #[must_use]
    pub fn workload_catalog<E>(
        &self,
        engine: Arc<E>,
    ) -> HostWorkloadCatalog<E, JsonRunStateStore, PidFileProxyProcesses, DefaultClock>
    where
        E: ContainerEngine,
    {
        HostWorkloadCatalog::new(
            engine,
            Arc::new(self.run_state_store()),
            Arc::new(self.proxy_processes()),
            Arc::new(DefaultClock),
        )
    }

    /// Builds the detached process launcher around `proxies`.
    ///
    /// # Errors
    ///
    /// Returns configuration errors when the supervisor program cannot be
    /// resolved.
    pub fn detached_launcher<P, C>(
        &self,
        proxies: Arc<P>,
        clock: Arc<C>,
    ) -> ConfigResult<DetachedProcessLauncher<P, C>>
    where
        P: ProxyProcesses,
        C: Clock + Send + Sync,
    {
        Ok(DetachedProcessLauncher::new(
            self.settings.supervisor_program()?,
            self.layout.logs_dir(),
            proxies,
            clock,
        ))
    }
}
