//! Launcher that re-executes a supervisor program for each workload.

use crate::fs_utils;
use crate::workload::{
    domain::{IdentityToken, ProxyProcessRecord},
    ports::{LaunchError, LaunchMode, LaunchResult, ProxyProcesses, RunConfig, WorkloadLauncher},
};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs::OpenOptions;
use mockable::Clock;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Environment marker set on detached supervisors.
pub const DETACHED_ENV: &str = "CARETAKER_DETACHED";

/// Launches `<program> run --foreground <base>` for each workload.
///
/// Detached launches append the supervisor's output to `<base>.log` under
/// the logs directory and record its PID with a fresh [`IdentityToken`].
/// Foreground launches inherit the caller's stdio and wait for exit.
#[derive(Debug, Clone)]
pub struct DetachedProcessLauncher<P, C>
where
    P: ProxyProcesses,
    C: Clock + Send + Sync,
{
    program: Utf8PathBuf,
    logs_dir: Utf8PathBuf,
    proxies: Arc<P>,
    clock: Arc<C>,
}

impl<P, C> DetachedProcessLauncher<P, C>
where
    P: ProxyProcesses,
    C: Clock + Send + Sync,
{
    /// Creates a launcher for `program`, logging under `logs_dir`.
    #[must_use]
    pub fn new(
        program: impl Into<Utf8PathBuf>,
        logs_dir: impl Into<Utf8PathBuf>,
        proxies: Arc<P>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            program: program.into(),
            logs_dir: logs_dir.into(),
            proxies,
            clock,
        }
    }

    /// Returns the supervisor program.
    #[must_use]
    pub fn program(&self) -> &Utf8Path {
        &self.program
    }

    fn command(&self, config: &RunConfig) -> Command {
        let mut command = Command::new(self.program.as_std_path());
        command
            .arg("run")
            .arg("--foreground")
            .arg(config.base_name().as_str());
        command
    }

    fn open_log(&self, config: &RunConfig) -> std::io::Result<std::fs::File> {
        let dir = fs_utils::ensure_dir(&self.logs_dir)?;
        let mut options = OpenOptions::new();
        options.create(true).append(true);
        let file = dir.open_with(config.base_name().file_name("log"), &options)?;
        Ok(file.into_std())
    }

    async fn launch_detached(&self, config: &RunConfig) -> LaunchResult<()> {
        let base_name = config.base_name();
        let stdout = self.open_log(config).map_err(LaunchError::runtime)?;
        let stderr = stdout.try_clone().map_err(LaunchError::runtime)?;

        let mut child = self
            .command(config)
            .env(DETACHED_ENV, "1")
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .spawn()
            .map_err(LaunchError::runtime)?;

        let pid = child.id().ok_or_else(|| {
            LaunchError::runtime(std::io::Error::other(format!(
                "supervisor for {base_name} exited before reporting a PID"
            )))
        })?;

        let record = ProxyProcessRecord::new(pid).with_token(IdentityToken::generate(&*self.clock));
        self.proxies.record(base_name, record).await?;
        info!(workload = %base_name, pid, "launched detached supervisor");

        let reaped = base_name.clone();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => debug!(workload = %reaped, %status, "detached supervisor exited"),
                Err(err) => warn!(workload = %reaped, error = %err, "failed to reap detached supervisor"),
            }
        });
        Ok(())
    }

    async fn launch_foreground(&self, config: &RunConfig) -> LaunchResult<()> {
        let status = self
            .command(config)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(LaunchError::runtime)?;

        if status.success() {
            return Ok(());
        }
        Err(LaunchError::Exited {
            name: config.base_name().clone(),
            code: status.code(),
        })
    }
}

#[async_trait]
impl<P, C> WorkloadLauncher for DetachedProcessLauncher<P, C>
where
    P: ProxyProcesses,
    C: Clock + Send + Sync,
{
    async fn launch(&self, config: &RunConfig, mode: LaunchMode) -> LaunchResult<()> {
        match mode {
            LaunchMode::Detached => self.launch_detached(config).await,
            LaunchMode::Foreground => self.launch_foreground(config).await,
        }
    }
}
