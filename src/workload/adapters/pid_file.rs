//! PID-file backed proxy process tracker.

use super::process;
use crate::fs_utils;
use crate::workload::{
    domain::{ProxyProcessRecord, WorkloadName},
    ports::{ProxyProcessError, ProxyProcessResult, ProxyProcesses},
};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

const PID_EXTENSION: &str = "pid";

/// Tracks supervisors through `<base>.pid` files in one directory.
///
/// Staleness is decided by probing the recorded PID, never by file
/// presence alone.
#[derive(Debug, Clone)]
pub struct PidFileProxyProcesses {
    dir: Utf8PathBuf,
}

impl PidFileProxyProcesses {
    /// Creates a tracker over `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the PID directory.
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    fn read_record(&self, base_name: &WorkloadName) -> ProxyProcessResult<Option<ProxyProcessRecord>> {
        let Some(contents) = fs_utils::read_optional(&self.dir, &base_name.file_name(PID_EXTENSION))
            .map_err(ProxyProcessError::persistence)?
        else {
            return Ok(None);
        };
        ProxyProcessRecord::parse(&contents)
            .map(Some)
            .map_err(ProxyProcessError::persistence)
    }
}

#[async_trait]
impl ProxyProcesses for PidFileProxyProcesses {
    async fn is_running(&self, base_name: &WorkloadName) -> bool {
        let record = match self.read_record(base_name) {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(workload = %base_name, "no proxy PID record");
                return false;
            }
            Err(err) => {
                warn!(workload = %base_name, error = %err, "unreadable proxy PID record");
                return false;
            }
        };

        let alive = process::is_alive(record.pid());
        if !alive {
            warn!(
                workload = %base_name,
                pid = record.pid(),
                "recorded proxy process is not running"
            );
        }
        alive
    }

    async fn record(
        &self,
        base_name: &WorkloadName,
        record: ProxyProcessRecord,
    ) -> ProxyProcessResult<()> {
        fs_utils::write_atomic(
            &self.dir,
            &base_name.file_name(PID_EXTENSION),
            &record.render(),
        )
        .map_err(ProxyProcessError::persistence)
    }

    async fn terminate(&self, base_name: &WorkloadName) -> ProxyProcessResult<()> {
        let file_name = base_name.file_name(PID_EXTENSION);
        let record = self.read_record(base_name);
        fs_utils::remove_optional(&self.dir, &file_name).map_err(ProxyProcessError::persistence)?;

        let pid = record?
            .ok_or_else(|| ProxyProcessError::NoRecord(base_name.clone()))?
            .pid();
        process::terminate(pid).map_err(|err| ProxyProcessError::Signal {
            name: base_name.clone(),
            pid,
            source: Arc::new(err),
        })
    }
}
