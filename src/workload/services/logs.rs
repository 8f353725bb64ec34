//! Workload log files: reading, following and pruning orphans.

use crate::fs_utils;
use crate::workload::{
    domain::WorkloadName,
    ports::{WorkloadCatalog, WorkloadCatalogError},
};
use camino::{Utf8Path, Utf8PathBuf};
use futures::Stream;
use std::collections::BTreeSet;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const LOG_EXTENSION: &str = "log";
const READ_CHUNK: usize = 8 * 1024;

/// Errors raised by log operations.
#[derive(Debug, Error)]
pub enum LogError {
    /// The workload has no log file.
    #[error("proxy logs not found for workload {0}")]
    NotFound(WorkloadName),
    /// Reading or listing log files failed.
    #[error("log file error at {path}: {source}")]
    Io {
        /// Path being accessed.
        path: Utf8PathBuf,
        /// Underlying failure.
        source: io::Error,
    },
    /// Discovering managed workloads failed.
    #[error(transparent)]
    Catalog(#[from] WorkloadCatalogError),
}

/// Result type for log operations.
pub type LogResult<T> = Result<T, LogError>;

/// Directory holding one `<base>.log` per workload.
#[derive(Debug, Clone)]
pub struct LogDirectory {
    dir: Utf8PathBuf,
}

impl LogDirectory {
    /// Wraps `dir`.
    #[must_use]
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the directory path.
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Returns the log path for a workload.
    #[must_use]
    pub fn path_for(&self, base_name: &WorkloadName) -> Utf8PathBuf {
        self.dir.join(base_name.file_name(LOG_EXTENSION))
    }

    /// Reads a workload's whole log.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::NotFound`] when the workload has no log file.
    pub fn read_all(&self, base_name: &WorkloadName) -> LogResult<String> {
        fs_utils::read_optional(&self.dir, &base_name.file_name(LOG_EXTENSION))
            .map_err(|source| LogError::Io {
                path: self.path_for(base_name),
                source,
            })?
            .ok_or_else(|| LogError::NotFound(base_name.clone()))
    }
}

/// Streams a log file's existing content, then whatever is appended.
#[derive(Debug, Clone, Copy)]
pub struct LogFollower {
    poll_interval: Duration,
}

enum FollowState {
    Pending(Utf8PathBuf),
    Following { path: Utf8PathBuf, file: File },
    Done,
}

impl LogFollower {
    /// Creates a follower that polls for new bytes every `poll_interval`.
    #[must_use]
    pub const fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// Follows `path` until `cancel` fires.
    ///
    /// Opening or reading failures are yielded once and end the stream.
    pub fn follow(
        &self,
        path: impl Into<Utf8PathBuf>,
        cancel: CancellationToken,
    ) -> impl Stream<Item = LogResult<Vec<u8>>> + Send + 'static {
        let interval = self.poll_interval;
        futures::stream::unfold(FollowState::Pending(path.into()), move |state| {
            next_chunk(state, interval, cancel.clone())
        })
    }
}

async fn next_chunk(
    state: FollowState,
    interval: Duration,
    cancel: CancellationToken,
) -> Option<(LogResult<Vec<u8>>, FollowState)> {
    let (path, mut file) = match state {
        FollowState::Done => return None,
        FollowState::Following { path, file } => (path, file),
        FollowState::Pending(path) => match File::open(path.as_std_path()).await {
            Ok(file) => (path, file),
            Err(source) => return Some((Err(LogError::Io { path, source }), FollowState::Done)),
        },
    };

    let mut buffer = vec![0_u8; READ_CHUNK];
    loop {
        if cancel.is_cancelled() {
            return None;
        }

        match file.read(&mut buffer).await {
            Ok(0) => {
                tokio::select! {
                    () = cancel.cancelled() => {
                        debug!(path = %path, "log follow cancelled");
                        return None;
                    }
                    () = tokio::time::sleep(interval) => {}
                }
            }
            Ok(read) => {
                buffer.truncate(read);
                return Some((Ok(buffer), FollowState::Following { path, file }));
            }
            Err(source) => return Some((Err(LogError::Io { path, source }), FollowState::Done)),
        }
    }
}

/// Outcome of one prune pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Deleted log files, in path order.
    pub removed: Vec<Utf8PathBuf>,
    /// One message per file that could not be deleted.
    pub errors: Vec<String>,
}

/// Deletes log files whose workloads are no longer managed.
pub struct LogPruner<C>
where
    C: WorkloadCatalog,
{
    catalog: Arc<C>,
    logs: LogDirectory,
}

impl<C> LogPruner<C>
where
    C: WorkloadCatalog,
{
    /// Creates a pruner over `logs`, asking `catalog` for the managed set.
    #[must_use]
    pub const fn new(catalog: Arc<C>, logs: LogDirectory) -> Self {
        Self { catalog, logs }
    }

    /// Runs one prune pass.
    ///
    /// The managed set is recomputed on every call. Files that do not end in
    /// `.log` and non-files are left alone. A missing directory prunes
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Catalog`] when the managed set cannot be listed
    /// and [`LogError::Io`] when the directory cannot be read. Individual
    /// deletion failures are reported in [`PruneReport::errors`].
    pub async fn prune(&self) -> LogResult<PruneReport> {
        let managed: BTreeSet<String> = self
            .catalog
            .list_workloads(true)
            .await?
            .iter()
            .map(|workload| workload.base_name().to_owned())
            .collect();

        let dir = match fs_utils::open_dir(self.logs.dir()) {
            Ok(dir) => dir,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(dir = %self.logs.dir(), "no log directory to prune");
                return Ok(PruneReport::default());
            }
            Err(source) => return Err(io_error(self.logs.dir(), source)),
        };

        let entries = dir
            .entries()
            .map_err(|source| io_error(self.logs.dir(), source))?;
        let listing = entries.map(|listed| {
            listed.map(|entry| {
                let is_file = entry.file_type().is_ok_and(|kind| kind.is_file());
                (entry.file_name().ok(), is_file)
            })
        });
        let mut report = PruneReport::default();
        let orphans = collect_orphans(self.logs.dir(), listing, &managed, &mut report);

        sweep(self.logs.dir(), orphans, &mut report, |file_name| {
            dir.remove_file(file_name)
        });
        Ok(report)
    }
}

/// Returns the `.log` files in `listing` whose base name is not managed.
///
/// Each listing entry is a file name, absent when not UTF-8, and whether it
/// is a regular file. Unreadable entries are recorded in `report`.
fn collect_orphans<I>(
    dir: &Utf8Path,
    listing: I,
    managed: &BTreeSet<String>,
    report: &mut PruneReport,
) -> Vec<String>
where
    I: IntoIterator<Item = io::Result<(Option<String>, bool)>>,
{
    let mut orphans = Vec::new();
    for listed in listing {
        let (name, is_file) = match listed {
            Ok(entry) => entry,
            Err(err) => {
                warn!(dir = %dir, error = %err, "failed to read log directory entry");
                report.errors.push(format!("{dir}: {err}"));
                continue;
            }
        };
        let Some(file_name) = name else {
            continue;
        };
        let orphaned = file_name
            .strip_suffix(".log")
            .is_some_and(|base_name| !managed.contains(base_name));
        if is_file && orphaned {
            orphans.push(file_name);
        }
    }
    orphans
}

/// Removes each orphan through `remove`, recording successes and failures
/// in `report`. A failure never stops the sweep.
fn sweep<F>(dir: &Utf8Path, orphans: Vec<String>, report: &mut PruneReport, mut remove: F)
where
    F: FnMut(&str) -> io::Result<()>,
{
    for file_name in orphans {
        let path = dir.join(&file_name);
        match remove(&file_name) {
            Ok(()) => {
                info!(path = %path, "removed orphaned log file");
                report.removed.push(path);
            }
            Err(err) => {
                warn!(path = %path, error = %err, "failed to remove orphaned log file");
                report.errors.push(format!("{path}: {err}"));
            }
        }
    }
    report.removed.sort();
}

fn io_error(path: &Utf8Path, source: io::Error) -> LogError {
    LogError::Io {
        path: path.to_owned(),
        source,
    }
}
