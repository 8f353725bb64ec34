//! Bounded, cancellable HTTP readiness polling.

use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Errors raised while building a readiness poller.
#[derive(Debug, Error)]
pub enum ReadinessError {
    /// The HTTP client could not be constructed.
    #[error("failed to build readiness HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Result type for readiness poller construction.
pub type ReadinessResult<T> = Result<T, ReadinessError>;

/// Polls an HTTP endpoint on a fixed interval until it answers with a 2xx
/// status or the wait is cancelled.
///
/// One check is in flight at a time and is bounded by the client's request
/// timeout. Cancellation is observed between checks, never during one.
#[derive(Debug, Clone)]
pub struct ReadinessPoller {
    client: reqwest::Client,
    interval: Duration,
}

impl ReadinessPoller {
    /// Creates a poller.
    ///
    /// # Errors
    ///
    /// Returns [`ReadinessError::Client`] when the HTTP client cannot be
    /// built.
    pub fn new(interval: Duration, request_timeout: Duration) -> ReadinessResult<Self> {
        let client = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self { client, interval })
    }

    /// Returns the polling interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits until `url` is ready or `cancel` fires.
    ///
    /// Returns `true` only if a check succeeded before cancellation. The
    /// polling task is stopped when this future completes or is dropped.
    pub async fn wait_for_ready(&self, url: &str, cancel: CancellationToken) -> bool {
        let (ready_tx, ready_rx) = oneshot::channel();
        let task_cancel = cancel.child_token();
        let _stop_polling = task_cancel.clone().drop_guard();

        tokio::spawn(poll_until_ready(
            self.client.clone(),
            url.to_owned(),
            self.interval,
            task_cancel,
            ready_tx,
        ));

        tokio::select! {
            biased;
            signal = ready_rx => signal.is_ok(),
            () = cancel.cancelled() => false,
        }
    }

    /// Waits until `url` is ready, giving up after `deadline`.
    pub async fn wait_for_ready_within(&self, url: &str, deadline: Duration) -> bool {
        let cancel = CancellationToken::new();
        let timer_cancel = cancel.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            timer_cancel.cancel();
        });

        let ready = self.wait_for_ready(url, cancel).await;
        timer.abort();
        ready
    }
}

async fn poll_until_ready(
    client: reqwest::Client,
    url: String,
    interval: Duration,
    cancel: CancellationToken,
    ready: oneshot::Sender<()>,
) {
    loop {
        if cancel.is_cancelled() {
            return;
        }

        if check_once(&client, &url).await {
            if ready.send(()).is_err() {
                debug!(url = %url, "readiness waiter went away");
            }
            return;
        }

        tokio::select! {
            () = cancel.cancelled() => return,
            () = tokio::time::sleep(interval) => {}
        }
    }
}

async fn check_once(client: &reqwest::Client, url: &str) -> bool {
    match client.get(url).send().await {
        Ok(response) if response.status().is_success() => true,
        Ok(response) => {
            debug!(url, status = %response.status(), "endpoint not ready");
            false
        }
        Err(err) => {
            debug!(url, error = %err, "readiness check failed");
            false
        }
    }
}
