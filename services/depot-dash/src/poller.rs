// services/depot-dash/src/poller.rs
//
// Polling data source.
//
// The analytics feed is polled on a fixed interval by a sequential loop: the
// next tick is only scheduled once the current fetch has finished, so two
// fetches never race. Failures are logged and counted, the caller keeps its
// last snapshot. Branches, clients and trucks are loaded once at mount.
//

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use svckit::errors::DashError;
use svckit::retry::RetryPolicy;
use svckit::types::{AnalyticsSnapshot, Branch, Client, Truck};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::api::{with_timeout, DashboardApi};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Outcome counters of the poll loop, published after every attempt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollStatus {
    pub attempts: u64,
    pub failures: u64,
    pub consecutive_failures: u64,
    pub last_error: Option<String>,
    pub last_success: Option<DateTime<Local>>,
}

impl PollStatus {
    /// True once a fetch has succeeded and the latest one did not fail.
    pub fn is_connected(&self) -> bool {
        self.last_success.is_some() && self.consecutive_failures == 0
    }

    fn record_success(&mut self) {
        self.attempts += 1;
        self.consecutive_failures = 0;
        self.last_error = None;
        self.last_success = Some(Local::now());
    }

    fn record_failure(&mut self, error: &DashError) {
        self.attempts += 1;
        self.failures += 1;
        self.consecutive_failures += 1;
        self.last_error = Some(error.to_string());
    }
}

pub struct AnalyticsPoller {
    api: Arc<dyn DashboardApi>,
    interval: Duration,
    request_timeout: Duration,
}

impl AnalyticsPoller {
    pub fn new(api: Arc<dyn DashboardApi>, interval: Duration, request_timeout: Duration) -> Self {
        Self {
            api,
            interval,
            request_timeout,
        }
    }

    /// Spawns the poll loop on the current tokio runtime. `on_update` gets
    /// every successfully fetched snapshot; failures never reach it.
    pub fn start<F>(self, on_update: F) -> PollHandle
    where
        F: FnMut(AnalyticsSnapshot) + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (status_tx, status_rx) = watch::channel(PollStatus::default());

        info!(
            "Starting analytics poller against {} every {:?}",
            self.api.describe(),
            self.interval
        );
        let task = tokio::spawn(self.run(shutdown_rx, status_tx, on_update));

        PollHandle {
            shutdown: shutdown_tx,
            status: status_rx,
            task: Some(task),
        }
    }

    async fn run<F>(
        self,
        mut shutdown: watch::Receiver<bool>,
        status: watch::Sender<PollStatus>,
        mut on_update: F,
    ) where
        F: FnMut(AnalyticsSnapshot) + Send + 'static,
    {
        loop {
            if *shutdown.borrow() {
                break;
            }

            let fetch = with_timeout(self.request_timeout, self.api.fetch_analytics());
            let outcome = tokio::select! {
                biased;
                _ = shutdown.changed() => {
                    debug!("Poller stopped with a fetch in flight");
                    break;
                }
                outcome = fetch => outcome,
            };

            // A result that raced with stop() is dropped.
            if *shutdown.borrow() {
                break;
            }

            match outcome {
                Ok(snapshot) => {
                    status.send_modify(|s| s.record_success());
                    on_update(snapshot);
                }
                Err(e) if !e.is_transient() => {
                    error!("Analytics poll failed and will not recover on its own: {}", e);
                    status.send_modify(|s| s.record_failure(&e));
                }
                Err(e) => {
                    warn!("Analytics poll failed, keeping last snapshot: {}", e);
                    status.send_modify(|s| s.record_failure(&e));
                }
            }

            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                _ = sleep(self.interval) => {}
            }
        }

        info!("Analytics poller stopped");
    }
}

/// Owns a running poll loop. Dropping the handle stops the loop.
pub struct PollHandle {
    shutdown: watch::Sender<bool>,
    status: watch::Receiver<PollStatus>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn status(&self) -> PollStatus {
        self.status.borrow().clone()
    }

    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map(|t| t.is_finished()).unwrap_or(true)
    }

    /// Stops the loop and waits for it to wind down.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Result of the one-shot load at mount. Each collection is independent:
/// `None` means that request failed and the previous collection stays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectoryUpdate {
    pub branches: Option<Vec<Branch>>,
    pub clients: Option<Vec<Client>>,
    pub trucks: Option<Vec<Truck>>,
}

impl DirectoryUpdate {
    pub fn is_complete(&self) -> bool {
        self.branches.is_some() && self.clients.is_some() && self.trucks.is_some()
    }
}

/// Fetches branches, branch clients and trucks concurrently and joins them.
pub async fn load_directory(
    api: &dyn DashboardApi,
    retry: &RetryPolicy,
    request_timeout: Duration,
) -> DirectoryUpdate {
    let (branches, clients, trucks) = tokio::join!(
        retry.execute("branches fetch", move || with_timeout(request_timeout, api.fetch_branches())),
        retry.execute("branch clients fetch", move || {
            with_timeout(request_timeout, api.fetch_branch_clients())
        }),
        retry.execute("trucks fetch", move || with_timeout(request_timeout, api.fetch_trucks())),
    );

    let update = DirectoryUpdate {
        branches: keep_ok("branches", branches),
        clients: keep_ok("branch clients", clients),
        trucks: keep_ok("trucks", trucks),
    };

    info!(
        "Directory loaded: {} branches, {} clients, {} trucks",
        update.branches.as_ref().map_or(0, Vec::len),
        update.clients.as_ref().map_or(0, Vec::len),
        update.trucks.as_ref().map_or(0, Vec::len),
    );

    update
}

fn keep_ok<T>(what: &str, result: Result<Vec<T>, DashError>) -> Option<Vec<T>> {
    match result {
        Ok(items) => Some(items),
        Err(e) => {
            warn!("Failed to load {}, keeping previous data: {}", what, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    /// Serves scripted analytics results; anything past the script fails.
    struct ScriptedApi {
        analytics: Mutex<VecDeque<Result<AnalyticsSnapshot, DashError>>>,
        analytics_calls: AtomicU64,
        latency: Duration,
        branches_fail: bool,
    }

    impl ScriptedApi {
        fn new(script: Vec<Result<AnalyticsSnapshot, DashError>>) -> Self {
            Self {
                analytics: Mutex::new(script.into()),
                analytics_calls: AtomicU64::new(0),
                latency: Duration::ZERO,
                branches_fail: false,
            }
        }

        fn calls(&self) -> u64 {
            self.analytics_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DashboardApi for ScriptedApi {
        async fn fetch_branches(&self) -> Result<Vec<Branch>, DashError> {
            if self.branches_fail {
                return Err(DashError::Http { endpoint: "/branches".to_string(), status: 500 });
            }
            Ok(vec![Branch { id: 1, name: "Marilao".to_string(), client_count: 1 }])
        }

        async fn fetch_branch_clients(&self) -> Result<Vec<Client>, DashError> {
            Ok(vec![Client { id: 10, name: "Acme Freight".to_string(), branch_id: Some(1) }])
        }

        async fn fetch_trucks(&self) -> Result<Vec<Truck>, DashError> {
            Ok(vec![])
        }

        async fn fetch_analytics(&self) -> Result<AnalyticsSnapshot, DashError> {
            self.analytics_calls.fetch_add(1, Ordering::SeqCst);
            if !self.latency.is_zero() {
                sleep(self.latency).await;
            }
            let next = self.analytics.lock().unwrap().pop_front();
            next.unwrap_or_else(|| Err(DashError::Network("connection refused".to_string())))
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }

    fn snapshot(total: u64) -> AnalyticsSnapshot {
        AnalyticsSnapshot {
            total_pending: total,
            appointment_pending: total,
            ..Default::default()
        }
    }

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_poll_keeps_snapshot_and_retries_once_per_interval() {
        let api = Arc::new(ScriptedApi::new(vec![
            Ok(snapshot(3)),
            Err(DashError::Network("reset by peer".to_string())),
            Ok(snapshot(5)),
        ]));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = AnalyticsPoller::new(api.clone(), DEFAULT_POLL_INTERVAL, Duration::from_secs(3))
            .start(move |s| {
                let _ = tx.send(s);
            });

        let mut held: Option<AnalyticsSnapshot> = None;

        settle().await;
        assert_eq!(api.calls(), 1);
        while let Ok(s) = rx.try_recv() {
            held = Some(s);
        }
        assert_eq!(held.as_ref().map(|s| s.total_pending), Some(3));

        // Second tick fails.
        tokio::time::advance(DEFAULT_POLL_INTERVAL).await;
        settle().await;
        assert_eq!(api.calls(), 2);
        assert!(rx.try_recv().is_err());
        assert_eq!(held.as_ref().map(|s| s.total_pending), Some(3));
        assert_eq!(handle.status().consecutive_failures, 1);
        assert!(!handle.status().is_connected());

        // Exactly one more attempt, and not before the interval has passed.
        tokio::time::advance(Duration::from_millis(4999)).await;
        settle().await;
        assert_eq!(api.calls(), 2);
        tokio::time::advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(api.calls(), 3);
        while let Ok(s) = rx.try_recv() {
            held = Some(s);
        }
        assert_eq!(held.map(|s| s.total_pending), Some(5));
        assert!(handle.status().is_connected());
        assert_eq!(handle.status().failures, 1);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_counts_as_failure() {
        let mut api = ScriptedApi::new(vec![Ok(snapshot(1))]);
        api.latency = Duration::from_secs(10);
        let api = Arc::new(api);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = AnalyticsPoller::new(api.clone(), DEFAULT_POLL_INTERVAL, Duration::from_secs(3))
            .start(move |s| {
                let _ = tx.send(s);
            });

        settle().await;
        tokio::time::advance(Duration::from_secs(3)).await;
        settle().await;

        let status = handle.status();
        assert_eq!(status.failures, 1);
        assert!(status.last_error.unwrap().contains("timed out"));
        assert!(rx.try_recv().is_err());

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_after_stop_is_discarded() {
        let mut api = ScriptedApi::new(vec![Ok(snapshot(9))]);
        api.latency = Duration::from_secs(1);
        let api = Arc::new(api);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = AnalyticsPoller::new(api.clone(), DEFAULT_POLL_INTERVAL, Duration::from_secs(3))
            .start(move |s| {
                let _ = tx.send(s);
            });

        settle().await;
        assert_eq!(api.calls(), 1);
        handle.stop();
        tokio::time::advance(Duration::from_secs(2)).await;
        settle().await;

        assert!(handle.is_finished());
        assert!(rx.try_recv().is_err());
        tokio::time::advance(DEFAULT_POLL_INTERVAL * 3).await;
        settle().await;
        assert_eq!(api.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_polling() {
        let api = Arc::new(ScriptedApi::new(vec![Ok(snapshot(1)), Ok(snapshot(2))]));
        let handle = AnalyticsPoller::new(api.clone(), DEFAULT_POLL_INTERVAL, Duration::from_secs(3))
            .start(|_| {});
        settle().await;
        drop(handle);

        tokio::time::advance(DEFAULT_POLL_INTERVAL * 2).await;
        settle().await;
        assert_eq!(api.calls(), 1);
    }

    #[tokio::test]
    async fn test_directory_load_is_per_source() {
        let mut api = ScriptedApi::new(vec![]);
        api.branches_fail = true;

        let update = load_directory(&api, &RetryPolicy::none(), Duration::from_secs(3)).await;

        assert_eq!(update.branches, None);
        assert_eq!(update.clients.as_ref().map(Vec::len), Some(1));
        assert_eq!(update.trucks, Some(vec![]));
        assert!(!update.is_complete());
    }

    #[tokio::test]
    async fn test_directory_load_complete() {
        let api = ScriptedApi::new(vec![]);
        let update = load_directory(&api, &RetryPolicy::none(), Duration::from_secs(3)).await;
        assert!(update.is_complete());
        assert_eq!(update.branches.unwrap()[0].name, "Marilao");
    }
}
