//! Named, cancelable background tasks owned by the controller.
//!
//! At most one task of each [`TaskKind`] is live at a time: arming a kind
//! aborts whatever was armed under it before.

use tokio::task::JoinHandle;
use tracing::debug;

/// The kinds of background work a controller can have in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Periodic fiat to satoshi conversion.
    PriceRefresh,
    /// Trailing edge of the price refresh debounce window.
    PriceDebounce,
    /// One-shot token metadata lookup.
    MetadataFetch,
    /// Self-terminating poll for an authenticated account.
    LoginPoll,
    /// Periodic unconfirmed-set poll on the destination address.
    AddressWatch,
    /// Delay before a completed repeatable request resets.
    RepeatTimeout,
    /// In-flight provider transaction submissions. Tracked outside the
    /// registry; only reported at teardown.
    Transaction,
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TaskKind::PriceRefresh => "price-refresh",
            TaskKind::PriceDebounce => "price-debounce",
            TaskKind::MetadataFetch => "metadata-fetch",
            TaskKind::LoginPoll => "login-poll",
            TaskKind::AddressWatch => "address-watch",
            TaskKind::RepeatTimeout => "repeat-timeout",
            TaskKind::Transaction => "transaction",
        };
        f.write_str(name)
    }
}

/// Registry of live task handles, keyed by kind.
///
/// The number of kinds is small, so handles live in a `Vec` and are searched
/// linearly.
#[derive(Default)]
pub struct TimerRegistry {
    handles: Vec<(TaskKind, JoinHandle<()>)>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handle` under `kind`, aborting the previous one first.
    pub fn arm(&mut self, kind: TaskKind, handle: JoinHandle<()>) {
        if self.disarm(kind) {
            debug!(%kind, "Replaced live task");
        }
        self.handles.push((kind, handle));
    }

    /// Abort the task registered under `kind`.
    ///
    /// Returns whether a task was registered, finished or not.
    pub fn disarm(&mut self, kind: TaskKind) -> bool {
        let Some(index) = self.handles.iter().position(|(k, _)| *k == kind) else {
            return false;
        };
        let (_, handle) = self.handles.swap_remove(index);
        handle.abort();
        true
    }

    /// Kinds whose tasks are still running.
    pub fn armed(&self) -> Vec<TaskKind> {
        self.handles
            .iter()
            .filter(|(_, handle)| !handle.is_finished())
            .map(|(kind, _)| *kind)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Abort everything. Returns the kinds that were still running.
    pub fn disarm_all(&mut self) -> Vec<TaskKind> {
        let live = self.armed();
        for (_, handle) in self.handles.drain(..) {
            handle.abort();
        }
        live
    }
}

impl Drop for TimerRegistry {
    fn drop(&mut self) {
        for (_, handle) in &self.handles {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn ticking(counter: Arc<AtomicU32>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
                counter.fetch_add(1, Ordering::SeqCst);
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_arm_replaces_prior_instance() {
        let first = Arc::new(AtomicU32::new(0));
        let second = Arc::new(AtomicU32::new(0));
        let mut registry = TimerRegistry::new();

        registry.arm(TaskKind::PriceRefresh, ticking(first.clone()));
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        registry.arm(TaskKind::PriceRefresh, ticking(second.clone()));
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(first.load(Ordering::SeqCst), 2);
        assert!(second.load(Ordering::SeqCst) >= 4);
        assert_eq!(registry.armed(), vec![TaskKind::PriceRefresh]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_kinds_are_independent() {
        let price = Arc::new(AtomicU32::new(0));
        let watch = Arc::new(AtomicU32::new(0));
        let mut registry = TimerRegistry::new();

        registry.arm(TaskKind::PriceRefresh, ticking(price.clone()));
        registry.arm(TaskKind::AddressWatch, ticking(watch.clone()));
        assert!(registry.disarm(TaskKind::PriceRefresh));
        assert!(!registry.disarm(TaskKind::PriceRefresh));

        tokio::time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(price.load(Ordering::SeqCst), 0);
        assert_eq!(watch.load(Ordering::SeqCst), 3);
        assert_eq!(registry.armed(), vec![TaskKind::AddressWatch]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_all_leaves_nothing_running() {
        let counter = Arc::new(AtomicU32::new(0));
        let mut registry = TimerRegistry::new();
        registry.arm(TaskKind::LoginPoll, ticking(counter.clone()));
        registry.arm(TaskKind::RepeatTimeout, tokio::spawn(async {}));
        tokio::time::sleep(Duration::from_millis(10)).await;

        let live = registry.disarm_all();
        assert_eq!(live, vec![TaskKind::LoginPoll]);
        assert!(registry.is_empty());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
