//! Background task that evicts idle sessions.

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::manager::SessionManager;

/// Handle to a running sweeper task.
///
/// Dropping the handle leaves the task running for the life of the runtime;
/// call [`shutdown`](Self::shutdown) to stop it.
#[derive(Debug)]
pub struct SweeperHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stop the timer and wait for an in-flight sweep to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "Session sweeper task failed");
        }
    }

    /// Whether the task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl SessionManager {
    /// Spawn the periodic idle sweep on the current tokio runtime.
    ///
    /// The first sweep runs one period after spawning.
    pub fn spawn_sweeper(&self) -> SweeperHandle {
        let manager = self.clone();
        let period = self.config().sweep_interval();
        let cancel = CancellationToken::new();
        let stop = cancel.clone();

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            debug!(?period, "Session sweeper started");
            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = ticker.tick() => {
                        manager.sweep();
                    }
                }
            }
            debug!("Session sweeper stopped");
        });

        SweeperHandle { cancel, task }
    }
}

#[cfg(test)]
mod tests {
    use crate::{SessionConfig, SessionManager};
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_sweeper_evicts_idle_sessions() {
        let config = SessionConfig::new()
            .with_max_idle(Duration::from_millis(20))
            .with_sweep_interval(Duration::from_millis(10));
        let manager = SessionManager::new(config);
        let sweeper = manager.spawn_sweeper();

        for _ in 0..3 {
            manager.start(None).unwrap();
        }
        assert_eq!(manager.len(), 3);

        sleep(Duration::from_millis(150)).await;
        assert!(manager.is_empty());

        sweeper.shutdown().await;
    }

    #[tokio::test]
    async fn test_sweeper_spares_active_sessions() {
        let config = SessionConfig::new()
            .with_max_idle(Duration::from_millis(100))
            .with_sweep_interval(Duration::from_millis(10));
        let manager = SessionManager::new(config);
        let sweeper = manager.spawn_sweeper();

        let active = manager.start(None).unwrap();
        let idle = manager.start(None).unwrap();

        for _ in 0..6 {
            sleep(Duration::from_millis(30)).await;
            active.get("status");
        }

        assert!(active.is_live());
        assert!(!idle.is_live());

        sweeper.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_task() {
        let manager = SessionManager::new(SessionConfig::default());
        let sweeper = manager.spawn_sweeper();
        assert!(!sweeper.is_finished());

        tokio::time::timeout(Duration::from_secs(1), sweeper.shutdown())
            .await
            .expect("sweeper did not stop");
    }
}
