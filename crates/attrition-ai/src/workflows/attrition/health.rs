use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::client::HealthProbe;
use super::domain::HealthStatus;

/// Periodically probes the prediction service and publishes online/offline.
///
/// Only the latest status is kept; every tick overwrites it. Ticks are
/// independent: no retries and no backoff.
pub struct HealthMonitor<P> {
    probe: Arc<P>,
    interval: Duration,
    timeout: Duration,
    status: watch::Sender<Option<HealthStatus>>,
}

impl<P> HealthMonitor<P>
where
    P: HealthProbe + 'static,
{
    pub fn new(probe: Arc<P>, interval: Duration, timeout: Duration) -> Self {
        let (status, _) = watch::channel(None);
        Self {
            probe,
            interval: interval.max(Duration::from_millis(1)),
            timeout,
            status,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<HealthStatus>> {
        self.status.subscribe()
    }

    pub fn current(&self) -> Option<HealthStatus> {
        *self.status.borrow()
    }

    /// Runs one bounded probe and stores the result.
    pub async fn check(&self) -> HealthStatus {
        let online = matches!(
            tokio::time::timeout(self.timeout, self.probe.probe()).await,
            Ok(true)
        );
        let status = if online {
            HealthStatus::online()
        } else {
            HealthStatus::offline()
        };

        let previous = self.status.send_replace(Some(status));
        if previous.map(|prior| prior.online) == Some(online) {
            debug!(online, "health probe completed");
        } else {
            info!(online, "prediction service {}", status.label());
        }
        status
    }

    /// Probes once immediately, then on every interval until the handle is stopped.
    pub fn spawn(self) -> HealthMonitorHandle {
        let status = self.subscribe();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.check().await;
            }
        });
        HealthMonitorHandle { task, status }
    }
}

/// Owns the background probe loop; dropping it stops the loop.
pub struct HealthMonitorHandle {
    task: JoinHandle<()>,
    status: watch::Receiver<Option<HealthStatus>>,
}

impl HealthMonitorHandle {
    pub fn subscribe(&self) -> watch::Receiver<Option<HealthStatus>> {
        self.status.clone()
    }

    pub fn current(&self) -> Option<HealthStatus> {
        *self.status.borrow()
    }

    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for HealthMonitorHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct ScriptedProbe {
        online: AtomicBool,
        hang: AtomicBool,
        calls: AtomicUsize,
    }

    impl HealthProbe for ScriptedProbe {
        fn probe(&self) -> impl Future<Output = bool> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let online = self.online.load(Ordering::SeqCst);
            let hang = self.hang.load(Ordering::SeqCst);
            async move {
                if hang {
                    std::future::pending::<()>().await;
                }
                online
            }
        }
    }

    fn monitor(probe: &Arc<ScriptedProbe>) -> HealthMonitor<ScriptedProbe> {
        HealthMonitor::new(
            probe.clone(),
            Duration::from_secs(30),
            Duration::from_secs(3),
        )
    }

    #[tokio::test]
    async fn check_overwrites_status_in_place() {
        let probe = Arc::new(ScriptedProbe::default());
        let monitor = monitor(&probe);
        assert!(monitor.current().is_none());

        probe.online.store(true, Ordering::SeqCst);
        assert!(monitor.check().await.online);
        assert_eq!(monitor.current().map(|status| status.online), Some(true));

        probe.online.store(false, Ordering::SeqCst);
        assert!(!monitor.check().await.online);
        assert_eq!(monitor.current().map(|status| status.online), Some(false));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_probe_counts_as_offline() {
        let probe = Arc::new(ScriptedProbe::default());
        probe.online.store(true, Ordering::SeqCst);
        probe.hang.store(true, Ordering::SeqCst);

        let status = monitor(&probe).check().await;
        assert!(!status.online);
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_monitor_probes_at_startup_and_each_interval() {
        let probe = Arc::new(ScriptedProbe::default());
        probe.online.store(true, Ordering::SeqCst);
        let handle = monitor(&probe).spawn();
        let mut updates = handle.subscribe();

        updates.changed().await.expect("startup probe publishes");
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
        assert_eq!(handle.current().map(|status| status.online), Some(true));

        probe.online.store(false, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(probe.calls.load(Ordering::SeqCst), 2);
        assert_eq!(handle.current().map(|status| status.online), Some(false));

        handle.stop();
    }
}
