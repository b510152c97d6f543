//! Scheduled jobs for periodic moderation maintenance.

#![allow(missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval for the expired-lock reaper (default: 30 minutes).
    pub reaper_interval: Duration,
    /// Interval for the overdue escalation sweep (default: 3 hours).
    pub escalation_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            reaper_interval: Duration::from_secs(1800),
            escalation_interval: Duration::from_secs(10800),
        }
    }
}

/// Job executor trait for scheduled jobs.
#[async_trait::async_trait]
pub trait JobExecutor: Send + Sync {
    /// Force-release expired report locks. Returns how many were released.
    async fn release_expired_locks(&self) -> Result<u64, Box<dyn std::error::Error + Send + Sync>>;

    /// Escalate stale overdue reports. Returns how many were escalated.
    async fn escalate_overdue_reports(
        &self,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>>;
}

/// Run the scheduler with the given configuration and executor.
///
/// Each job gets its own timer task; a failed tick is logged and the timer
/// keeps running.
pub async fn run_scheduler<E: JobExecutor + 'static>(config: SchedulerConfig, executor: Arc<E>) {
    let executor_reaper = executor.clone();
    let executor_escalation = executor;

    let reaper_interval = config.reaper_interval;
    let escalation_interval = config.escalation_interval;

    // Spawn lock reaper task
    tokio::spawn(async move {
        let mut interval = interval(reaper_interval);
        loop {
            interval.tick().await;
            match executor_reaper.release_expired_locks().await {
                Ok(count) => {
                    if count > 0 {
                        tracing::info!(count, "Released expired report locks");
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to release expired report locks");
                }
            }
        }
    });

    // Spawn escalation sweep task
    tokio::spawn(async move {
        let mut interval = interval(escalation_interval);
        loop {
            interval.tick().await;
            match executor_escalation.escalate_overdue_reports().await {
                Ok(count) => {
                    if count > 0 {
                        tracing::info!(count, "Escalated overdue reports");
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to escalate overdue reports");
                }
            }
        }
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[test]
    fn test_scheduler_config_default() {
        let config = SchedulerConfig::default();
        assert_eq!(config.reaper_interval, Duration::from_secs(1800));
        assert_eq!(config.escalation_interval, Duration::from_secs(10800));
    }

    struct CountingExecutor {
        reaps: AtomicU64,
        escalations: AtomicU64,
    }

    #[async_trait::async_trait]
    impl JobExecutor for CountingExecutor {
        async fn release_expired_locks(
            &self,
        ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
            self.reaps.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }

        async fn escalate_overdue_reports(
            &self,
        ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
            self.escalations.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_scheduler_runs_both_jobs() {
        let executor = Arc::new(CountingExecutor {
            reaps: AtomicU64::new(0),
            escalations: AtomicU64::new(0),
        });

        let config = SchedulerConfig {
            reaper_interval: Duration::from_millis(10),
            escalation_interval: Duration::from_millis(10),
        };

        run_scheduler(config, executor.clone()).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(executor.reaps.load(Ordering::SeqCst) >= 1);
        assert!(executor.escalations.load(Ordering::SeqCst) >= 1);
    }
}
