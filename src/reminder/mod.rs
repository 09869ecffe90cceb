//! Background task reminding the user to log their time.
//!
//! The timer wakes up every poll interval, re-reads the configured reminder interval and raises
//! [ReminderSignal] once that much time passed since the previous reminder.

pub mod signal;

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use tokio::{task::JoinHandle, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, Instrument};

use crate::{storage::Storage, utils::clock::Clock};

pub use signal::ReminderSignal;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(9);

/// Source of the reminder interval. Queried on every wake-up so that changed settings apply
/// without restarting the timer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReminderSettings: Send + Sync + 'static {
    async fn reminder_interval(&self) -> Result<Duration>;
}

/// Reads the interval from the stored configuration. Never writes: the configuration file
/// belongs to the session.
pub struct StoredSettings<S>(pub S);

#[async_trait]
impl<S: Storage + Send + Sync + 'static> ReminderSettings for StoredSettings<S> {
    async fn reminder_interval(&self) -> Result<Duration> {
        Ok(self.0.peek_config().await?.reminder_interval())
    }
}

pub struct ReminderTimer {
    settings: Box<dyn ReminderSettings>,
    clock: Box<dyn Clock>,
    signal: Arc<ReminderSignal>,
    poll_interval: Duration,
}

impl ReminderTimer {
    pub fn new(
        settings: Box<dyn ReminderSettings>,
        clock: Box<dyn Clock>,
        signal: Arc<ReminderSignal>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            settings,
            clock,
            signal,
            poll_interval,
        }
    }

    /// Starts the timer on the current runtime.
    pub fn spawn(self) -> ReminderHandle {
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(
            self.run(shutdown.clone())
                .instrument(info_span!("reminder_timer")),
        );
        ReminderHandle { shutdown, task }
    }

    /// Executes the timer loop until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        let mut started_at = self.clock.instant();
        let mut wake_point = started_at;
        info!("Reminder timer started");
        loop {
            self.check(&mut started_at).await;
            wake_point += self.poll_interval;

            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Reminder timer stopping");
                    return Ok(())
                }
                _ = self.clock.sleep_until(wake_point) => ()
            }
        }
    }

    async fn check(&self, started_at: &mut Instant) {
        let interval = match self.settings.reminder_interval().await {
            Ok(v) => v,
            Err(e) => {
                error!("Couldn't read reminder interval, skipping this check {e:?}");
                return;
            }
        };

        let now = self.clock.instant();
        let elapsed = now.saturating_duration_since(*started_at);
        if elapsed >= interval {
            self.signal.raise();
            *started_at = now;
            info!("Reminder raised, timer restarting");
        } else {
            debug!("Not ready to remind, {:?} left", interval - elapsed);
        }
    }
}

/// Owner side of a running [ReminderTimer].
pub struct ReminderHandle {
    shutdown: CancellationToken,
    task: JoinHandle<Result<()>>,
}

impl ReminderHandle {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Requests the timer to stop and waits until it does.
    pub async fn stop(self) -> Result<()> {
        self.shutdown.cancel();
        self.task.await?
    }
}
