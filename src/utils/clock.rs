use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, Utc};
use tokio::time::Instant;

/// Represents an entity responsible for providing dates across application. Reports are keyed by
/// [Clock::today], so a test clock can simulate a day rollover.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    fn time(&self) -> DateTime<Utc>;

    fn instant(&self) -> Instant;

    /// Calendar day in the user's timezone.
    fn today(&self) -> NaiveDate {
        self.time().with_timezone(&Local).date_naive()
    }

    async fn sleep(&self, duration: Duration);

    async fn sleep_until(&self, instant: tokio::time::Instant);
}

#[derive(Clone, Copy)]
pub struct DefaultClock;

#[async_trait]
impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    async fn sleep_until(&self, instant: tokio::time::Instant) {
        tokio::time::sleep_until(instant).await;
    }
}

#[async_trait]
impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn time(&self) -> DateTime<Utc> {
        (**self).time()
    }

    fn instant(&self) -> Instant {
        (**self).instant()
    }

    fn today(&self) -> NaiveDate {
        (**self).today()
    }

    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await
    }

    async fn sleep_until(&self, instant: tokio::time::Instant) {
        (**self).sleep_until(instant).await
    }
}
