use async_trait::async_trait;
use chrono::NaiveDate;

use crate::model::Report;

/// Answer of a remote service receiving reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    NotConfigured,
    Synced,
    Rejected { details: String },
}

/// Optional mirror of local reports on a remote service. Local files stay the source of truth, a
/// failed push never fails the operation that produced the report.
#[async_trait]
pub trait RemoteSync: Send + Sync {
    async fn push_report(&self, date: NaiveDate, report: &Report) -> anyhow::Result<SyncStatus>;
}

/// Used when no remote service is set up.
pub struct NoopSync;

#[async_trait]
impl RemoteSync for NoopSync {
    async fn push_report(&self, _date: NaiveDate, _report: &Report) -> anyhow::Result<SyncStatus> {
        Ok(SyncStatus::NotConfigured)
    }
}
