//! Derived views over daily reports. Reports only store counts, everything shown to the user is
//! computed here.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use futures::{stream, StreamExt, TryStreamExt};

use crate::{
    model::{BinSet, Report},
    storage::{Storage, StorageError},
    utils::percentage::{share_percentage, Percentage},
};

/// Number of report files read at the same time while collecting history.
const HISTORY_READ_CONCURRENCY: usize = 4;

/// One line of a report as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub label: String,
    pub count: u64,
    /// False for entries whose bin was deleted since.
    pub known: bool,
}

pub fn totals_for(report: &Report) -> &BTreeMap<String, u64> {
    report.entries()
}

/// Units logged across every bin present in the report.
pub fn sum_all(report: &Report) -> u64 {
    totals_for(report).values().sum()
}

/// How much of the working day is already logged.
pub fn logged_share(logged: u64, total_hours: f64) -> Percentage {
    share_percentage(logged as f64, total_hours)
}

/// Lines in bin order labelled with nice names. Entries of bins that no longer exist follow
/// under their raw names.
pub fn labelled(report: &Report, bins: &BinSet) -> Vec<ReportLine> {
    let known = bins.iter().map(|bin| ReportLine {
        label: bin.nice_name.clone(),
        count: report.get(&bin.name),
        known: true,
    });

    let unknown = report
        .entries()
        .iter()
        .filter(|(name, _)| !bins.iter().any(|bin| &bin.name == *name))
        .map(|(name, count)| ReportLine {
            label: name.clone(),
            count: *count,
            known: false,
        });

    known.chain(unknown).collect()
}

/// The `max_count` most recent reports, oldest first.
pub async fn historic(
    storage: &impl Storage,
    max_count: usize,
) -> Result<Vec<(NaiveDate, Report)>, StorageError> {
    let dates = storage.list_report_dates().await?;
    let skip = dates.len().saturating_sub(max_count);

    stream::iter(dates.into_iter().skip(skip))
        .map(|date| async move { storage.load_report(date).await.map(|v| (date, v)) })
        .buffered(HISTORY_READ_CONCURRENCY)
        .try_collect()
        .await
}
