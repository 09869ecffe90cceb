//!  Storage is organized through [file_storage::FileStorage].
//!  The basic idea is:
//!   - There is an application directory with `config` and `reports` subdirectories.
//!   - Settings and bin definitions are separate json files carrying a schema version.
//!   - Every calendar day gets its own report file, created on first access.
//!   - Files are replaced as a whole, never edited in place.

pub mod entities;
pub mod error;
pub mod file_storage;
pub mod migrate;
pub mod sync;

use std::{future::Future, ops::Deref};

use chrono::NaiveDate;

use crate::model::{BinSet, Configuration, Report};

pub use error::StorageError;
pub use file_storage::FileStorage;

/// Interface for abstracting storage of settings and reports.
pub trait Storage {
    /// Returns the configuration, writing the default one on first run.
    fn load_config(&self) -> impl Future<Output = Result<Configuration, StorageError>> + Send;

    /// Reads the configuration without ever writing. A missing file gives the default one and a
    /// legacy file is upgraded in memory only.
    fn peek_config(&self) -> impl Future<Output = Result<Configuration, StorageError>> + Send;

    fn save_config(
        &self,
        config: &Configuration,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Returns bin definitions, writing the default set on first run.
    fn load_bins(&self) -> impl Future<Output = Result<BinSet, StorageError>> + Send;

    fn save_bins(&self, bins: &BinSet) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Returns the report for a day if one was stored.
    fn find_report(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Option<Report>, StorageError>> + Send;

    /// Returns the report for a day. A missing report is created with a zero for every bin.
    fn load_report(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Report, StorageError>> + Send;

    fn save_report(
        &self,
        date: NaiveDate,
        report: &Report,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Dates of all stored reports, oldest file first.
    fn list_report_dates(&self)
        -> impl Future<Output = Result<Vec<NaiveDate>, StorageError>> + Send;
}

impl<T: Deref> Storage for T
where
    T::Target: Storage,
{
    fn load_config(&self) -> impl Future<Output = Result<Configuration, StorageError>> + Send {
        self.deref().load_config()
    }

    fn peek_config(&self) -> impl Future<Output = Result<Configuration, StorageError>> + Send {
        self.deref().peek_config()
    }

    fn save_config(
        &self,
        config: &Configuration,
    ) -> impl Future<Output = Result<(), StorageError>> + Send {
        self.deref().save_config(config)
    }

    fn load_bins(&self) -> impl Future<Output = Result<BinSet, StorageError>> + Send {
        self.deref().load_bins()
    }

    fn save_bins(&self, bins: &BinSet) -> impl Future<Output = Result<(), StorageError>> + Send {
        self.deref().save_bins(bins)
    }

    fn find_report(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Option<Report>, StorageError>> + Send {
        self.deref().find_report(date)
    }

    fn load_report(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Report, StorageError>> + Send {
        self.deref().load_report(date)
    }

    fn save_report(
        &self,
        date: NaiveDate,
        report: &Report,
    ) -> impl Future<Output = Result<(), StorageError>> + Send {
        self.deref().save_report(date, report)
    }

    fn list_report_dates(
        &self,
    ) -> impl Future<Output = Result<Vec<NaiveDate>, StorageError>> + Send {
        self.deref().list_report_dates()
    }
}
