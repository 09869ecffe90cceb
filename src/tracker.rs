//! Mutations of persisted state. Used by the interactive session and by one-shot commands alike.
//! Every operation reads the current state from storage and writes the result back right away.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

use crate::{
    model::{BinDefinition, BinError, BinUpdate, Configuration, Report, SettingsError},
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Bin(#[from] BinError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Result of logging a unit of time.
#[derive(Debug)]
pub struct Logged {
    pub bin: BinDefinition,
    pub count: u64,
    pub report: Report,
}

/// Changes to apply to the configuration. `None` keeps the stored value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SettingsChange {
    pub total_hours: Option<f64>,
    pub reminder_minutes: Option<f64>,
}

impl SettingsChange {
    pub fn is_empty(&self) -> bool {
        self.total_hours.is_none() && self.reminder_minutes.is_none()
    }
}

/// Adds one unit to the bin named `key` (name or nice name) in the report of `date`.
pub async fn log_time(
    storage: &impl Storage,
    date: NaiveDate,
    key: &str,
) -> Result<Logged, TrackerError> {
    let bins = storage.load_bins().await?;
    let bin = bins
        .find(key)
        .cloned()
        .ok_or_else(|| BinError::UnknownBin(key.to_owned()))?;

    let mut report = storage.load_report(date).await?;
    let count = report.increment(&bin);
    storage.save_report(date, &report).await?;
    info!("Logged time into {} for {date}, new total {count}", bin.name);

    Ok(Logged { bin, count, report })
}

pub async fn update_settings(
    storage: &impl Storage,
    change: SettingsChange,
) -> Result<Configuration, TrackerError> {
    let mut config = storage.load_config().await?;
    if let Some(total_hours) = change.total_hours {
        config = config.with_total_hours(total_hours)?;
    }
    if let Some(reminder_minutes) = change.reminder_minutes {
        config = config.with_reminder_minutes(reminder_minutes)?;
    }
    storage.save_config(&config).await?;
    info!("New settings applied: {config:?}");
    Ok(config)
}

pub async fn add_bin(
    storage: &impl Storage,
    bin: BinDefinition,
) -> Result<BinDefinition, TrackerError> {
    let mut bins = storage.load_bins().await?;
    let added = bins.add(bin)?.clone();
    storage.save_bins(&bins).await?;
    info!("New bin created: {added:?}");
    Ok(added)
}

pub async fn edit_bin(
    storage: &impl Storage,
    key: &str,
    update: BinUpdate,
) -> Result<BinDefinition, TrackerError> {
    let mut bins = storage.load_bins().await?;
    let edited = bins.edit(key, update)?.clone();
    storage.save_bins(&bins).await?;
    info!("Bin {key} edited: {edited:?}");
    Ok(edited)
}

/// Removes a bin definition. Reports keep their entries for it.
pub async fn delete_bin(storage: &impl Storage, key: &str) -> Result<BinDefinition, TrackerError> {
    let mut bins = storage.load_bins().await?;
    let removed = bins.remove(key)?;
    storage.save_bins(&bins).await?;
    info!("Bin has been deleted: {removed:?}");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use crate::{
        analysis::sum_all,
        model::{BinDefinition, BinError, BinUpdate, Configuration, SettingsError},
        storage::{FileStorage, Storage},
    };

    use super::{
        add_bin, delete_bin, edit_bin, log_time, update_settings, SettingsChange, TrackerError,
    };

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2018, 7, 4).unwrap();

    #[tokio::test]
    async fn test_fresh_install_scenario() -> Result<()> {
        let dir = tempdir()?;
        let storage = FileStorage::new(dir.path())?;

        let config = storage.load_config().await?;
        assert_eq!(config.total_hours, 8.);
        assert_eq!(config.reminder_minutes, 10.);

        for _ in 0..3 {
            log_time(&storage, TEST_DATE, "meetings").await?;
        }

        let report = storage.load_report(TEST_DATE).await?;
        assert_eq!(report.get("meetings"), 3);
        assert_eq!(sum_all(&report), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_log_into_unknown_bin_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let storage = FileStorage::new(dir.path())?;

        let error = log_time(&storage, TEST_DATE, "travel").await.unwrap_err();

        assert!(matches!(
            error,
            TrackerError::Bin(BinError::UnknownBin(ref name)) if name == "travel"
        ));
        assert_eq!(storage.load_report(TEST_DATE).await?.get("travel"), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_bin_once() -> Result<()> {
        let dir = tempdir()?;
        let storage = FileStorage::new(dir.path())?;
        let travel = BinDefinition::new("travel", "Travel", "Time traveling");

        add_bin(&storage, travel.clone()).await?;
        let duplicate = add_bin(&storage, travel).await.unwrap_err();

        assert!(matches!(
            duplicate,
            TrackerError::Bin(BinError::DuplicateName(_))
        ));
        let bins = storage.load_bins().await?;
        assert_eq!(bins.iter().filter(|v| v.name == "travel").count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_deleted_bin_stays_in_report() -> Result<()> {
        let dir = tempdir()?;
        let storage = FileStorage::new(dir.path())?;
        add_bin(&storage, BinDefinition::new("travel", "Travel", "")).await?;
        log_time(&storage, TEST_DATE, "Travel").await?;

        delete_bin(&storage, "travel").await?;

        assert!(storage.load_bins().await?.find("travel").is_none());
        assert_eq!(storage.load_report(TEST_DATE).await?.get("travel"), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_edit_bin_persists() -> Result<()> {
        let dir = tempdir()?;
        let storage = FileStorage::new(dir.path())?;

        edit_bin(
            &storage,
            "meetings",
            BinUpdate {
                nice_name: Some("Calls".into()),
                ..Default::default()
            },
        )
        .await?;

        let bins = storage.load_bins().await?;
        assert_eq!(bins.find("calls").map(|v| v.name.as_str()), Some("meetings"));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_settings_validates_before_saving() -> Result<()> {
        let dir = tempdir()?;
        let storage = FileStorage::new(dir.path())?;

        let error = update_settings(
            &storage,
            SettingsChange {
                total_hours: Some(6.),
                reminder_minutes: Some(-1.),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            error,
            TrackerError::Settings(SettingsError::NotPositive { .. })
        ));
        assert_eq!(storage.load_config().await?, Configuration::default());

        let config = update_settings(
            &storage,
            SettingsChange {
                reminder_minutes: Some(25.),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(config.reminder_minutes, 25.);
        assert_eq!(storage.load_config().await?, config);
        Ok(())
    }
}
