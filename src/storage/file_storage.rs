use std::{
    path::{Path, PathBuf},
    time::SystemTime,
};

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    fs::operations::{read_locked, write_replacing},
    model::{BinSet, Configuration, Report},
    utils::time::{date_to_report_name, report_name_to_date},
};

use super::{
    entities::{BinsEntity, ConfigEntity, SCHEMA_VERSION},
    error::StorageError,
    migrate::{
        is_current, migrate_legacy_bins, migrate_legacy_config, schema_version, LegacyConfig,
    },
    Storage,
};

const REPORT_EXTENSION: &str = "json";

/// The main realization of [Storage]. Everything lives under one application directory:
///
/// ```text
/// config/all.json
/// config/bins.json
/// reports/<YY-MM-DD>.json
/// ```
pub struct FileStorage {
    config_file: PathBuf,
    bins_file: PathBuf,
    report_dir: PathBuf,
}

impl FileStorage {
    pub fn new(app_dir: &Path) -> Result<Self, StorageError> {
        let config_dir = app_dir.join("config");
        let report_dir = app_dir.join("reports");
        for dir in [&config_dir, &report_dir] {
            std::fs::create_dir_all(dir).map_err(StorageError::io(dir))?;
        }

        Ok(Self {
            config_file: config_dir.join("all.json"),
            bins_file: config_dir.join("bins.json"),
            report_dir,
        })
    }

    fn report_path(&self, date: NaiveDate) -> PathBuf {
        self.report_dir
            .join(date_to_report_name(date))
            .with_extension(REPORT_EXTENSION)
    }

    async fn write_json(path: &Path, value: &impl Serialize) -> Result<(), StorageError> {
        let mut buffer = serde_json::to_vec_pretty(value).map_err(StorageError::malformed(path))?;
        buffer.push(b'\n');
        write_replacing(path, &buffer)
            .await
            .map_err(StorageError::io(path))
    }

    async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
        let Some(content) = read_locked(path).await.map_err(StorageError::io(path))? else {
            return Ok(None);
        };
        // Bytes go to serde_json as they are, invalid UTF-8 is malformed content like any other.
        serde_json::from_slice(&content)
            .map(Some)
            .map_err(StorageError::malformed(path))
    }

    fn legacy_config(path: &Path, value: Value) -> Result<LegacyConfig, StorageError> {
        migrate_legacy_config(value).map_err(|source| StorageError::Migration {
            path: path.to_owned(),
            source,
        })
    }

    /// Whether the document is written in the current schema. Unversioned documents need a
    /// migration.
    fn check_version(path: &Path, value: &Value) -> Result<bool, StorageError> {
        match schema_version(value) {
            None => Ok(false),
            Some(version) if is_current(version) => Ok(true),
            Some(version) => Err(StorageError::UnsupportedVersion {
                path: path.to_owned(),
                version,
                supported: SCHEMA_VERSION,
            }),
        }
    }

    fn entity<T: DeserializeOwned>(path: &Path, value: Value) -> Result<T, StorageError> {
        serde_json::from_value(value).map_err(StorageError::malformed(path))
    }

    async fn upgrade_config(&self, value: Value) -> Result<Configuration, StorageError> {
        let path = &self.config_file;
        let legacy = Self::legacy_config(path, value)?;

        if let Some(bins) = legacy.bins {
            if self.bins_file.exists() {
                warn!("Dropping bins embedded into {path:?}, {:?} already exists", self.bins_file);
            } else {
                info!("Moving {} bins from {path:?} into {:?}", bins.len(), self.bins_file);
                self.save_bins(&bins).await?;
            }
        }

        Self::write_json(path, &legacy.config).await?;
        info!("Migrated {path:?} to schema version {SCHEMA_VERSION}");
        Ok(legacy.config.into())
    }

    async fn upgrade_bins(&self, value: Value) -> Result<BinSet, StorageError> {
        let path = &self.bins_file;
        let bins = migrate_legacy_bins(value).map_err(|source| StorageError::Migration {
            path: path.clone(),
            source,
        })?;
        self.save_bins(&bins).await?;
        info!("Migrated {path:?} to schema version {SCHEMA_VERSION}");
        Ok(bins)
    }
}

impl Storage for FileStorage {
    async fn load_config(&self) -> Result<Configuration, StorageError> {
        let path = &self.config_file;
        let Some(value) = Self::read_json::<Value>(path).await? else {
            info!("{path:?} missing, generating from defaults");
            let config = Configuration::default();
            self.save_config(&config).await?;
            return Ok(config);
        };

        if Self::check_version(path, &value)? {
            Ok(Self::entity::<ConfigEntity>(path, value)?.into())
        } else {
            self.upgrade_config(value).await
        }
    }

    async fn peek_config(&self) -> Result<Configuration, StorageError> {
        let path = &self.config_file;
        let Some(value) = Self::read_json::<Value>(path).await? else {
            return Ok(Configuration::default());
        };

        if Self::check_version(path, &value)? {
            Ok(Self::entity::<ConfigEntity>(path, value)?.into())
        } else {
            Ok(Self::legacy_config(path, value)?.config.into())
        }
    }

    async fn save_config(&self, config: &Configuration) -> Result<(), StorageError> {
        debug!("Saving configuration {config:?}");
        Self::write_json(&self.config_file, &ConfigEntity::from(config)).await
    }

    async fn load_bins(&self) -> Result<BinSet, StorageError> {
        let path = &self.bins_file;
        let Some(value) = Self::read_json::<Value>(path).await? else {
            info!("{path:?} missing, generating from defaults");
            let bins = BinSet::default_set();
            self.save_bins(&bins).await?;
            return Ok(bins);
        };

        if Self::check_version(path, &value)? {
            let bins: BinSet = Self::entity::<BinsEntity>(path, value)?.into();
            if let Err(e) = bins.verify() {
                warn!("Bins in {path:?} break the naming rules: {e}");
            }
            Ok(bins)
        } else {
            self.upgrade_bins(value).await
        }
    }

    async fn save_bins(&self, bins: &BinSet) -> Result<(), StorageError> {
        debug!("Saving {} bins", bins.len());
        Self::write_json(&self.bins_file, &BinsEntity::from(bins)).await
    }

    async fn find_report(&self, date: NaiveDate) -> Result<Option<Report>, StorageError> {
        Self::read_json::<Report>(&self.report_path(date)).await
    }

    async fn load_report(&self, date: NaiveDate) -> Result<Report, StorageError> {
        if let Some(report) = self.find_report(date).await? {
            return Ok(report);
        }

        info!("Generating report for {date}");
        let report = Report::seeded(&self.load_bins().await?);
        self.save_report(date, &report).await?;
        Ok(report)
    }

    async fn save_report(&self, date: NaiveDate, report: &Report) -> Result<(), StorageError> {
        Self::write_json(&self.report_path(date), report).await
    }

    async fn list_report_dates(&self) -> Result<Vec<NaiveDate>, StorageError> {
        let dir = &self.report_dir;
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(StorageError::io(dir))?;

        let mut dates = Vec::<(Option<SystemTime>, NaiveDate)>::new();
        while let Some(entry) = entries.next_entry().await.map_err(StorageError::io(dir))? {
            let path = entry.path();
            let date = path
                .extension()
                .filter(|v| *v == REPORT_EXTENSION)
                .and(path.file_stem())
                .and_then(|v| v.to_str())
                .and_then(report_name_to_date);
            let Some(date) = date else {
                warn!("Skipping {path:?}, it is not a report");
                continue;
            };

            let metadata = entry.metadata().await.map_err(StorageError::io(&path))?;
            // Not every filesystem records creation time
            let stamp = metadata.created().or_else(|_| metadata.modified()).ok();
            dates.push((stamp, date));
        }

        dates.sort();
        Ok(dates.into_iter().map(|v| v.1).collect())
    }
}
