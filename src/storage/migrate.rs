//! Upgrades of configuration files written before the schema carried a version.
//!
//! Older layouts differ in a few ways:
//!  - `value` of a setting may be a string, as it came out of a text input.
//!  - `time_bins` lived inside `all.json`, first as an object keyed by bin name and later as an
//!    array. Bins now have their own file.
//!  - `bins.json` had no version field.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::{
    config::{DEFAULT_REMINDER_MINUTES, DEFAULT_TOTAL_HOURS},
    BinDefinition, BinError, BinSet,
};

use super::entities::{
    ConfigEntity, SettingEntity, REMINDER_MINUTES_DESCRIPTION, SCHEMA_VERSION,
    TOTAL_HOURS_DESCRIPTION,
};

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("expected a json object at the top level")]
    NotAnObject,
    #[error("setting {setting} has a value that is not a number: {value}")]
    InvalidNumber { setting: &'static str, value: Value },
    #[error("time_bins is neither a list nor an object")]
    UnknownBinsShape,
    #[error("legacy bins break the naming rules: {0}")]
    InvalidBins(#[from] BinError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Outcome of upgrading a legacy `all.json`.
#[derive(Debug, PartialEq)]
pub struct LegacyConfig {
    pub config: ConfigEntity,
    /// Bins that were embedded into the configuration file.
    pub bins: Option<BinSet>,
}

/// Reads the schema version of a file. `None` means the file predates versioning.
pub fn schema_version(value: &Value) -> Option<u64> {
    value.get("version").and_then(Value::as_u64).filter(|v| *v > 0)
}

pub fn is_current(version: u64) -> bool {
    version == u64::from(SCHEMA_VERSION)
}

pub fn migrate_legacy_config(mut value: Value) -> Result<LegacyConfig, MigrationError> {
    let object = value.as_object_mut().ok_or(MigrationError::NotAnObject)?;

    let bins = object.remove("time_bins").map(migrate_time_bins).transpose()?;

    let config = ConfigEntity {
        version: SCHEMA_VERSION,
        total_hours: legacy_setting(
            object,
            "total_hours",
            TOTAL_HOURS_DESCRIPTION,
            DEFAULT_TOTAL_HOURS,
        )?,
        reminder_minutes: legacy_setting(
            object,
            "reminder_minutes",
            REMINDER_MINUTES_DESCRIPTION,
            DEFAULT_REMINDER_MINUTES,
        )?,
    };

    Ok(LegacyConfig { config, bins })
}

/// Upgrades a `bins.json` without a version.
pub fn migrate_legacy_bins(mut value: Value) -> Result<BinSet, MigrationError> {
    let object = value.as_object_mut().ok_or(MigrationError::NotAnObject)?;
    let bins = object
        .remove("time_bins")
        .ok_or(MigrationError::UnknownBinsShape)?;
    migrate_time_bins(bins)
}

/// Object keys keep their order in the file, so the bins keep the order the user gave them.
fn migrate_time_bins(value: Value) -> Result<BinSet, MigrationError> {
    let bins: Vec<BinDefinition> = match value {
        Value::Array(_) => serde_json::from_value(value)?,
        Value::Object(bins) => bins
            .into_iter()
            .map(|(name, entry)| {
                let text = |key: &str| entry.get(key).and_then(Value::as_str).map(str::to_owned);
                BinDefinition {
                    nice_name: text("nice_name").unwrap_or_else(|| name.clone()),
                    description: text("description").unwrap_or_default(),
                    name,
                }
            })
            .collect(),
        _ => return Err(MigrationError::UnknownBinsShape),
    };
    Ok(BinSet::validated(bins)?)
}

fn legacy_setting(
    object: &Map<String, Value>,
    setting: &'static str,
    description: &str,
    default: f64,
) -> Result<SettingEntity, MigrationError> {
    let Some(entry) = object.get(setting) else {
        return Ok(SettingEntity::new(description, default));
    };

    let (raw, stored_description) = match entry {
        Value::Object(fields) => (
            fields.get("value"),
            fields.get("description").and_then(Value::as_str),
        ),
        other => (Some(other), None),
    };

    let number = match raw {
        None => Some(default),
        Some(Value::Number(v)) => v.as_f64(),
        Some(Value::String(v)) => v.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    let value = number.ok_or_else(|| MigrationError::InvalidNumber {
        setting,
        value: raw.cloned().unwrap_or(Value::Null),
    })?;

    Ok(SettingEntity::new(
        stored_description.unwrap_or(description),
        value,
    ))
}
