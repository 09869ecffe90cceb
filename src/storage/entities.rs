use serde::{Deserialize, Serialize};

use crate::model::{BinDefinition, BinSet, Configuration};

/// Version written into every configuration file. Files without one are migrated, see
/// [migrate](super::migrate).
pub const SCHEMA_VERSION: u32 = 1;

pub const TOTAL_HOURS_DESCRIPTION: &str = "Total number of hours in working day";
pub const REMINDER_MINUTES_DESCRIPTION: &str = "After how many minutes would you like a reminder";

/// A setting together with the help text shown next to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingEntity {
    pub description: String,
    pub value: f64,
}

impl SettingEntity {
    pub fn new(description: &str, value: f64) -> Self {
        Self {
            description: description.into(),
            value,
        }
    }
}

/// Layout of `config/all.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntity {
    pub version: u32,
    pub total_hours: SettingEntity,
    pub reminder_minutes: SettingEntity,
}

impl From<&Configuration> for ConfigEntity {
    fn from(value: &Configuration) -> Self {
        Self {
            version: SCHEMA_VERSION,
            total_hours: SettingEntity::new(TOTAL_HOURS_DESCRIPTION, value.total_hours),
            reminder_minutes: SettingEntity::new(
                REMINDER_MINUTES_DESCRIPTION,
                value.reminder_minutes,
            ),
        }
    }
}

impl From<ConfigEntity> for Configuration {
    fn from(value: ConfigEntity) -> Self {
        Self {
            total_hours: value.total_hours.value,
            reminder_minutes: value.reminder_minutes.value,
        }
    }
}

/// Layout of `config/bins.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinsEntity {
    pub version: u32,
    pub time_bins: Vec<BinDefinition>,
}

impl From<&BinSet> for BinsEntity {
    fn from(value: &BinSet) -> Self {
        Self {
            version: SCHEMA_VERSION,
            time_bins: value.as_slice().to_vec(),
        }
    }
}

impl From<BinsEntity> for BinSet {
    fn from(value: BinsEntity) -> Self {
        value.time_bins.into()
    }
}
