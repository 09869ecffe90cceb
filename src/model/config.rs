use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_TOTAL_HOURS: f64 = 8.;
pub const DEFAULT_REMINDER_MINUTES: f64 = 10.;

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("{setting} must be a positive number, got {value}")]
    NotPositive { setting: &'static str, value: f64 },
}

/// Installation wide settings. Bin definitions are kept in their own file, see
/// [BinSet](super::BinSet).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Configuration {
    /// Length of a working day. Logged units are compared against it.
    pub total_hours: f64,
    /// Minutes between two "log your time" reminders.
    pub reminder_minutes: f64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            total_hours: DEFAULT_TOTAL_HOURS,
            reminder_minutes: DEFAULT_REMINDER_MINUTES,
        }
    }
}

impl Configuration {
    pub fn with_total_hours(self, total_hours: f64) -> Result<Self, SettingsError> {
        Ok(Self {
            total_hours: positive("total_hours", total_hours)?,
            ..self
        })
    }

    pub fn with_reminder_minutes(self, reminder_minutes: f64) -> Result<Self, SettingsError> {
        Ok(Self {
            reminder_minutes: positive("reminder_minutes", reminder_minutes)?,
            ..self
        })
    }

    /// Interval between reminders. Values that can't form a sane interval (hand edited files)
    /// fall back to the default one.
    pub fn reminder_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.reminder_minutes * 60.)
            .ok()
            .filter(|v| !v.is_zero())
            .unwrap_or_else(|| Duration::from_secs_f64(DEFAULT_REMINDER_MINUTES * 60.))
    }
}

fn positive(setting: &'static str, value: f64) -> Result<f64, SettingsError> {
    if value.is_finite() && value > 0. {
        Ok(value)
    } else {
        Err(SettingsError::NotPositive { setting, value })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{Configuration, SettingsError};

    #[test]
    fn test_defaults() {
        let config = Configuration::default();
        assert_eq!(config.total_hours, 8.);
        assert_eq!(config.reminder_minutes, 10.);
        assert_eq!(config.reminder_interval(), Duration::from_secs(600));
    }

    #[test]
    fn test_rejects_non_positive_settings() {
        let config = Configuration::default();
        assert_eq!(
            config.with_total_hours(0.),
            Err(SettingsError::NotPositive {
                setting: "total_hours",
                value: 0.
            })
        );
        assert!(config.with_reminder_minutes(f64::NAN).is_err());
        assert_eq!(
            config.with_reminder_minutes(0.5).unwrap().reminder_interval(),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_broken_interval_falls_back() {
        let config = Configuration {
            total_hours: 8.,
            reminder_minutes: -3.,
        };
        assert_eq!(config.reminder_interval(), Duration::from_secs(600));
    }
}
