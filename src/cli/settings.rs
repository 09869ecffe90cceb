use anyhow::Result;
use clap::Parser;

use crate::{
    session::Presenter,
    storage::Storage,
    tracker::{update_settings, SettingsChange},
};

use super::terminal::TerminalPresenter;

#[derive(Debug, Parser)]
pub struct ConfigCommand {
    #[arg(long, allow_negative_numbers = true, help = "Length of the working day in hours")]
    total_hours: Option<f64>,
    #[arg(long, allow_negative_numbers = true, help = "Minutes between reminders")]
    reminder_minutes: Option<f64>,
}

impl From<ConfigCommand> for SettingsChange {
    fn from(value: ConfigCommand) -> Self {
        Self {
            total_hours: value.total_hours,
            reminder_minutes: value.reminder_minutes,
        }
    }
}

/// Without options shows the settings, otherwise applies the given ones.
pub async fn process_config_command(command: ConfigCommand, storage: &impl Storage) -> Result<()> {
    let change = SettingsChange::from(command);
    let config = if change.is_empty() {
        storage.load_config().await?
    } else {
        update_settings(storage, change).await?
    };

    TerminalPresenter.show_settings(&config, &storage.load_bins().await?);
    Ok(())
}
