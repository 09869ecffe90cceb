use anyhow::Result;
use clap::Subcommand;

use crate::{
    model::{BinDefinition, BinUpdate},
    session::Presenter,
    storage::Storage,
    tracker::{add_bin, delete_bin, edit_bin},
};

use super::terminal::TerminalPresenter;

#[derive(Debug, Subcommand)]
pub enum BinsCommand {
    #[command(about = "List defined bins")]
    List,
    #[command(about = "Add a bin")]
    Add {
        #[arg(help = "Key used inside reports")]
        name: String,
        #[arg(help = "Name shown to the user")]
        nice_name: String,
        #[arg(default_value = "")]
        description: String,
    },
    #[command(about = "Edit a bin, found by name or nice name")]
    Edit {
        #[arg(value_name = "NAME")]
        bin: String,
        #[arg(long = "name")]
        new_name: Option<String>,
        #[arg(long)]
        nice_name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    #[command(about = "Delete a bin. Reports keep what was logged into it")]
    Delete { name: String },
}

pub async fn process_bins_command(command: BinsCommand, storage: &impl Storage) -> Result<()> {
    let mut presenter = TerminalPresenter;
    match command {
        BinsCommand::List => presenter.show_bins(&storage.load_bins().await?),
        BinsCommand::Add {
            name,
            nice_name,
            description,
        } => {
            let bin = add_bin(storage, BinDefinition::new(name, nice_name, description)).await?;
            presenter.show_message(&format!("Bin {} added", bin.nice_name));
        }
        BinsCommand::Edit {
            bin,
            new_name,
            nice_name,
            description,
        } => {
            let update = BinUpdate {
                name: new_name,
                nice_name,
                description,
            };
            let bin = edit_bin(storage, &bin, update).await?;
            presenter.show_message(&format!("Bin {} edited", bin.nice_name));
        }
        BinsCommand::Delete { name } => {
            let bin = delete_bin(storage, &name).await?;
            presenter.show_message(&format!("Bin {} has been deleted", bin.nice_name));
        }
    }
    Ok(())
}
