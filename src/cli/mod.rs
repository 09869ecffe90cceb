pub mod bins;
pub mod input;
pub mod report;
pub mod settings;
pub mod terminal;

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use bins::{process_bins_command, BinsCommand};
use clap::{Parser, Subcommand};
use input::stdin_actions;
use report::{process_report_command, ReportCommand};
use settings::{process_config_command, ConfigCommand};
use terminal::TerminalPresenter;
use tokio_util::sync::CancellationToken;
use tracing::{info, level_filters::LevelFilter};

use crate::{
    session::{shutdown::detect_shutdown, Presenter, SessionController},
    storage::{sync::NoopSync, FileStorage},
    tracker::log_time,
    utils::{
        clock::{Clock, DefaultClock},
        dir::create_application_default_path,
        logging::enable_logging,
    },
};

#[derive(Parser, Debug)]
#[command(name = "whatubinup", version, long_about = None)]
#[command(about = "Terminal application for binning your working time", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Option<Commands>,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Print logs into the console")]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Start an interactive session. Used when no command is given")]
    Session,
    #[command(about = "Log a unit of time into a bin for today")]
    Log { bin: String },
    #[command(about = "Display the report of a day")]
    Report {
        #[command(flatten)]
        command: ReportCommand,
    },
    #[command(about = "Show or change settings")]
    Config {
        #[command(flatten)]
        command: ConfigCommand,
    },
    #[command(about = "Manage bins")]
    Bins {
        #[command(subcommand)]
        command: BinsCommand,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let dir = match args.dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            dir
        }
        None => create_application_default_path()?,
    };

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(&dir.join("logs"), logging_level, args.log)?;
    info!("Using application directory {dir:?}");

    let storage = FileStorage::new(&dir)?;
    let clock = DefaultClock;

    match args.commands.unwrap_or(Commands::Session) {
        Commands::Session => run_session(storage, clock).await,
        Commands::Log { bin } => {
            let logged = log_time(&storage, clock.today(), &bin).await?;
            TerminalPresenter.show_logged(&logged.bin, logged.count);
            Ok(())
        }
        Commands::Report { command } => process_report_command(command, &storage, &clock).await,
        Commands::Config { command } => process_config_command(command, &storage).await,
        Commands::Bins { command } => process_bins_command(command, &storage).await,
    }
}

async fn run_session(storage: FileStorage, clock: DefaultClock) -> Result<()> {
    let shutdown = CancellationToken::new();
    let detector = tokio::spawn(detect_shutdown(shutdown.clone()));

    let mut presenter = TerminalPresenter;
    presenter.show_message("Type `help` to see what you can do, `exit` to leave");

    let result = SessionController::new(
        Arc::new(storage),
        presenter,
        Arc::new(clock),
        Box::new(NoopSync),
        shutdown.clone(),
    )
    .run(stdin_actions())
    .await;

    shutdown.cancel();
    detector.await?;
    result
}
