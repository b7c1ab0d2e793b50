pub mod output;
pub mod record;
pub mod report;
pub mod shell;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use record::{process_record_command, RecordCommand};
use report::{process_report_command, ReportCommand};
use tracing::{debug, level_filters::LevelFilter};

use crate::{
    session::Session,
    storage::{image_store::DirectoryImageStorage, log_file::CsvLogStorage},
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, CLI_PREFIX},
    },
};

/// Session over the on-disk layout used by the cli.
pub type FoodSession = Session<CsvLogStorage, DirectoryImageStorage>;

const DATASET_DIR: &str = "dataset";
const LOG_FILE: &str = "food_log.csv";

#[derive(Parser, Debug)]
#[command(name = "Foodlog", version, long_about = None)]
#[command(about = "Application for logging food photos and analyzing what you eat", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        help = "Start with an empty log. The first saved photo replaces the stored log"
    )]
    fresh: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(flatten)]
    Session(SessionCommand),
    #[command(about = "Keep one session open and read commands interactively")]
    Shell {},
}

/// Commands that work against an open session. Available both from the command line and from
/// [shell::run_shell].
#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    #[command(about = "Save a food photo under a label")]
    Record {
        #[command(flatten)]
        command: RecordCommand,
    },
    #[command(about = "Display statistics of what was eaten")]
    Report {
        #[command(flatten)]
        command: ReportCommand,
    },
    #[command(about = "Display how many photos were saved for every label")]
    Counts {},
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = args
        .dir
        .map_or_else(create_application_default_path, ensure_dir)?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;

    let mut session = open_session(&app_dir, args.fresh).await?;

    match args.commands {
        Commands::Session(command) => run_session_command(&mut session, command).await,
        Commands::Shell {} => shell::run_shell(&mut session).await,
    }
}

pub async fn open_session(app_dir: &Path, fresh: bool) -> Result<FoodSession> {
    debug!("Opening session in {app_dir:?}");
    let log_storage = CsvLogStorage::new(app_dir.join(LOG_FILE));
    let image_storage = DirectoryImageStorage::new(app_dir.join(DATASET_DIR))?;
    if fresh {
        Ok(Session::new(log_storage, image_storage, Box::new(DefaultClock)))
    } else {
        Session::resume(log_storage, image_storage, Box::new(DefaultClock)).await
    }
}

pub async fn run_session_command(session: &mut FoodSession, command: SessionCommand) -> Result<()> {
    match command {
        SessionCommand::Record { command } => process_record_command(session, command).await,
        SessionCommand::Report { command } => process_report_command(session, command),
        SessionCommand::Counts {} => {
            for count in session.food_counts().iter() {
                println!("{}\t{}", count.count, count.label);
            }
            Ok(())
        }
    }
}
