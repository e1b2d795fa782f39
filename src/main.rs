use std::fs::OpenOptions;
use std::io;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pocketmanager::commands::{self, CommandError};
use pocketmanager::core::config::{self, CliOverrides, DataPaths, ResolvedConfig};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use tokio::runtime::Runtime;

#[derive(Parser)]
#[command(
    name = "pocketmanager",
    version,
    about = "Browse, prune and health-check a local mirror of your Pocket links"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the data directory and an empty link store
    Init,
    /// Delete the link store and sync state, then init again
    Reset,
    /// Print link counts
    Stat,
    /// Fetch links changed since the last update from Pocket
    Update,
    /// Check the http status of every stored link
    Check {
        /// Maximum number of requests in flight
        #[arg(short, long)]
        concurrency: Option<usize>,
        /// Per-request timeout in seconds
        #[arg(short, long)]
        timeout: Option<u64>,
    },
    /// Browse links interactively
    Display,
}

fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let Some(paths) = DataPaths::default_location() else {
        eprintln!("ERROR: could not determine the home directory");
        return ExitCode::FAILURE;
    };
    init_logger(&paths);

    match execute(args.command, &paths) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("ERROR: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Log to a file in the data directory so output never lands on the
/// alternate screen. Before `init` there is nowhere to write, so logging
/// stays off.
fn init_logger(paths: &DataPaths) {
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = OpenOptions::new().create(true).append(true).open(&paths.log) {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }
}

fn execute(command: Command, paths: &DataPaths) -> Result<(), CommandError> {
    log::info!("Pocket Manager starting up");

    match command {
        Command::Init => commands::init(paths),
        Command::Reset => commands::reset(paths),
        Command::Stat => commands::stat(paths).map(|_| ()),
        Command::Update => {
            let config = resolve_config(paths, CliOverrides::default())?;
            let client = commands::pocket_client(&config)?;
            runtime()?.block_on(commands::update(paths, &client))?;
            Ok(())
        }
        Command::Check {
            concurrency,
            timeout,
        } => {
            let overrides = CliOverrides {
                concurrency,
                timeout_secs: timeout,
            };
            let config = resolve_config(paths, overrides)?;
            let prober = commands::build_prober(&config);
            runtime()?.block_on(commands::check(paths, &prober))?;
            Ok(())
        }
        Command::Display => {
            let config = resolve_config(paths, CliOverrides::default())?;
            // The viewer loop is synchronous and drives async work through
            // this handle, so it must not run inside the runtime itself.
            let runtime = runtime()?;
            commands::display(paths, &config, runtime.handle().clone())
        }
    }
}

fn resolve_config(paths: &DataPaths, overrides: CliOverrides) -> Result<ResolvedConfig, CommandError> {
    let file_config = config::load_config(&paths.config)?;
    Ok(config::resolve(&file_config, overrides))
}

fn runtime() -> io::Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
}
