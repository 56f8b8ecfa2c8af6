mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod ui;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use crate::ui::Console;
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    let console = Console::new();
    if let Err(e) = run_app(&console) {
        console.println(format!("\n❌ Error: {}", e));
        std::process::exit(1);
    }
}

fn run_app(console: &Console) -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone(), console.clone())?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    info!("🚀 repeatskmer v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let threads = cli.threads;
    let command_result = match cli.command {
        Commands::Sequences(args) => {
            info!("Dispatching to 'sequences' command.");
            commands::sequences::run(args, threads, console)
        }
        Commands::Kmer(args) => {
            info!("Dispatching to 'kmer' command.");
            commands::kmer::run(args, threads, console)
        }
        Commands::Pipeline(args) => {
            info!("Dispatching to 'pipeline' command.");
            commands::pipeline::run(args, threads, console)
        }
    };

    match &command_result {
        Ok(_) => {
            info!("✅ Command completed successfully.");
            console.println("✅ Command completed successfully.");
        }
        Err(e) => error!("❌ Command failed: {}", e),
    }

    command_result
}
