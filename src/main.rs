mod budget;
mod cli;
mod error;
mod export;
mod filter;
mod fmt;
mod insight;
mod loader;
mod models;
mod preprocess;
mod report;
mod sample;
mod session;
mod settings;
mod summary;
mod tui;

use clap::Parser;
use tracing_subscriber::{prelude::*, EnvFilter};

use cli::{Cli, Commands, ConfigCommands};

fn init_logging(verbose: bool, dashboard: bool) {
    let from_env = std::env::var("RUST_LOG").is_ok();
    // Log lines would tear the alternate screen.
    if dashboard && !from_env {
        return;
    }

    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if from_env {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, matches!(cli.command, Commands::Dashboard { .. }));

    let result = match cli.command {
        Commands::Validate { file, output } => cli::validate::run(&file, &output),
        Commands::Summary { file, filter, rows } => cli::summary::run(&file, &filter, rows),
        Commands::Budget { file, filter } => cli::budget::run(&file, &filter),
        Commands::Insight { file, filter } => cli::insight::run(&file, &filter),
        Commands::Report {
            file,
            filter,
            output,
            no_ai,
        } => cli::report::run(&file, &filter, &output, no_ai),
        Commands::Export {
            file,
            filter,
            output,
        } => cli::export::run(&file, &filter, &output),
        Commands::Dashboard { file } => cli::dashboard::run(&file),
        Commands::Sample { rows, seed, output } => cli::sample::run(rows, seed, &output),
        Commands::Config { command } => match command {
            ConfigCommands::Show => cli::config::show(),
            ConfigCommands::Set { key, value } => cli::config::set(&key, &value),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
