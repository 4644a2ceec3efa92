//! Orunmila CLI - tagged word-list manager

use clap::Parser;
use orunmila::cli::{Cli, Commands};
use orunmila::commands;
use orunmila::config::{self, Settings};
use orunmila::output;
use orunmila::storage;
use orunmila::ui;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    let cli = Cli::parse();
    output::init_quiet(cli.quiet);

    // Initialize logging
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(e) = run(cli) {
        ui::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let file_config = config::load_config(cli.config.as_deref())?;
    let batch_size = match &cli.command {
        Commands::Import { batch_size, .. } => *batch_size,
        _ => None,
    };
    let settings = Settings::resolve(cli.database, batch_size, file_config.as_ref(), &cwd)?;
    tracing::debug!("using db: {}", settings.database.display());

    storage::ensure_schema(&settings.database)?;

    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Commands::Add { tags, words } => {
            commands::run_add(&settings, &tags, &words)?;
        }

        Commands::Import { tags, files, .. } => {
            commands::run_import(&settings, &tags, &files)?;
        }

        Commands::Search(args) => {
            commands::run_search(&settings.database, &args, &mut stdout)?;
        }

        Commands::Describe { text } => {
            commands::run_describe(&settings.database, &text)?;
        }

        Commands::Info => {
            commands::run_info(&settings.database, &mut stdout)?;
        }

        Commands::Vacuum => {
            commands::run_vacuum(&settings.database)?;
        }

        Commands::Stats => {
            commands::run_stats(&settings.database)?;
        }
    }

    Ok(())
}
