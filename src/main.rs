use std::process::ExitCode;

use clap::Parser;

use lexrag::Settings;
use lexrag::cli::{Cli, Commands, commands, report_error};
use lexrag::logging;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Init runs before any settings file exists.
    if let Commands::Init { force } = cli.command {
        return finish(commands::init::run_init(force));
    }

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    logging::init_with_config(&settings.logging);

    if let Err(e) = settings.validate() {
        eprintln!("Configuration error: {e}");
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Config => commands::init::run_config(&settings),
        Commands::Index {
            document,
            force,
            dry_run,
        } => commands::index::run(&settings, document, force, dry_run),
        Commands::Search { query, limit, json } => {
            commands::search::run(&settings, &query, limit, json)
        }
        Commands::Ask { question } => commands::ask::run(&settings, question),
    };
    finish(result)
}

fn finish(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}
