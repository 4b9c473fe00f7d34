mod cli;

use anyhow::Result;
use clap::Parser;
use cli::commands;
use convograph::error::display_error;

fn main() {
    // Setup tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = cli::Cli::parse();

    // Run the command and handle errors gracefully
    if let Err(err) = run_command(cli) {
        display_error(&err);
        std::process::exit(1);
    }
}

fn run_command(cli: cli::Cli) -> Result<()> {
    use cli::Commands;

    match cli.command {
        Commands::Init { path } => commands::init::handle(&path),
        Commands::Parse { file, json } => commands::parse::handle(file.as_deref(), json),
        Commands::Search { file, filters } => commands::search::handle(file.as_deref(), &filters),
        Commands::Show { file, conversation } => commands::show::handle(file.as_deref(), conversation),
        Commands::Speakers { file } => commands::speakers::handle(file.as_deref()),
        Commands::Export {
            file,
            output,
            no_speaker_text,
            no_conditions,
            no_effects,
            no_position,
            filters,
        } => commands::export::handle(commands::export::ExportArgs {
            file: file.as_deref(),
            output: &output,
            no_speaker_text,
            no_conditions,
            no_effects,
            no_position,
            filters: &filters,
        }),
        Commands::Config { action } => commands::config::handle(action),
    }
}
