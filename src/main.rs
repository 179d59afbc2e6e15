mod categorizer;
mod cli;
mod db;
mod error;
mod fmt;
mod generic;
mod importer;
mod models;
mod normalize;
mod parsers;
mod settings;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{CategoriesCommands, Cli, Commands, RulesCommands};

fn init_tracing() {
    let fallback = settings::load_settings().log_level;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Status => cli::status::run(),
        Commands::Banks => cli::banks::run(),
        Commands::Detect { file } => cli::detect::run(&file),
        Commands::Import { file, bank, columns } => {
            cli::import::run(&file, bank.as_deref(), columns.as_deref())
        }
        Commands::Categorize => cli::categorize::run(),
        Commands::Rules { command } => match command {
            RulesCommands::Add {
                category,
                keyword,
                priority,
                field,
                op,
                value,
                value2,
            } => cli::rules::add(&category, keyword, priority, field, op, value, value2),
            RulesCommands::List => cli::rules::list(),
            RulesCommands::Delete { id } => cli::rules::delete(id),
            RulesCommands::Apply => cli::rules::apply(),
        },
        Commands::Categories { command } => match command {
            CategoriesCommands::Add {
                name,
                group,
                color,
                icon,
            } => cli::categories::add(&name, &group, &color, &icon),
            CategoriesCommands::List => cli::categories::list(),
            CategoriesCommands::Delete { name } => cli::categories::delete(&name),
        },
        Commands::History => cli::history::run(),
        Commands::Export { output } => cli::export::run(output),
        Commands::Completions { shell } => cli::completions(shell),
    };

    if let Err(e) = result {
        tracing::debug!(kind = ?e.kind(), "command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
