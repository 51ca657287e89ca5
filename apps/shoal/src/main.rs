mod cli;
mod commands;
mod fmt;
mod progress;
mod settings;
mod tree;

use anyhow::Result;
use clap::Parser;

use shoal_rpc::TransmissionClient;

use crate::cli::{Cli, Commands, MappingsCommand};
use crate::settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Default to WARN level if RUST_LOG is not set
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "warn");
    }
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut settings = Settings::load();
    let client = TransmissionClient::connect(&cli.rpc_url)?;

    match cli.command {
        Commands::List => commands::list(&client).await?,
        Commands::Details { ids, files } => {
            commands::details(&client, &settings, &ids, files).await?;
        }
        Commands::Start { ids } => commands::start(&client, &ids).await?,
        Commands::Stop { ids } => commands::stop(&client, &ids).await?,
        Commands::Add { link } => commands::add(&client, &link).await?,
        Commands::Move { location, ids } => {
            commands::move_torrents(&client, &ids, &location).await?;
        }
        Commands::Rename { id, path, name } => {
            commands::rename(&client, id, &path, &name).await?;
        }
        Commands::Remove { ids, delete_data } => {
            commands::remove(&client, &ids, delete_data).await?;
        }
        Commands::Session => commands::session(&client).await?,
        Commands::SessionSet { key, value } => {
            commands::session_set(&client, &key, &value).await?;
        }
        Commands::Watch { ids, interval } => {
            commands::watch(&client, &mut settings, ids, interval).await?;
        }
        Commands::Search { term } => commands::search(&cli.search_url, &term).await?,
        Commands::Mappings { command } => match command {
            MappingsCommand::List => commands::mappings_list(&settings),
            MappingsCommand::Add { base, path } => {
                commands::mappings_add(&mut settings, base, path)?;
            }
            MappingsCommand::Remove { base } => {
                commands::mappings_remove(&mut settings, &base)?;
            }
        },
    }

    Ok(())
}
