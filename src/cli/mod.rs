pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "realty")]
#[command(about = "Realty CLI - administrative tooling for the Realty API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Database schema management")]
    Schema {
        #[command(subcommand)]
        cmd: commands::schema::SchemaCommands,
    },

    #[command(about = "User account management")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Bulk data export")]
    Export {
        #[command(subcommand)]
        cmd: commands::export::ExportCommands,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Schema { cmd } => commands::schema::handle(cmd).await,
        Commands::User { cmd } => commands::user::handle(cmd).await,
        Commands::Export { cmd } => commands::export::handle(cmd).await,
    }
}
