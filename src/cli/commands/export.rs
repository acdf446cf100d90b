use clap::Subcommand;
use std::io::Write;

use crate::database::models::client::{self, Client};
use crate::database::{manager, Repository};
use crate::transfer;

#[derive(Subcommand)]
pub enum ExportCommands {
    #[command(about = "Export all clients as CSV")]
    Clients {
        #[arg(long, help = "Write to this file instead of stdout")]
        output: Option<String>,
    },
}

pub async fn handle(cmd: ExportCommands) -> anyhow::Result<()> {
    match cmd {
        ExportCommands::Clients { output } => {
            let repo: Repository<Client> = Repository::new(client::TABLE, manager::pool().await?);
            let clients = repo.all_ordered("created_at").await?;
            let csv = transfer::export_clients_csv(&clients)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, csv)?;
                    println!("Wrote {} clients to {}", clients.len(), path);
                }
                None => std::io::stdout().write_all(&csv)?,
            }
            Ok(())
        }
    }
}
