use clap::Subcommand;

use crate::database::{manager, schema};

#[derive(Subcommand)]
pub enum SchemaCommands {
    #[command(about = "Create all tables if they do not exist")]
    Init,
}

pub async fn handle(cmd: SchemaCommands) -> anyhow::Result<()> {
    match cmd {
        SchemaCommands::Init => {
            let pool = manager::pool().await?;
            schema::ensure_schema(&pool).await?;
            println!("Schema is up to date");
            Ok(())
        }
    }
}
