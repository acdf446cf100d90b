use clap::Subcommand;
use serde_json::json;

use crate::auth::hash_password;
use crate::database::models::user::{self, User};
use crate::database::{manager, Repository};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a user account")]
    Create {
        #[arg(long, help = "Login name, unique")]
        username: String,

        #[arg(long, help = "Email address, unique")]
        email: String,

        #[arg(long, help = "Plaintext password, stored as an Argon2 hash")]
        password: String,

        #[arg(long, default_value = "agent", help = "admin, agent, manager or support")]
        role: String,
    },
}

pub async fn handle(cmd: UserCommands) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Create {
            username,
            email,
            password,
            role,
        } => {
            let mut map = serde_json::Map::new();
            map.insert("username".into(), json!(username));
            map.insert("email".into(), json!(email));
            map.insert("role".into(), json!(role));

            let hash = hash_password(&password)?;
            let cols = user::insert_columns(&map, hash)?;

            let repo: Repository<User> = Repository::new(user::TABLE, manager::pool().await?);
            let created = repo.insert(cols).await?;

            println!("Created user {} ({})", created.username, created.id);
            Ok(())
        }
    }
}
