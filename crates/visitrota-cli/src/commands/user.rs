use std::path::PathBuf;

use chrono::Utc;
use clap::Subcommand;
use visitrota_core::CalendarTokens;

use crate::common::{service, CliResult};

#[derive(Subcommand)]
pub enum UserAction {
    /// Register a user
    Add {
        /// Email address (unique)
        email: String,
        /// Display name
        name: String,
    },
    /// Install OAuth tokens from a JSON file
    SetTokens {
        user_id: String,
        /// Path to a token JSON file produced by the OAuth exchange
        file: PathBuf,
    },
    /// List users
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: UserAction) -> CliResult {
    match action {
        UserAction::Add { email, name } => {
            let user = service()?.create_user(&email, &name, Utc::now())?;
            println!("user created: {} <{}> ({})", user.name, user.email, user.id);
        }
        UserAction::SetTokens { user_id, file } => {
            let raw = std::fs::read_to_string(file)?;
            let tokens: CalendarTokens = serde_json::from_str(&raw)?;
            service()?.set_calendar_tokens(&user_id, tokens)?;
            println!("tokens installed for {user_id}");
        }
        UserAction::List { json } => {
            let users = service()?.users();
            if json {
                println!("{}", serde_json::to_string_pretty(&users)?);
            } else {
                for user in users {
                    let connected = if user.calendar_tokens.is_some() {
                        "connected"
                    } else {
                        "no calendar"
                    };
                    println!("{}  {} <{}>  [{connected}]", user.id, user.name, user.email);
                }
            }
        }
    }
    Ok(())
}
