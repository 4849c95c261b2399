//! Slate CLI - Offline-first task lists from the command line
//!
//! Every command works without a network; `slate sync` reconciles with the
//! server whenever one is reachable.

mod cli;
mod commands;
mod error;
mod profile;

use clap::Parser;

use cli::{Cli, Commands, ListCommands, TaskCommands};
use error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("slate=info".parse().expect("valid directive")),
        )
        .init();

    let cli = Cli::parse();
    let db_path = cli.db_path;

    match cli.command {
        Commands::List { command } => match command {
            ListCommands::Add { name, color } => {
                commands::lists::run_add(&name, color.as_deref(), db_path).await?;
            }
            ListCommands::Ls { json } => commands::lists::run_ls(json, db_path).await?,
            ListCommands::Rename { id, name } => {
                commands::lists::run_rename(&id, &name, db_path).await?;
            }
            ListCommands::Rm { id } => commands::lists::run_rm(&id, db_path).await?,
        },
        Commands::Task { command } => match command {
            TaskCommands::Add {
                list,
                title,
                description,
            } => {
                commands::tasks::run_add(&list, &title, description.as_deref(), db_path).await?;
            }
            TaskCommands::Ls { list, json } => {
                commands::tasks::run_ls(&list, json, db_path).await?;
            }
            TaskCommands::Done { id, undo } => {
                commands::tasks::run_done(&id, undo, db_path).await?;
            }
            TaskCommands::Rm { id } => commands::tasks::run_rm(&id, db_path).await?,
        },
        Commands::Sync {
            full,
            watch,
            interval_secs,
        } => commands::sync::run_sync(full, watch, interval_secs, db_path).await?,
        Commands::Login {
            api_url,
            token,
            username,
            email,
        } => commands::session::run_login(&api_url, &token, username.as_deref(), email.as_deref())?,
        Commands::Logout => commands::session::run_logout(db_path).await?,
        Commands::Whoami => commands::session::run_whoami()?,
        Commands::Status => commands::status::run_status(db_path).await?,
    }

    Ok(())
}
