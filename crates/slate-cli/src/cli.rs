use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "slate")]
#[command(about = "Offline-first task lists from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage task lists
    List {
        #[command(subcommand)]
        command: ListCommands,
    },
    /// Manage tasks
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Push local changes and pull server changes
    Sync {
        /// Use the single round-trip endpoint
        #[arg(long)]
        full: bool,
        /// Keep syncing in the background until interrupted
        #[arg(long)]
        watch: bool,
        /// Seconds between cycles in watch mode
        #[arg(long, default_value = "300", value_name = "SECS")]
        interval_secs: u64,
    },
    /// Store the server URL and access token
    Login {
        /// Sync server base URL
        #[arg(long, value_name = "URL")]
        api_url: String,
        /// Bearer access token
        #[arg(long, value_name = "TOKEN")]
        token: String,
        /// Display name for this account
        #[arg(long, value_name = "NAME")]
        username: Option<String>,
        /// Account email
        #[arg(long, value_name = "EMAIL")]
        email: Option<String>,
    },
    /// Clear the stored session
    Logout,
    /// Show the stored identity
    Whoami,
    /// Show pending changes and the last sync time
    Status,
}

#[derive(Subcommand)]
pub enum ListCommands {
    /// Create a new list
    #[command(alias = "new")]
    Add {
        /// List name
        name: Vec<String>,
        /// Hex color, e.g. #3B82F6
        #[arg(long, value_name = "COLOR")]
        color: Option<String>,
    },
    /// Show all lists
    Ls {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rename a list
    Rename {
        /// List ID or unique ID prefix
        id: String,
        /// New name
        name: Vec<String>,
    },
    /// Delete a list and its tasks
    Rm {
        /// List ID or unique ID prefix
        id: String,
    },
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Create a new task in a list
    #[command(alias = "new")]
    Add {
        /// List ID or unique ID prefix
        list: String,
        /// Task title
        title: Vec<String>,
        /// Longer description
        #[arg(long, value_name = "TEXT")]
        description: Option<String>,
    },
    /// Show the tasks in a list
    Ls {
        /// List ID or unique ID prefix
        list: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark a task complete (or pending again with --undo)
    Done {
        /// Task ID or unique ID prefix
        id: String,
        /// Mark the task pending instead
        #[arg(long)]
        undo: bool,
    },
    /// Delete a task
    Rm {
        /// Task ID or unique ID prefix
        id: String,
    },
}
