use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "rolodex",
    about = "rolodex: a single-document user record store",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an empty user document
    Init(InitArgs),
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Manage user records directly in the document
    User(UserArgs),
}

#[derive(Args)]
pub struct InitArgs {
    #[arg(long, default_value = "users.json")]
    pub store: PathBuf,
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub bind: Option<String>,
    #[arg(long)]
    pub store: Option<PathBuf>,
}

#[derive(Args)]
pub struct UserArgs {
    #[arg(long, global = true, default_value = "users.json")]
    pub store: PathBuf,
    #[command(subcommand)]
    pub action: UserAction,
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Add a user
    Create { display_name: String, email: String },
    /// Show one user
    Get { id: String },
    /// List all users
    List,
    /// Change a user's display name
    Update { id: String, display_name: String },
    /// Remove a user
    Delete { id: String },
}
