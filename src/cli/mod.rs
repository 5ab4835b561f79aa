pub mod commands;
pub mod session_file;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "hub")]
#[command(about = "Design Hub CLI - Command-line client for the portal API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        help = "Portal server URL (defaults to HUB_SERVER_URL or the saved session)"
    )]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Authentication and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Creative-request briefs")]
    Requests {
        #[command(subcommand)]
        cmd: commands::requests::RequestCommands,
    },

    #[command(about = "Delivered asset library")]
    Assets {
        #[command(subcommand)]
        cmd: commands::assets::AssetCommands,
    },

    #[command(about = "Client management (admin)")]
    Clients {
        #[command(subcommand)]
        cmd: commands::clients::ClientCommands,
    },

    #[command(about = "Session housekeeping")]
    Session {
        #[command(subcommand)]
        cmd: commands::session::SessionCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Everything a command handler needs besides its own arguments.
pub struct CliContext {
    pub output: OutputFormat,
    pub server: Option<String>,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = CliContext {
        output: OutputFormat::from_cli(&cli),
        server: cli.server.clone(),
    };

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &ctx).await,
        Commands::Requests { cmd } => commands::requests::handle(cmd, &ctx).await,
        Commands::Assets { cmd } => commands::assets::handle(cmd, &ctx).await,
        Commands::Clients { cmd } => commands::clients::handle(cmd, &ctx).await,
        Commands::Session { cmd } => commands::session::handle(cmd, &ctx).await,
    }
}
