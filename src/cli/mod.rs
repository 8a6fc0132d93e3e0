pub mod commands;
pub mod config;
pub mod context;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "autobank")]
#[command(about = "AutoBank CLI - cars and customers through the session relay")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Session credential management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Car inventory operations")]
    Cars {
        #[command(subcommand)]
        cmd: commands::cars::CarsCommands,
    },

    #[command(about = "Customer operations")]
    Customers {
        #[command(subcommand)]
        cmd: commands::customers::CustomersCommands,
    },

    #[command(about = "Endpoint configuration")]
    Config {
        #[command(subcommand)]
        cmd: commands::config::ConfigCommands,
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

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
        Commands::Cars { cmd } => commands::cars::handle(cmd, output_format).await,
        Commands::Customers { cmd } => commands::customers::handle(cmd, output_format).await,
        Commands::Config { cmd } => commands::config::handle(cmd, output_format).await,
    }
}
