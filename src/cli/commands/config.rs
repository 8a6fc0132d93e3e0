use clap::Subcommand;
use serde_json::json;

use crate::cli::config;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Show configured endpoints")]
    Show,

    #[command(about = "Change one or more endpoints")]
    Set {
        #[arg(long, help = "Gateway proxy URL for the banking API")]
        relay_url: Option<String>,
        #[arg(long, help = "Car inventory API URL")]
        cars_url: Option<String>,
        #[arg(long, help = "Refresh endpoint URL")]
        refresh_url: Option<String>,
        #[arg(long, help = "Logout endpoint URL")]
        logout_url: Option<String>,
    },
}

pub async fn handle(cmd: ConfigCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ConfigCommands::Show => {
            let endpoints = config::load_endpoints()?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&endpoints)?),
                OutputFormat::Text => {
                    println!("Cars API: {}", endpoints.cars_url);
                    println!("Relay: {}", endpoints.relay_url);
                    println!("Refresh: {}", endpoints.refresh_url);
                    println!("Logout: {}", endpoints.logout_url);
                }
            }
            Ok(())
        }
        ConfigCommands::Set {
            relay_url,
            cars_url,
            refresh_url,
            logout_url,
        } => {
            let mut endpoints = config::load_endpoints()?;
            let updates = [
                (relay_url, &mut endpoints.relay_url),
                (cars_url, &mut endpoints.cars_url),
                (refresh_url, &mut endpoints.refresh_url),
                (logout_url, &mut endpoints.logout_url),
            ];

            let mut changed = false;
            for (value, slot) in updates {
                if let Some(value) = value {
                    url::Url::parse(&value).map_err(|e| anyhow::anyhow!("Invalid URL '{}': {}", value, e))?;
                    *slot = value;
                    changed = true;
                }
            }
            if !changed {
                return Err(anyhow::anyhow!("Nothing to set, pass at least one --*-url option"));
            }

            config::save_endpoints(&endpoints)?;
            output_success(
                &output_format,
                "Endpoints updated",
                Some(json!({ "endpoints": endpoints })),
            )
        }
    }
}
