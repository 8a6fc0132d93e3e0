use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{self, SessionFile};
use crate::cli::context::CliContext;
use crate::cli::utils::{mask_token, output_success};
use crate::cli::OutputFormat;
use crate::relay::{AuthService, CredentialSink, SessionCredential};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Store a session credential")]
    Login {
        #[arg(long, help = "Access token")]
        token: String,
        #[arg(long, help = "Refresh token used to renew the access token")]
        refresh_token: Option<String>,
    },

    #[command(about = "End the session and forget stored credentials")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Exchange the refresh token for a new access token")]
    Refresh,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { token, refresh_token } => {
            if SessionCredential::new(token.as_str()).is_none() {
                return Err(anyhow::anyhow!("Access token must not be empty"));
            }
            config::save_session(&SessionFile::new(Some(token), refresh_token))?;
            output_success(&output_format, "Session credential stored", None)
        }
        AuthCommands::Logout => {
            let ctx = CliContext::load()?;
            if let Err(e) = ctx.auth.logout().await {
                tracing::warn!("Server-side logout failed: {}", e);
            }
            ctx.store.clear();
            config::clear_session()?;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let session = config::load_session()?;
            let authenticated = session.access_token.is_some();
            let details = json!({
                "authenticated": authenticated,
                "access_token": session.access_token.as_deref().map(mask_token),
                "has_refresh_token": session.refresh_token.is_some(),
                "updated_at": session.updated_at,
            });

            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&details)?),
                OutputFormat::Text => {
                    if authenticated {
                        println!("Authenticated");
                        if let Some(token) = &session.access_token {
                            println!("Access token: {}", mask_token(token));
                        }
                        println!(
                            "Refresh token: {}",
                            if session.refresh_token.is_some() { "stored" } else { "none" }
                        );
                        if let Some(updated_at) = session.updated_at {
                            println!("Updated: {}", updated_at.to_rfc3339());
                        }
                    } else {
                        println!("Not authenticated");
                    }
                }
            }
            Ok(())
        }
        AuthCommands::Refresh => {
            let ctx = CliContext::load()?;
            let credential = ctx.auth.refresh().await?;
            ctx.store.set_credential(credential);
            ctx.persist()?;
            output_success(
                &output_format,
                "Access token refreshed",
                Some(json!({ "rotated_refresh_token": ctx.auth.ambient().refresh_token.is_some() })),
            )
        }
    }
}
