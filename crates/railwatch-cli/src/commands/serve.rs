//! Relay server command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

use railwatch_core::{FetchState, Relay};
use railwatch_upstream::{RailwayClient, DEFAULT_API_URL};

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value = "8080")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Railway API token used for the startup status fetch
    #[arg(long, env = "RAILWAY_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Railway GraphQL endpoint
    #[arg(long, env = "RAILWAY_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Write logs to a file
    #[arg(long)]
    pub log: bool,

    /// Log file path (implies --log)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

pub async fn execute(args: ServeArgs) -> Result<()> {
    let relay = Arc::new(Relay::new());

    match args.api_token.as_deref() {
        Some(token) if !token.is_empty() => {
            let client = RailwayClient::new(&args.api_url, token);
            railwatch_upstream::spawn_initial_fetch(relay.clone(), client);
        }
        _ => {
            warn!("RAILWAY_API_TOKEN not set, skipping initial status fetch");
            relay.set_fetch_state(FetchState::Failed {
                error: "no API token configured".to_string(),
            });
        }
    }

    println!();
    println!(
        "  {} {}",
        "Railwatch".cyan().bold(),
        "Status Relay".bold()
    );
    println!();
    println!(
        "  {}  http://{}:{}",
        "Dashboard".green(),
        args.host,
        args.port
    );
    println!(
        "  {}  http://{}:{}/events",
        "Live feed".green(),
        args.host,
        args.port
    );
    println!(
        "  {}    http://{}:{}/webhook",
        "Webhook".green(),
        args.host,
        args.port
    );
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    railwatch_web::run_server(relay, &args.host, args.port).await?;

    Ok(())
}
