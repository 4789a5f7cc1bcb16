//! DriveDeck Daemon - Main entry point
//!
//! Joins the storage inventory and health sources into per-drive views
//! on a fixed schedule and mirrors push updates from the live channel.

mod app;
mod config;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "drivedeck")]
#[command(about = "Storage dashboard daemon reconciling drive inventory with health telemetry")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "drivedeck.toml")]
    config: PathBuf,

    /// Inventory endpoint override
    #[arg(long)]
    inventory_url: Option<String>,

    /// Health endpoint override
    #[arg(long)]
    health_url: Option<String>,

    /// Live channel endpoint override
    #[arg(long)]
    live_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Run a single poll cycle, print the result, and exit
    #[arg(long)]
    poll_once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("DriveDeck v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = config::load_config(&args.config)?;

    // Apply endpoint overrides
    if let Some(url) = args.inventory_url {
        config.endpoints.inventory_url = url;
    }
    if let Some(url) = args.health_url {
        config.endpoints.health_url = url;
    }
    if let Some(url) = args.live_url {
        config.endpoints.live_url = url;
    }

    info!(
        inventory = %config.endpoints.inventory_url,
        health = %config.endpoints.health_url,
        live = %config.endpoints.live_url,
        "Configuration loaded"
    );

    if args.poll_once {
        // Single cycle mode
        let mut app = app::App::new(&config)?;
        let views = app.refresh().await;
        println!("Found {} drives:", views.len());
        for view in views {
            println!(
                "  - {} {} ({})",
                view.device(),
                view.inventory.model,
                view.inventory.capacity
            );
            if !view.inventory.vendor.is_empty() {
                println!("    Vendor: {}", view.inventory.vendor);
            }
            match &view.health {
                Some(health) => {
                    if let Some(temperature) = health.temperature {
                        println!("    Temperature: {:.1} C", temperature);
                    }
                    if let Some(hours) = health.power_on_hours {
                        println!("    Power on hours: {}", hours);
                    }
                    if !health.health_status.is_empty() {
                        println!("    Status: {}", health.health_status.trim());
                    }
                }
                None => println!("    Health: unavailable"),
            }
        }
    } else {
        // Daemon mode
        app::run(config).await?;
    }

    Ok(())
}
