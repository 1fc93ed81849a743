//! connect-warden - lifecycle orchestrator for a hosted HDFS sink connector
//!
//! Wires the pieces together at startup: management-API client, bootstrap
//! sequence (fire-and-forget), periodic health monitor, and the HTTP façade.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use connect_warden::api::{self, ApiState};
use connect_warden::monitor::SharedMonitor;
use connect_warden::{bootstrap, ConnectClient, ConnectMonitor, WardenConfig};

#[derive(Parser)]
#[command(name = "connect-warden")]
#[command(version, about = "Lifecycle orchestrator for a hosted HDFS sink connector")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "warden.yaml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the orchestrator: bootstrap, health monitor and API (default)
    Run,
    /// Validate configuration file
    Validate,
    /// Check connectivity to the management API and connector existence
    Check,
    /// Fetch and print the connector's status document
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = WardenConfig::from_file(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(config).await,
        Commands::Validate => validate_config(config),
        Commands::Check => check_connectivity(config).await,
        Commands::Status => show_status(config).await,
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

async fn run(config: WardenConfig) -> Result<()> {
    info!("starting connect-warden");
    info!(
        url = %config.connect.url,
        connector = %config.connector.name,
        "managing connector"
    );

    let config = Arc::new(config);
    let client = Arc::new(ConnectClient::new(&config.connect)?);
    let monitor: SharedMonitor = Arc::new(ConnectMonitor::new(client.clone(), &config));
    let (shutdown_tx, _) = broadcast::channel::<()>(16);

    // Bootstrap is fire-and-forget: its outcome is logged, not awaited
    tokio::spawn(bootstrap::run(client.clone(), config.clone()));

    let monitor_task = tokio::spawn(monitor.clone().run(shutdown_tx.subscribe()));

    let addr: SocketAddr = format!("{}:{}", config.api.host, config.api.port)
        .parse()
        .with_context(|| format!("invalid API bind address {}:{}", config.api.host, config.api.port))?;
    let state = ApiState {
        client,
        monitor,
        config: config.clone(),
    };
    let mut api_task = tokio::spawn(api::serve(state, addr, shutdown_tx.subscribe()));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("received shutdown signal (Ctrl+C)");
        }
        result = &mut api_task => {
            match result {
                Ok(Ok(())) => warn!("API server stopped"),
                Ok(Err(e)) => warn!("API server failed: {e}"),
                Err(e) => warn!("API task panicked: {e}"),
            }
        }
    }

    // Initiate graceful shutdown
    let _ = shutdown_tx.send(());
    let _ = monitor_task.await;
    api_task.abort();

    info!("shutdown complete");
    Ok(())
}

fn validate_config(config: WardenConfig) -> Result<()> {
    println!("✓ Configuration valid!\n");

    println!("Management API:");
    println!("  URL: {}", config.connect.url);
    println!(
        "  Connection timeout: {}ms",
        config.connect.connection_timeout_ms
    );
    println!("  Request timeout: {}ms", config.connect.request_timeout_ms);
    println!();

    println!("Connector:");
    println!("  Name: {}", config.connector.name);
    println!("  Topics: {}", config.connector.topics);
    println!(
        "  Target: {} ({})",
        config.connector.hdfs_url, config.connector.topics_dir
    );
    println!("  Flush size: {}", config.connector.flush_size);
    println!(
        "  Rotate interval: {}ms",
        config.connector.rotate_interval_ms
    );
    println!(
        "  Partition duration: {}ms",
        config.connector.partition_duration_ms
    );
    println!("  Path format: {}", config.connector.path_format);
    println!(
        "  Locale / timezone: {} / {}",
        config.connector.locale, config.connector.timezone
    );
    println!();

    println!("Monitor:");
    println!(
        "  Check interval: {}s",
        config.monitor.check_interval_secs
    );
    println!();

    println!("API:");
    println!("  http://{}:{}", config.api.host, config.api.port);

    Ok(())
}

async fn check_connectivity(config: WardenConfig) -> Result<()> {
    println!("Running connectivity checks...\n");
    let client = ConnectClient::new(&config.connect)?;

    print!("Management API ({})... ", config.connect.url);
    if client.server_reachable().await {
        println!("✓ reachable");
    } else {
        println!("✗ not reachable");
        anyhow::bail!("management API not reachable");
    }

    print!("Connector '{}'... ", config.connector.name);
    if client.exists(&config.connector.name).await {
        println!("✓ exists");
    } else {
        println!("○ does not exist (will be created on run)");
    }

    Ok(())
}

async fn show_status(config: WardenConfig) -> Result<()> {
    let client = ConnectClient::new(&config.connect)?;
    let document = client
        .status(&config.connector.name)
        .await
        .with_context(|| format!("failed to get status of '{}'", config.connector.name))?;

    match serde_json::from_str::<serde_json::Value>(&document) {
        Ok(parsed) => println!("{}", serde_json::to_string_pretty(&parsed)?),
        Err(_) => println!("{document}"),
    }
    Ok(())
}
