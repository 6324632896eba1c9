//! Enqueue Gateway - authenticated HTTP front door for a message queue

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use enqueue_gateway::{
    cli::{Cli, Command},
    config::{Config, PublisherConfig},
    gateway::Gateway,
    setup_tracing,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_tracing(&cli.log_level, cli.log_format.as_deref()) {
        eprintln!("Failed to setup tracing: {e}");
        return ExitCode::FAILURE;
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(code) => return code,
    };

    match cli.command {
        Some(Command::Check) => run_check(&config),
        Some(Command::Serve) | None => run_server(config).await,
    }
}

/// Load configuration and apply CLI overrides
fn load_config(cli: &Cli) -> Result<Config, ExitCode> {
    match Config::load(cli.config.as_deref()) {
        Ok(mut config) => {
            if let Some(port) = cli.port {
                config.server.port = port;
            }
            if let Some(ref host) = cli.host {
                config.server.host = host.clone();
            }
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {e}");
            Err(ExitCode::FAILURE)
        }
    }
}

/// Validate configuration and print a summary
fn run_check(config: &Config) -> ExitCode {
    if let Err(e) = config.validate() {
        eprintln!("❌ {e}");
        return ExitCode::FAILURE;
    }

    println!("✅ Configuration valid");
    println!("   Listen: {}", config.listen_address());
    match &config.publisher {
        PublisherConfig::Memory(memory) => println!(
            "   Publisher: memory (max_message_size={}, capacity={})",
            memory.max_message_size, memory.capacity
        ),
        PublisherConfig::Remote(remote) => println!(
            "   Publisher: remote ({}, max_idle_connections={}, timeout={}s)",
            remote.url, remote.max_idle_connections, remote.max_io_time_seconds
        ),
    }
    ExitCode::SUCCESS
}

/// Run the gateway server
async fn run_server(config: Config) -> ExitCode {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.server.port,
        publisher = config.publisher.kind(),
        "Starting Enqueue Gateway"
    );

    let gateway = match Gateway::from_config(config) {
        Ok(g) => g,
        Err(e) => {
            error!("Failed to create gateway: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = gateway.run().await {
        error!("Gateway error: {e}");
        return ExitCode::FAILURE;
    }

    info!("Gateway shutdown complete");
    ExitCode::SUCCESS
}
