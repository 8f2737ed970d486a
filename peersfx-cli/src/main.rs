//! PeersFX CLI - peer-to-peer currency exchange in your terminal

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{admin, demo, get_logger, kyc, log_event, logs, market, notifications, order, wallet};
use peersfx_core::LogEvent;

/// PeersFX - peer-to-peer currency exchange in your terminal
#[derive(Parser)]
#[command(name = "pfx", version, about, long_about = None)]
struct Cli {
    /// Simulate the backend being unreachable
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and match marketplace orders
    Market {
        #[command(subcommand)]
        command: market::MarketCommands,
    },

    /// Quote and post orders
    Order {
        #[command(subcommand)]
        command: order::OrderCommands,
    },

    /// Read and manage notifications
    Notifications {
        #[command(subcommand)]
        command: notifications::NotificationCommands,
    },

    /// Submit identity verification
    Kyc(kyc::KycArgs),

    /// Wallet balances
    Wallet {
        /// Currency for the total
        #[arg(long, default_value = "USD")]
        currency: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Operator console
    Admin {
        #[command(subcommand)]
        command: admin::AdminCommands,
    },

    /// Manage demo mode
    Demo {
        #[command(subcommand)]
        command: Option<demo::DemoCommands>,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Market { .. } => "market",
            Commands::Order { .. } => "order",
            Commands::Notifications { .. } => "notifications",
            Commands::Kyc(_) => "kyc",
            Commands::Wallet { .. } => "wallet",
            Commands::Admin { .. } => "admin",
            Commands::Demo { .. } => "demo",
            Commands::Logs { .. } => "logs",
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("PFX_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let name = cli.command.name();
    // `logs` manages the event log itself and is not recorded in it
    let logger = if name == "logs" { None } else { get_logger() };
    log_event(&logger, LogEvent::new("command_executed").with_command(name));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let result = runtime.block_on(dispatch(cli.command, cli.offline));

    if let Err(e) = &result {
        log_event(
            &logger,
            LogEvent::new("command_failed")
                .with_command(name)
                .with_error(e.to_string()),
        );
    }
    result
}

async fn dispatch(command: Commands, offline: bool) -> Result<()> {
    match command {
        Commands::Market { command } => market::run(command, offline).await,
        Commands::Order { command } => order::run(command, offline).await,
        Commands::Notifications { command } => notifications::run(command, offline).await,
        Commands::Kyc(args) => kyc::run(args, offline).await,
        Commands::Wallet { currency, json } => wallet::run(&currency, json),
        Commands::Admin { command } => admin::run(command, offline).await,
        Commands::Demo { command } => demo::run(command),
        Commands::Logs { command } => logs::run(command),
    }
}
