//! Lottery deployer CLI.
//!
//! # Architecture Overview
//!
//! ```text
//!   lottery build ──▶ toolchain ──▶ solc --abi / --bin ──▶ build/Lottery.{abi,bin}
//!                         │
//!                         └──▶ binding ──▶ bindings/lottery.rs
//!                                   │
//!                                   └──▶ contract::manager() (verification)
//!
//!   lottery deploy ──▶ contract::deploy ──▶ wait mined ──▶ enter ──▶ players ──▶ pickWinner
//!                          │
//!                          └──▶ blockchain (client, signer, transaction)
//!
//!   lottery transfer / status ──▶ blockchain / contract
//! ```

use alloy::primitives::{Address, U256};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use lottery_deployer::config::{load_workflow_config, CommandKind};
use lottery_deployer::observability::init_logging;
use lottery_deployer::workflow::{
    BuildWorkflow, DeployWorkflow, StatusWorkflow, TransferWorkflow, WorkflowError,
};

#[derive(Parser)]
#[command(name = "lottery")]
#[command(about = "Compile, deploy and drive the Lottery contract", long_about = None)]
struct Cli {
    /// TOML configuration file (defaults to ./lottery.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the contract, generate its binding and verify it on chain
    Build,
    /// Deploy the contract, enter the lottery and pick a winner
    Deploy,
    /// Send a plain value transfer from the configured account
    Transfer {
        /// Recipient address
        #[arg(long)]
        to: Address,
        /// Amount in wei
        #[arg(long)]
        value_wei: U256,
    },
    /// Show manager, players and pot of the configured contract
    Status,
}

impl Commands {
    fn kind(&self) -> CommandKind {
        match self {
            Commands::Build => CommandKind::Build,
            Commands::Deploy => CommandKind::Deploy,
            Commands::Transfer { .. } => CommandKind::Transfer,
            Commands::Status => CommandKind::Status,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), WorkflowError> {
    let cli = Cli::parse();

    let config = match load_workflow_config(cli.config.as_deref(), cli.command.kind()) {
        Ok(config) => config,
        Err(e) => {
            init_logging("info");
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    init_logging(&config.log_level);

    tracing::info!(
        endpoint = %config.endpoint,
        chain_id = ?config.chain_id,
        "lottery v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let result = run(cli.command, config).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Command failed");
    }
    result
}

async fn run(
    command: Commands,
    config: lottery_deployer::WorkflowConfig,
) -> Result<(), WorkflowError> {
    match command {
        Commands::Build => {
            let report = BuildWorkflow::new(config).run().await?;
            println!("abi:     {}", report.artifacts.abi.display());
            println!("bin:     {}", report.artifacts.bin.display());
            println!("binding: {}", report.binding.display());
            match report.manager {
                Some(manager) => println!("manager: {}", manager),
                None => println!("manager: unverified"),
            }
        }
        Commands::Deploy => {
            let report = DeployWorkflow::new(config).run().await?;
            println!("contract:   {}", report.deployed);
            println!("entry tx:   {}", report.entry_tx);
            println!("winner tx:  {}", report.winner_tx);
        }
        Commands::Transfer { to, value_wei } => {
            let report = TransferWorkflow::new(config, to, value_wei).run().await?;
            println!("{}", report.tx_hash);
        }
        Commands::Status => {
            let status = StatusWorkflow::new(config).run().await?;
            print!("{}", status);
        }
    }
    Ok(())
}
