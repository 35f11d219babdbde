//! onchain-answer
//!
//! Connects a wallet, reads the answer stored on the contract, submits a
//! new answer as a transaction and follows it to settlement.
//!
//! # Architecture Overview
//!
//! ```text
//!   terminal ── intents ──▶ ┌──────────────────────┐      ┌─────────────────┐
//!                           │ TransactionController │────▶│ ContractGateway │
//!   terminal ◀─ snapshots ─ │   (session owner)     │     └────────┬────────┘
//!                           └──────────┬───────────┘              ▼
//!                                      │                 ┌─────────────────┐
//!                                      └────────────────▶│  RpcChainClient │──▶ JSON-RPC
//!                                                        │   + Wallet      │
//!                                                        └─────────────────┘
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, watch};

use onchain_answer::config::validation::validate_config;
use onchain_answer::config::{read_config, AppConfig, ConfigError};
use onchain_answer::controller::{ControllerHandle, Snapshot, TransactionController};
use onchain_answer::lifecycle::signals::spawn_ctrl_c_handler;
use onchain_answer::lifecycle::startup::build_controller;
use onchain_answer::lifecycle::Shutdown;
use onchain_answer::observability::{logging, metrics};
use onchain_answer::presentation::render;

#[derive(Parser)]
#[command(name = "onchain-answer")]
#[command(about = "Read and submit a yes/no answer stored on a smart contract", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Contract address (overrides the config file).
    #[arg(long)]
    contract: Option<String>,

    /// JSON-RPC endpoint (overrides the config file).
    #[arg(long)]
    rpc_url: Option<String>,

    /// Print snapshots as JSON instead of text.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect the wallet and show the stored answer
    Status,
    /// Submit an answer and wait for it to settle
    Answer {
        #[arg(value_enum)]
        choice: Choice,
    },
    /// Read commands (connect, yes, no, refresh, quit) from the terminal
    Interactive,
}

#[derive(Clone, Copy, ValueEnum)]
enum Choice {
    Yes,
    No,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(contract) = &cli.contract {
        config.contract.address = contract.clone();
    }
    if let Some(rpc_url) = &cli.rpc_url {
        config.chain.rpc_url = rpc_url.clone();
    }
    if matches!(cli.command, Commands::Interactive) {
        // Typing `yes`/`no` is the approval; a second prompt would fight
        // the command reader for stdin.
        config.wallet.require_approval = false;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!("onchain-answer v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let (controller, handle) = build_controller(&config).await?;
    let explorer = config.contract.explorer_tx_url.clone();

    match cli.command {
        Commands::Status => {
            let (snapshot, _) = run_once(controller, None).await;
            finish(&snapshot, &explorer, cli.json)
        }
        Commands::Answer { choice } => {
            let (snapshot, submitted) =
                run_once(controller, Some(matches!(choice, Choice::Yes))).await;
            if !submitted && snapshot.last_error.is_none() {
                print_snapshot(&snapshot, &explorer, cli.json);
                eprintln!(
                    "Nothing submitted: answer already recorded as {} and resubmission is disabled (policy.allow_resubmit)",
                    snapshot.answer
                );
                std::process::exit(2);
            }
            finish(&snapshot, &explorer, cli.json)
        }
        Commands::Interactive => interactive(controller, handle, explorer, cli.json).await,
    }
}

/// Drive the controller sequentially: connect, then optionally answer.
///
/// The flag reports whether an answer was actually submitted.
async fn run_once(mut controller: TransactionController, answer: Option<bool>) -> (Snapshot, bool) {
    controller.connect().await;
    let mut submitted = false;
    if let Some(yes) = answer {
        if controller.snapshot().last_error.is_none() {
            submitted = controller.answer(yes).await;
        }
    }
    (controller.snapshot(), submitted)
}

fn finish(
    snapshot: &Snapshot,
    explorer: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    print_snapshot(snapshot, explorer, json);
    if snapshot.last_error.is_some() {
        std::process::exit(1);
    }
    Ok(())
}

async fn interactive(
    controller: TransactionController,
    handle: ControllerHandle,
    explorer: String,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = Shutdown::new();
    spawn_ctrl_c_handler(shutdown.clone());

    tokio::spawn(controller.run(shutdown.subscribe()));
    tokio::spawn(render_loop(
        handle.subscribe(),
        explorer,
        json,
        shutdown.subscribe(),
    ));

    eprintln!("Commands: connect, yes, no, refresh, quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stop = shutdown.subscribe();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "connect" => handle.connect(),
                    "yes" => handle.answer_yes(),
                    "no" => handle.answer_no(),
                    "refresh" => handle.refresh(),
                    "quit" | "exit" => break,
                    "" => {}
                    other => eprintln!(
                        "Unknown command '{}'. Commands: connect, yes, no, refresh, quit",
                        other
                    ),
                }
            }
            _ = stop.recv() => break,
        }
    }

    shutdown.trigger();
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn render_loop(
    mut snapshots: watch::Receiver<Snapshot>,
    explorer: String,
    json: bool,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        let snapshot = snapshots.borrow_and_update().clone();
        print_snapshot(&snapshot, &explorer, json);

        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = shutdown.recv() => break,
        }
    }
}

fn print_snapshot(snapshot: &Snapshot, explorer: &str, json: bool) {
    if json {
        match serde_json::to_string(snapshot) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::error!(error = %e, "Failed to serialize snapshot"),
        }
    } else {
        println!("{}\n", render(snapshot, explorer));
    }
}
