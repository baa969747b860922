//! Simlog Studio CLI
//!
//! An analysis tool for distributed-ledger simulation logs.
//! Turns per-round event records into cumulative timelines, summary
//! metrics, charts and a JSON report.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use simlog_studio::commands::{execute_analyze, validate_args, AnalyzeArgs};
use simlog_studio::utils::config::SCHEMA_VERSION;

/// Simlog Studio - analysis for distributed-ledger simulation logs
#[derive(Parser, Debug)]
#[command(name = "simlog")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a simulation log
    Analyze {
        /// Path to the simulation log JSON
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the JSON report
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,

        /// Directory for SVG charts (optional)
        #[arg(short, long)]
        charts: Option<PathBuf>,

        /// Output path for a CSV export of the averaged series (optional)
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Normalize charts by peer/wallet counts
        #[arg(short, long)]
        normalize: bool,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Validate a simulation log file
    Validate {
        /// Path to the log JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Analyze {
            input,
            output,
            charts,
            csv,
            normalize,
            summary,
        } => {
            let args = AnalyzeArgs {
                input,
                output_json: output,
                chart_dir: charts,
                output_csv: csv,
                normalize,
                print_summary: summary,
            };

            // Validate args first
            validate_args(&args)?;

            // Execute analysis
            execute_analyze(args)?;
        }

        Commands::Validate { file } => {
            validate_log_file(file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Validate a simulation log file
///
/// **Private** - internal command implementation
fn validate_log_file(file_path: PathBuf) -> Result<()> {
    use simlog_studio::parser::read_log;

    println!("Validating log: {}", file_path.display());

    let log = read_log(&file_path)?;
    let first = &log.tests[0];

    println!("✓ Valid simulation log");
    println!("  Test runs: {}", log.tests.len());
    println!("  Rounds: {}", first.round_info.round_count);
    if let Some(peers) = first.peer_count() {
        println!("  Peers: {}", peers);
    }
    if let Some(wallets) = first.wallet_count() {
        println!("  Wallets: {}", wallets);
    }
    println!("  Transactions: {}", first.transactions.len());
    println!("  Validations: {}", first.validations.len());
    println!("  Messages: {}", first.messages.len());
    if let Some(seeded) = &first.corrupt_wallets {
        println!("  Seeded corrupt wallets: {}", seeded.len());
    }

    Ok(())
}

/// Display schema information
///
/// **Private** - internal command implementation
fn display_schema(show_details: bool) {
    println!("Simlog Studio Log Schema");
    println!("Report Schema Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Input Log Structure:");
        println!("  tests: array                - One entry per test run");
        println!("    roundInfo: object         - Round dimensions");
        println!("      roundCount: number      - Rounds per run (alias: rounds)");
        println!("      byzantineRound: number? - Round of byzantine takeover");
        println!("    peerInfo.peerCount: number?     - Network size");
        println!("    walletInfo.walletCount: number? - Wallet population");
        println!("    transactions: array       - Submissions");
        println!("      seqNum, round, coin, sender, receiver: number");
        println!("      honest: bool            - Protocol-following submitter");
        println!("      rollback: bool?         - Reverses an earlier theft");
        println!("      validatorsNeeded: number - (alias: validatorCount)");
        println!("    validations: array        - seqNum, round per confirmation");
        println!("    messages: array           - round, batchSize?, transactionType");
        println!("    corruptWallets: array?    - Seeded corrupt wallet ids");
        println!("    lostCoins: array?         - Coins lost at the takeover");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
///
/// **Private** - internal command implementation
fn display_version() {
    println!("Simlog Studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("An analysis tool for distributed-ledger simulation logs.");
}
