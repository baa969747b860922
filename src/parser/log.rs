//! Simulation log decoding.
//!
//! Parses raw JSON emitted by the experiment harness into structured
//! per-test records. Handles schema validation and the field-name drift
//! between harness revisions.

use crate::utils::error::ParseError;
use log::{debug, warn};
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

/// Wallet address within the simulated ledger
pub type WalletId = u64;

/// Coin identifier within the simulated ledger
pub type CoinId = u64;

/// A decoded simulation log: one entry per independent test run
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationLog {
    pub tests: Vec<TestRecord>,
}

/// One independent experiment repetition
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRecord {
    /// Round range and byzantine takeover round
    pub round_info: RoundInfo,

    /// Network size (absent in older logs)
    #[serde(default)]
    pub peer_info: Option<PeerInfo>,

    /// Wallet population (absent in older logs)
    #[serde(default)]
    pub wallet_info: Option<WalletInfo>,

    /// Transaction submissions, keyed by sequence number
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,

    /// Validator confirmations referencing earlier submissions
    #[serde(default)]
    pub validations: Vec<ValidationRecord>,

    /// Network messages exchanged while processing transactions
    #[serde(default)]
    pub messages: Vec<MessageRecord>,

    /// Wallets stored by neighborhoods that start out byzantine
    #[serde(default)]
    pub corrupt_wallets: Option<Vec<WalletId>>,

    /// Coins lost to the initial byzantine takeover
    #[serde(default)]
    pub lost_coins: Option<Vec<CoinId>>,
}

impl TestRecord {
    /// Number of peers in the network, if the log recorded it
    pub fn peer_count(&self) -> Option<u64> {
        self.peer_info.as_ref().map(|info| info.peer_count)
    }

    /// Number of wallets in the network, if the log recorded it
    pub fn wallet_count(&self) -> Option<u64> {
        self.wallet_info.as_ref().map(|info| info.wallet_count)
    }
}

/// Round dimensions of a test run
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundInfo {
    /// Total number of simulated rounds ("rounds" in older harness revisions)
    #[serde(alias = "rounds")]
    pub round_count: u64,

    /// Round at which byzantine neighborhoods activate, if any
    #[serde(default)]
    pub byzantine_round: Option<u64>,
}

/// Peer population of a test run
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerInfo {
    pub peer_count: u64,
}

/// Wallet population of a test run
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletInfo {
    pub wallet_count: u64,
}

/// A transaction submission observed by the harness
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// Sequence number assigned at submission time
    pub seq_num: u64,

    /// Round the transaction was submitted in
    pub round: u64,

    /// Coin being transferred
    pub coin: CoinId,

    /// Sending wallet
    pub sender: WalletId,

    /// Receiving wallet
    pub receiver: WalletId,

    /// Whether the submitting neighborhood followed the protocol
    pub honest: bool,

    /// Whether this transfer reverses an earlier theft
    #[serde(default)]
    pub rollback: bool,

    /// Validators assigned to this transaction
    /// ("validatorCount" in older harness revisions)
    #[serde(alias = "validatorCount")]
    pub validators_needed: u32,
}

/// A single validator confirmation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRecord {
    /// Sequence number of the transaction being confirmed
    pub seq_num: u64,

    /// Round the confirmation arrived in
    pub round: u64,
}

/// A batch of network messages
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    /// Round the messages were sent in
    pub round: u64,

    /// Messages in this batch (older logs record single messages)
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,

    /// Whether the messages served a committee-local transaction
    pub transaction_type: MessageScope,
}

fn default_batch_size() -> u64 {
    1
}

/// Scope of the transaction a message batch was sent for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageScope {
    /// Transaction local to a single committee
    Local,

    /// Anything crossing committee boundaries
    #[serde(other)]
    Remote,
}

/// Read and decode a simulation log file
///
/// **Public** - main entry point for file-based parsing
///
/// # Errors
/// * `ParseError::IoError` - file cannot be opened or read
/// * `ParseError::JsonError` - malformed JSON
/// * `ParseError::InvalidFormat` - structurally valid JSON that is not a usable log
pub fn read_log(path: impl AsRef<Path>) -> Result<SimulationLog, ParseError> {
    let path = path.as_ref();
    debug!("Reading simulation log from: {}", path.display());

    let file = File::open(path)?;
    let log: SimulationLog = serde_json::from_reader(file)?;

    validate_log(&log)?;
    Ok(log)
}

/// Decode a simulation log from an in-memory JSON string
///
/// **Public** - used by tests and embedding callers
pub fn parse_log(raw: &str) -> Result<SimulationLog, ParseError> {
    let log: SimulationLog = serde_json::from_str(raw)?;
    validate_log(&log)?;
    Ok(log)
}

/// Decode a simulation log from an already-parsed JSON value
///
/// **Public** - used when the caller has its own JSON source
pub fn parse_log_value(value: &serde_json::Value) -> Result<SimulationLog, ParseError> {
    let log: SimulationLog = serde_json::from_value(value.clone())?;
    validate_log(&log)?;
    Ok(log)
}

/// Check structural preconditions the aggregation core relies on
///
/// **Private** - internal validation
fn validate_log(log: &SimulationLog) -> Result<(), ParseError> {
    if log.tests.is_empty() {
        return Err(ParseError::InvalidFormat(
            "log contains no test records".to_string(),
        ));
    }

    for (index, test) in log.tests.iter().enumerate() {
        if test.round_info.round_count == 0 {
            return Err(ParseError::InvalidFormat(format!(
                "test {} has a zero round count",
                index
            )));
        }
    }

    let first = &log.tests[0];
    if first.peer_info.is_none() {
        warn!("Log has no peerInfo; per-peer normalization disabled");
    }
    if first.wallet_info.is_none() {
        warn!("Log has no walletInfo; per-wallet normalization disabled");
    }

    debug!(
        "Decoded log: {} tests, {} rounds each",
        log.tests.len(),
        first.round_info.round_count
    );

    Ok(())
}
