//! Ledger-corruption replay over confirmed transaction proposals.
//!
//! Walks one test run's transaction, validation and corruption records to
//! determine which wallets end up compromised, feeding corruption and
//! coin-loss events into the timeline aggregators alongside the plain
//! throughput and message metrics.
//!
//! A wallet is considered corrupt if any of the following hold:
//! - it is stored by a neighborhood that starts out byzantine,
//! - it takes part in a confirmed transfer whose sender was not the
//!   coin's last known owner (a confirmed fork/double spend),
//! - it takes part in a confirmed dishonest or rollback-tagged transfer,
//!   or any later transfer of a coin whose history is already
//!   inconsistent.

use crate::aggregator::timeline::{RunId, TimelineAggregator};
use crate::parser::log::{CoinId, MessageScope, SimulationLog, TestRecord, TransactionRecord, WalletId};
use crate::utils::config::QUORUM_FRACTION;
use crate::utils::error::{ReplayError, TimelineError};
use log::debug;
use std::collections::{BTreeMap, HashMap, HashSet};

/// The full set of per-metric timelines produced by replaying a log
///
/// **Public** - handed to metrics, charts and report assembly
#[derive(Debug, Clone)]
pub struct LedgerTimelines {
    /// Transactions submitted
    pub tx_starts: TimelineAggregator,

    /// Transactions submitted by honest neighborhoods
    pub honest_tx_starts: TimelineAggregator,

    /// Transactions confirmed by a validator quorum
    pub tx_completes: TimelineAggregator,

    /// Messages sent for committee-local transactions, per peer
    pub local_messages: TimelineAggregator,

    /// Messages sent for all transactions, per peer
    pub all_messages: TimelineAggregator,

    /// Wallets with inconsistent custody history, per wallet
    pub corrupt_wallets: TimelineAggregator,

    /// Coins without a legitimate owner
    pub coins_lost: TimelineAggregator,

    /// Peers in the network, if the log recorded it
    pub peer_count: Option<u64>,

    /// Wallets in the network, if the log recorded it
    pub wallet_count: Option<u64>,

    /// Test runs replayed into the aggregators so far
    pub runs_replayed: usize,
}

impl LedgerTimelines {
    /// Create empty timelines for runs of `round_count` rounds
    ///
    /// **Public** - constructor
    ///
    /// Message timelines normalize by the peer count and the corruption
    /// timeline by the wallet count; a missing count leaves the factor
    /// at 1 (normalization disabled).
    pub fn new(
        round_count: u64,
        peer_count: Option<u64>,
        wallet_count: Option<u64>,
    ) -> Result<Self, TimelineError> {
        let peer_factor = peer_count.unwrap_or(1).max(1) as f64;
        let wallet_factor = wallet_count.unwrap_or(1).max(1) as f64;

        Ok(Self {
            tx_starts: TimelineAggregator::new(0, round_count)?,
            honest_tx_starts: TimelineAggregator::new(0, round_count)?,
            tx_completes: TimelineAggregator::new(0, round_count)?,
            local_messages: TimelineAggregator::with_normalization(0, round_count, peer_factor)?,
            all_messages: TimelineAggregator::with_normalization(0, round_count, peer_factor)?,
            corrupt_wallets: TimelineAggregator::with_normalization(
                0,
                round_count,
                wallet_factor,
            )?,
            coins_lost: TimelineAggregator::new(0, round_count)?,
            peer_count,
            wallet_count,
            runs_replayed: 0,
        })
    }

    /// Rounds per run
    pub fn round_count(&self) -> u64 {
        self.tx_starts.round_count()
    }
}

/// A pending or confirmed transaction, tracked by sequence number
#[derive(Debug, Clone)]
struct Proposal {
    coin: CoinId,
    sender: WalletId,
    receiver: WalletId,
    honest: bool,
    rollback: bool,

    /// Fractional validator countdown; confirmed once it reaches zero
    validators_still_needed: f64,

    /// Round of the confirming validation, once confirmed
    round_confirmed: Option<u64>,
}

impl Proposal {
    fn new(record: &TransactionRecord) -> Self {
        Self {
            coin: record.coin,
            sender: record.sender,
            receiver: record.receiver,
            honest: record.honest,
            rollback: record.rollback,
            validators_still_needed: QUORUM_FRACTION * f64::from(record.validators_needed),
            round_confirmed: None,
        }
    }
}

/// Last known custody of a coin during the propagation walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CoinCustody {
    /// Held by this wallet as far as confirmed transfers agree
    Held(WalletId),

    /// A confirmed fork left no consistent owner
    Unknown,
}

/// Replay an entire decoded log into a fresh set of timelines
///
/// **Public** - main entry point for analysis
///
/// Dimensions (round range, normalization factors) are taken from the
/// first test run; each test contributes one run to every timeline.
///
/// # Errors
/// * `ReplayError::NoTests` - the log has no test runs
/// * any error from [`replay_test`]
pub fn analyze_log(log: &SimulationLog) -> Result<LedgerTimelines, ReplayError> {
    let first = log.tests.first().ok_or(ReplayError::NoTests)?;

    let mut timelines = LedgerTimelines::new(
        first.round_info.round_count,
        first.peer_count(),
        first.wallet_count(),
    )
    .map_err(ReplayError::Timeline)?;

    for (run, test) in log.tests.iter().enumerate() {
        debug!(
            "Replaying test run {}: {} transactions, {} validations, {} messages",
            run,
            test.transactions.len(),
            test.validations.len(),
            test.messages.len()
        );
        replay_test(test, run, &mut timelines)?;
        timelines.runs_replayed += 1;
    }

    Ok(timelines)
}

/// Replay a single test run into the shared timelines
///
/// **Public** - one run of the corruption replay algorithm
///
/// # Errors
/// * `ReplayError::UnknownSequence` - validation for an unseen seqNum
/// * `ReplayError::MissingProposal` - gap in the sequence-number walk
/// * `ReplayError::MissingByzantineRound` - corruption seeds without a
///   byzantine round
/// * `ReplayError::Timeline` - an event fell outside the round range
pub fn replay_test(
    test: &TestRecord,
    run: RunId,
    timelines: &mut LedgerTimelines,
) -> Result<(), ReplayError> {
    let mut proposals: BTreeMap<u64, Proposal> = BTreeMap::new();
    let mut rollbacks_by_sender: HashMap<WalletId, i64> = HashMap::new();
    let mut max_seq_num: Option<u64> = None;

    // Register every submission as a pending proposal.
    for tx in &test.transactions {
        max_seq_num = Some(max_seq_num.map_or(tx.seq_num, |seen| seen.max(tx.seq_num)));

        timelines.tx_starts.record_event(tx.round, run)?;
        if tx.honest {
            timelines.honest_tx_starts.record_event(tx.round, run)?;
        }
        if tx.rollback {
            *rollbacks_by_sender.entry(tx.sender).or_insert(0) += 1;
        }

        proposals.insert(tx.seq_num, Proposal::new(tx));
    }

    // Coins listed as lost to the takeover count from the byzantine round.
    if let Some(lost) = &test.lost_coins {
        let byz_round = byzantine_round(test)?;
        for _ in lost {
            timelines.coins_lost.record_event(byz_round, run)?;
        }
    }

    // Confirmation pass: count down validator quorums.
    for validation in &test.validations {
        let proposal = proposals
            .get_mut(&validation.seq_num)
            .ok_or(ReplayError::UnknownSequence {
                seq_num: validation.seq_num,
            })?;

        if proposal.validators_still_needed > 0.0 {
            proposal.validators_still_needed -= 1.0;
            if proposal.validators_still_needed <= 0.0 {
                proposal.round_confirmed = Some(validation.round);
                timelines.tx_completes.record_event(validation.round, run)?;

                if proposal.rollback {
                    // A confirmed rollback returns a stolen coin: reverse
                    // the loss, and once the sender has no rollbacks left
                    // outstanding, reverse its corruption too.
                    timelines
                        .coins_lost
                        .record_weighted(validation.round, run, -1.0)?;
                    let outstanding = rollbacks_by_sender.entry(proposal.sender).or_insert(0);
                    *outstanding -= 1;
                    if *outstanding == 0 {
                        timelines
                            .corrupt_wallets
                            .record_weighted(validation.round, run, -1.0)?;
                    }
                }
            }
        }
    }

    // Corruption seed pass plus custody propagation. Only runs when the
    // log carries corruption metadata for this test.
    if let Some(seeded) = &test.corrupt_wallets {
        let byz_round = byzantine_round(test)?;
        let mut corrupt: HashSet<WalletId> = HashSet::new();

        for &wallet in seeded {
            corrupt.insert(wallet);
            timelines.corrupt_wallets.record_event(byz_round, run)?;
        }

        if let Some(max_seq) = max_seq_num {
            propagate_custody(
                &proposals,
                max_seq,
                &mut corrupt,
                run,
                &mut timelines.corrupt_wallets,
            )?;
        }
    }

    // Message pass: batches weight the message timelines.
    for message in &test.messages {
        let weight = message.batch_size as f64;
        timelines
            .all_messages
            .record_weighted(message.round, run, weight)?;
        if message.transaction_type == MessageScope::Local {
            timelines
                .local_messages
                .record_weighted(message.round, run, weight)?;
        }
    }

    Ok(())
}

/// Walk confirmed proposals in sequence-number order, tracking coin
/// custody and corrupting wallets involved in inconsistent transfers
///
/// **Private** - the propagation pass
///
/// Sequence numbers are assigned at submission time, so walking them in
/// increasing order approximates chronological order. Best effort, not a
/// guarantee.
fn propagate_custody(
    proposals: &BTreeMap<u64, Proposal>,
    max_seq_num: u64,
    corrupt: &mut HashSet<WalletId>,
    run: RunId,
    corrupt_wallets: &mut TimelineAggregator,
) -> Result<(), ReplayError> {
    let mut custody: HashMap<CoinId, CoinCustody> = HashMap::new();
    let mut tainted: HashSet<CoinId> = HashSet::new();

    for seq_num in 0..=max_seq_num {
        let proposal = proposals
            .get(&seq_num)
            .ok_or(ReplayError::MissingProposal { seq_num })?;

        let Some(round) = proposal.round_confirmed else {
            continue;
        };

        match custody.get(&proposal.coin) {
            None => {
                // First confirmed transfer establishes custody.
                custody.insert(proposal.coin, CoinCustody::Held(proposal.receiver));
                if !proposal.honest {
                    tainted.insert(proposal.coin);
                    mark_corrupt(corrupt, proposal.sender, round, run, corrupt_wallets)?;
                    mark_corrupt(corrupt, proposal.receiver, round, run, corrupt_wallets)?;
                }
            }
            Some(CoinCustody::Held(owner)) if *owner == proposal.sender => {
                // Custody transfers normally, unless the transfer itself
                // is dishonest or the coin's history is already broken.
                if !proposal.honest || proposal.rollback || tainted.contains(&proposal.coin) {
                    tainted.insert(proposal.coin);
                    mark_corrupt(corrupt, proposal.sender, round, run, corrupt_wallets)?;
                    mark_corrupt(corrupt, proposal.receiver, round, run, corrupt_wallets)?;
                }
                custody.insert(proposal.coin, CoinCustody::Held(proposal.receiver));
            }
            Some(_) => {
                // Confirmed fork: sender was not the last known owner.
                custody.insert(proposal.coin, CoinCustody::Unknown);
                tainted.insert(proposal.coin);
                mark_corrupt(corrupt, proposal.sender, round, run, corrupt_wallets)?;
                mark_corrupt(corrupt, proposal.receiver, round, run, corrupt_wallets)?;
            }
        }
    }

    Ok(())
}

/// Flag a wallet as corrupt, recording the transition exactly once
///
/// **Private** - corruption transitions are idempotent
fn mark_corrupt(
    corrupt: &mut HashSet<WalletId>,
    wallet: WalletId,
    round: u64,
    run: RunId,
    corrupt_wallets: &mut TimelineAggregator,
) -> Result<(), TimelineError> {
    if corrupt.insert(wallet) {
        corrupt_wallets.record_event(round, run)?;
    }
    Ok(())
}

/// Byzantine round of a test that carries corruption records
///
/// **Private** - seeds without a byzantine round are a log fault
fn byzantine_round(test: &TestRecord) -> Result<u64, ReplayError> {
    test.round_info
        .byzantine_round
        .ok_or(ReplayError::MissingByzantineRound)
}
