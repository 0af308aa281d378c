use std::ops::Range;

use chrono::{DateTime, Utc};

use crate::{
    chain::{short_address, Era, Network, TransactionReference, ValidatorStash},
    error::ChainError,
};

/// Result of one payout attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayoutOutcome {
    Success {
        era: Era,
        transaction: TransactionReference,
    },
    Failure {
        era: Era,
        error: String,
    },
}

impl PayoutOutcome {
    pub fn era(&self) -> Era {
        match self {
            PayoutOutcome::Success { era, .. } | PayoutOutcome::Failure { era, .. } => *era,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PayoutOutcome::Success { .. })
    }
}

/// Everything one validator pass produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationReport {
    pub stash: ValidatorStash,
    pub current_era: Era,
    pub window: Range<Era>,
    /// One entry per unclaimed era, ascending
    pub outcomes: Vec<PayoutOutcome>,
    /// Fully claimed eras in scan order
    pub claimed_eras: Vec<Era>,
}

impl ReconciliationReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Display range of the claimed eras, `None` when nothing was claimed
    pub fn claimed_range(&self) -> Option<String> {
        render_era_range(&self.claimed_eras)
    }

    /// Extrinsic hashes of the successful payouts, in era order
    pub fn transactions(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                PayoutOutcome::Success { transaction, .. } => Some(transaction.as_str()),
                PayoutOutcome::Failure { .. } => None,
            })
            .collect()
    }
}

/// `"E"` for one era, `"first–last"` for several
///
/// Uses the first and last entries as given; gaps are not detected.
pub fn render_era_range(eras: &[Era]) -> Option<String> {
    match eras {
        [] => None,
        [only] => Some(only.to_string()),
        [first, .., last] => Some(format!("{}–{}", first, last)),
    }
}

/// Outcome of one validator within a run
#[derive(Debug)]
pub struct ValidatorRun {
    pub stash: ValidatorStash,
    pub result: Result<ReconciliationReport, ChainError>,
}

/// All validators of one run, in configured order
#[derive(Debug)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub validators: Vec<ValidatorRun>,
}

impl RunSummary {
    pub fn reports(&self) -> impl Iterator<Item = &ReconciliationReport> {
        self.validators.iter().filter_map(|v| v.result.as_ref().ok())
    }

    pub fn payouts_succeeded(&self) -> usize {
        self.reports().map(ReconciliationReport::succeeded).sum()
    }

    pub fn payouts_failed(&self) -> usize {
        self.reports().map(ReconciliationReport::failed).sum()
    }

    /// Validators whose scan was aborted by a chain read error
    pub fn aborted(&self) -> usize {
        self.validators.iter().filter(|v| v.result.is_err()).count()
    }
}

/// Markdown operator messages
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    network: Network,
    sender: String,
}

impl MessageFormatter {
    pub fn new(network: Network, sender: impl Into<String>) -> Self {
        Self {
            network,
            sender: sender.into(),
        }
    }

    pub fn outcome(&self, stash: &ValidatorStash, outcome: &PayoutOutcome) -> String {
        match outcome {
            PayoutOutcome::Success { era, .. } => self.success(stash, *era),
            PayoutOutcome::Failure { era, error } => self.failure(stash, *era, error),
        }
    }

    pub fn success(&self, stash: &ValidatorStash, era: Era) -> String {
        format!(
            "✅ *era {}* - Payout successfully executed for *{}*\n\n*Sender:* [*{}*]({})",
            era,
            stash.short(),
            short_address(&self.sender),
            self.network.explorer_account_url(&self.sender)
        )
    }

    /// The error detail goes in a code span so stray `_`, `*` or `[` in
    /// chain errors cannot break Markdown parsing
    pub fn failure(&self, stash: &ValidatorStash, era: Era, error: &str) -> String {
        format!(
            "⚠️ *Payout FAILED* for *{}* in era {}: `{}`",
            stash.short(),
            era,
            error.replace('`', "'")
        )
    }

    pub fn already_claimed(&self, stash: &ValidatorStash, range: &str) -> String {
        format!(
            "✅ *era {}* - All rewards already claimed for *{}*",
            range,
            stash.short()
        )
    }
}
