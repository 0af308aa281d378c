use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::{
    chain::{ChainClient, Era, ValidatorStash},
    reconcile::report::PayoutOutcome,
};

/// Submits payouts and folds every failure into the outcome
pub struct PayoutExecutor {
    chain: Arc<dyn ChainClient>,
}

impl PayoutExecutor {
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self { chain }
    }

    /// Submit one payout for `(stash, era)` and wait for inclusion
    ///
    /// Exactly one submission per call. Must not run concurrently for the
    /// same pair.
    #[instrument(skip(self), fields(stash = %stash))]
    pub async fn payout(&self, stash: &ValidatorStash, era: Era) -> PayoutOutcome {
        match self.chain.submit_payout(stash, era).await {
            Ok(transaction) => {
                info!("✅ Payout for {} in era {}: {}", stash, era, transaction);
                PayoutOutcome::Success { era, transaction }
            }
            Err(e) => {
                error!("⚠️ Payout FAILED for {} in era {}: {}", stash, era, e);
                PayoutOutcome::Failure {
                    era,
                    error: e.to_string(),
                }
            }
        }
    }
}
