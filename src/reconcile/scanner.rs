use std::{ops::Range, sync::Arc};

use tracing::debug;

use crate::{
    chain::{ChainClient, Era, ValidatorStash},
    error::ChainResult,
};

/// Eras of one stash split by claim state, both in ascending order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EraScan {
    /// Eras with at least one unclaimed reward page
    pub unclaimed: Vec<Era>,
    /// Eras with an exposure whose pages are all claimed
    pub claimed: Vec<Era>,
}

/// The eras checked on a run: `[current_era - num_eras, current_era)`
///
/// The active era is never included. Near genesis the window is clamped at
/// era 0 and holds fewer than `num_eras` eras.
pub fn reconciliation_window(current_era: Era, num_eras: u32) -> Range<Era> {
    current_era.saturating_sub(num_eras)..current_era
}

/// Read-only classification of past eras for a stash
pub struct EraRewardScanner {
    chain: Arc<dyn ChainClient>,
}

impl EraRewardScanner {
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self { chain }
    }

    /// Classify every era of `window`
    ///
    /// Each era is queried independently, so the eras are not observed at a
    /// single chain height. Eras without an exposure are left out of both
    /// lists. A failed query aborts the scan.
    pub async fn scan(&self, stash: &ValidatorStash, window: Range<Era>) -> ChainResult<EraScan> {
        let mut scan = EraScan::default();

        for era in window {
            let Some(exposure) = self.chain.reward_exposure(era, stash).await? else {
                debug!("⏭️ No exposure for {} in era {}, skipping", stash.short(), era);
                continue;
            };

            let claimed = self.chain.claimed_pages(era, stash).await?;
            let unclaimed = exposure.unclaimed_pages(&claimed);

            if unclaimed.is_empty() {
                scan.claimed.push(era);
            } else {
                debug!(
                    "Era {} has {} unclaimed page(s) for {}: {:?}",
                    era,
                    unclaimed.len(),
                    stash.short(),
                    unclaimed
                );
                scan.unclaimed.push(era);
            }
        }

        Ok(scan)
    }
}
