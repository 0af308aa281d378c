// Reconciliation runner
//
// One pass per validator, strictly in configured order:
// 1. Read the active era once and derive the window
// 2. Scan the window for unclaimed and fully claimed eras
// 3. Pay out each unclaimed era, reporting every outcome as it happens,
//    pausing between submissions
// 4. Report the fully claimed eras in one summary message
//
// A failed payout only affects its own era. A failed chain read aborts the
// current validator and the run moves on to the next one.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tracing::{error, info, instrument};

use crate::{
    chain::{ChainClient, Network, ValidatorStash},
    error::ChainResult,
    notify::{NotificationSink, NotifyTarget},
    reconcile::{
        executor::PayoutExecutor,
        policy::NotificationMode,
        report::{MessageFormatter, ReconciliationReport, RunSummary, ValidatorRun},
        scanner::{reconciliation_window, EraRewardScanner},
    },
};

/// Pause after each payout submission before the next one
pub const DEFAULT_PAYOUT_DELAY: Duration = Duration::from_secs(6);

/// Per-run reconciliation settings
#[derive(Debug, Clone)]
pub struct ReconciliationSettings {
    pub network: Network,
    pub num_eras: u32,
    pub notification_mode: NotificationMode,
    /// `None` suppresses every notification
    pub notify_target: Option<NotifyTarget>,
}

pub struct ReconciliationRunner {
    chain: Arc<dyn ChainClient>,
    notifier: Arc<dyn NotificationSink>,
    scanner: EraRewardScanner,
    executor: PayoutExecutor,
    formatter: MessageFormatter,
    settings: ReconciliationSettings,
    payout_delay: Duration,
}

impl ReconciliationRunner {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        notifier: Arc<dyn NotificationSink>,
        settings: ReconciliationSettings,
    ) -> Self {
        let formatter = MessageFormatter::new(settings.network, chain.signer_address());

        Self {
            scanner: EraRewardScanner::new(chain.clone()),
            executor: PayoutExecutor::new(chain.clone()),
            chain,
            notifier,
            formatter,
            settings,
            payout_delay: DEFAULT_PAYOUT_DELAY,
        }
    }

    pub fn with_payout_delay(mut self, delay: Duration) -> Self {
        self.payout_delay = delay;
        self
    }

    /// Reconcile every validator in order
    pub async fn run(&self, validators: &[ValidatorStash]) -> RunSummary {
        let started_at = Utc::now();
        let mut runs = Vec::with_capacity(validators.len());

        for stash in validators {
            info!("🔍 Checking stash: {}", stash);

            let result = self.run_validator(stash).await;
            if let Err(e) = &result {
                error!("❌ Reconciliation aborted for {}: {}", stash, e);
            }

            runs.push(ValidatorRun {
                stash: stash.clone(),
                result,
            });
        }

        RunSummary {
            started_at,
            finished_at: Utc::now(),
            validators: runs,
        }
    }

    /// One reconciliation pass for a single stash
    #[instrument(skip(self), fields(stash = %stash))]
    pub async fn run_validator(&self, stash: &ValidatorStash) -> ChainResult<ReconciliationReport> {
        let current_era = self.chain.current_era_index().await?;
        let window = reconciliation_window(current_era, self.settings.num_eras);

        info!(
            "Active era {}, checking eras {}..{} for {}",
            current_era,
            window.start,
            window.end,
            stash.short()
        );

        let scan = self.scanner.scan(stash, window.clone()).await?;

        let mut outcomes = Vec::with_capacity(scan.unclaimed.len());
        for (index, era) in scan.unclaimed.iter().copied().enumerate() {
            let outcome = self.executor.payout(stash, era).await;

            let message = self.formatter.outcome(stash, &outcome);
            self.notify(outcome.is_success(), &message).await;
            outcomes.push(outcome);

            if index + 1 < scan.unclaimed.len() {
                tokio::time::sleep(self.payout_delay).await;
            }
        }

        let report = ReconciliationReport {
            stash: stash.clone(),
            current_era,
            window,
            outcomes,
            claimed_eras: scan.claimed,
        };

        if let Some(range) = report.claimed_range() {
            info!("✅ era {} - All rewards already claimed for {}", range, stash);
            let message = self.formatter.already_claimed(stash, &range);
            self.notify(true, &message).await;
        }

        Ok(report)
    }

    async fn notify(&self, is_success: bool, message: &str) {
        let Some(target) = &self.settings.notify_target else {
            return;
        };

        if self.settings.notification_mode.should_notify(is_success) {
            self.notifier.send(message, target).await;
        }
    }
}
