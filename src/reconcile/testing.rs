// In-memory chain and notifier for reconciliation tests

use std::{
    collections::{BTreeSet, HashMap, HashSet},
    io,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use tracing::subscriber::DefaultGuard;

use crate::{
    chain::{ChainClient, Era, RewardExposure, TransactionReference, ValidatorStash},
    error::{ChainError, ChainResult},
    notify::{NotificationSink, NotifyTarget},
};

type Key = (String, Era);

fn key(stash: &ValidatorStash, era: Era) -> Key {
    (stash.as_str().to_string(), era)
}

/// Scripted staking state; every submission is recorded
pub struct FakeChain {
    current_era: Era,
    exposures: HashMap<Key, u32>,
    claimed: HashMap<Key, BTreeSet<u32>>,
    failing_payouts: HashSet<Key>,
    failing_reads: HashSet<Key>,
    submissions: Mutex<Vec<(ValidatorStash, Era)>>,
}

impl FakeChain {
    pub fn new(current_era: Era) -> Self {
        Self {
            current_era,
            exposures: HashMap::new(),
            claimed: HashMap::new(),
            failing_payouts: HashSet::new(),
            failing_reads: HashSet::new(),
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub fn with_exposure(mut self, stash: &ValidatorStash, era: Era, page_count: u32) -> Self {
        self.exposures.insert(key(stash, era), page_count);
        self
    }

    pub fn with_claimed(mut self, stash: &ValidatorStash, era: Era, pages: &[u32]) -> Self {
        self.claimed
            .insert(key(stash, era), pages.iter().copied().collect());
        self
    }

    pub fn with_failing_payout(mut self, stash: &ValidatorStash, era: Era) -> Self {
        self.failing_payouts.insert(key(stash, era));
        self
    }

    pub fn with_failing_read(mut self, stash: &ValidatorStash, era: Era) -> Self {
        self.failing_reads.insert(key(stash, era));
        self
    }

    pub fn submissions(&self) -> Vec<(ValidatorStash, Era)> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainClient for FakeChain {
    async fn current_era_index(&self) -> ChainResult<Era> {
        Ok(self.current_era)
    }

    async fn claimed_pages(&self, era: Era, stash: &ValidatorStash) -> ChainResult<BTreeSet<u32>> {
        Ok(self.claimed.get(&key(stash, era)).cloned().unwrap_or_default())
    }

    async fn reward_exposure(
        &self,
        era: Era,
        stash: &ValidatorStash,
    ) -> ChainResult<Option<RewardExposure>> {
        if self.failing_reads.contains(&key(stash, era)) {
            return Err(ChainError::Query {
                entry: "ErasStakersOverview",
                message: "connection reset".to_string(),
            });
        }
        Ok(self
            .exposures
            .get(&key(stash, era))
            .map(|&page_count| RewardExposure { page_count }))
    }

    async fn submit_payout(
        &self,
        stash: &ValidatorStash,
        era: Era,
    ) -> ChainResult<TransactionReference> {
        self.submissions.lock().unwrap().push((stash.clone(), era));

        if self.failing_payouts.contains(&key(stash, era)) {
            return Err(ChainError::Dispatch("Staking.NotController".to_string()));
        }
        Ok(format!("0x{}-{}", stash, era))
    }

    fn signer_address(&self) -> &str {
        "14ShUZUYUR35RBZW6uVVt1zXDxmSQddkeDdXf1JkMA6P721N"
    }
}

/// Records every delivered message with its chat id
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(text, _)| text.clone())
            .collect()
    }

    pub fn chat_ids(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, chat)| chat.clone())
            .collect()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, text: &str, target: &NotifyTarget) {
        self.sent
            .lock()
            .unwrap()
            .push((text.to_string(), target.chat_id.clone()));
    }
}

/// Plain-text log output of the current thread while the guard lives
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn install(&self) -> DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
