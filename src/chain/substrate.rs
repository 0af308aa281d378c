use std::{collections::BTreeSet, fmt::Display, str::FromStr};

use async_trait::async_trait;
use subxt::{
    dynamic::Value, ext::scale_value::At, tx::TxStatus, utils::AccountId32, OnlineClient,
    PolkadotConfig,
};
use subxt_signer::sr25519::Keypair;
use tracing::{debug, info, instrument};

use crate::{
    chain::{ChainClient, Era, RewardExposure, TransactionReference, ValidatorStash},
    error::{ChainError, ChainResult},
};

const STAKING: &str = "Staking";

/// Staking pallet access over a live RPC connection
pub struct SubstrateClient {
    api: OnlineClient<PolkadotConfig>,
    signer: Keypair,
    signer_address: String,
}

impl SubstrateClient {
    /// Connect to `url` and fetch runtime metadata
    pub async fn connect(url: &str, signer: Keypair) -> ChainResult<Self> {
        info!("🔌 Connecting to {}", url);

        let api = OnlineClient::<PolkadotConfig>::from_url(url)
            .await
            .map_err(|e| ChainError::Connection {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let signer_address = signer.public_key().to_account_id().to_string();

        info!(
            "✅ Connected to {} (runtime spec {})",
            url,
            api.runtime_version().spec_version
        );

        Ok(Self {
            api,
            signer,
            signer_address,
        })
    }

    fn account_id(stash: &ValidatorStash) -> ChainResult<AccountId32> {
        AccountId32::from_str(stash.as_str()).map_err(|e| ChainError::InvalidAddress {
            address: stash.to_string(),
            message: e.to_string(),
        })
    }

    fn era_stash_keys(era: Era, account: &AccountId32) -> Vec<Value> {
        vec![Value::u128(era as u128), Value::from_bytes(account.0)]
    }
}

fn query_error<E: Display>(entry: &'static str) -> impl Fn(E) -> ChainError {
    move |e| ChainError::Query {
        entry,
        message: e.to_string(),
    }
}

fn decode_error<E: Display>(entry: &'static str) -> impl Fn(E) -> ChainError {
    move |e| ChainError::Decode {
        entry,
        message: e.to_string(),
    }
}

#[async_trait]
impl ChainClient for SubstrateClient {
    async fn current_era_index(&self) -> ChainResult<Era> {
        let address = subxt::dynamic::storage(STAKING, "ActiveEra", ());

        let active_era = self
            .api
            .storage()
            .at_latest()
            .await
            .map_err(query_error("ActiveEra"))?
            .fetch(&address)
            .await
            .map_err(query_error("ActiveEra"))?
            .ok_or_else(|| ChainError::Decode {
                entry: "ActiveEra",
                message: "no active era recorded".to_string(),
            })?
            .to_value()
            .map_err(decode_error("ActiveEra"))?;

        let index = active_era
            .at("index")
            .and_then(|index| index.as_u128())
            .ok_or_else(|| ChainError::Decode {
                entry: "ActiveEra",
                message: "missing index field".to_string(),
            })?;

        Era::try_from(index).map_err(decode_error("ActiveEra"))
    }

    async fn claimed_pages(&self, era: Era, stash: &ValidatorStash) -> ChainResult<BTreeSet<u32>> {
        let account = Self::account_id(stash)?;
        let address =
            subxt::dynamic::storage(STAKING, "ClaimedRewards", Self::era_stash_keys(era, &account));

        let claimed = self
            .api
            .storage()
            .at_latest()
            .await
            .map_err(query_error("ClaimedRewards"))?
            .fetch(&address)
            .await
            .map_err(query_error("ClaimedRewards"))?;

        match claimed {
            Some(thunk) => {
                let pages = thunk
                    .as_type::<Vec<u32>>()
                    .map_err(decode_error("ClaimedRewards"))?;
                Ok(pages.into_iter().collect())
            }
            None => Ok(BTreeSet::new()),
        }
    }

    async fn reward_exposure(
        &self,
        era: Era,
        stash: &ValidatorStash,
    ) -> ChainResult<Option<RewardExposure>> {
        let account = Self::account_id(stash)?;
        let address = subxt::dynamic::storage(
            STAKING,
            "ErasStakersOverview",
            Self::era_stash_keys(era, &account),
        );

        let overview = self
            .api
            .storage()
            .at_latest()
            .await
            .map_err(query_error("ErasStakersOverview"))?
            .fetch(&address)
            .await
            .map_err(query_error("ErasStakersOverview"))?;

        let Some(thunk) = overview else {
            return Ok(None);
        };

        let value = thunk
            .to_value()
            .map_err(decode_error("ErasStakersOverview"))?;

        // An overview without page_count carries nothing claimable
        let page_count = match value.at("page_count").and_then(|count| count.as_u128()) {
            Some(count) => u32::try_from(count).map_err(decode_error("ErasStakersOverview"))?,
            None => return Ok(None),
        };

        Ok(Some(RewardExposure { page_count }))
    }

    #[instrument(skip(self), fields(stash = %stash))]
    async fn submit_payout(
        &self,
        stash: &ValidatorStash,
        era: Era,
    ) -> ChainResult<TransactionReference> {
        let account = Self::account_id(stash)?;
        let call = subxt::dynamic::tx(
            STAKING,
            "payout_stakers",
            vec![Value::from_bytes(account.0), Value::u128(era as u128)],
        );

        let mut progress = self
            .api
            .tx()
            .sign_and_submit_then_watch_default(&call, &self.signer)
            .await
            .map_err(|e| ChainError::Submission(e.to_string()))?;

        while let Some(status) = progress.next().await {
            match status.map_err(|e| ChainError::Submission(e.to_string()))? {
                TxStatus::InBestBlock(in_block) | TxStatus::InFinalizedBlock(in_block) => {
                    let events = in_block
                        .wait_for_success()
                        .await
                        .map_err(|e| ChainError::Dispatch(e.to_string()))?;
                    return Ok(format!("0x{}", hex::encode(events.extrinsic_hash())));
                }
                TxStatus::Error { message }
                | TxStatus::Invalid { message }
                | TxStatus::Dropped { message } => {
                    return Err(ChainError::Submission(message));
                }
                _ => debug!("Payout for era {} not yet in a block", era),
            }
        }

        Err(ChainError::Submission(
            "transaction status stream ended before inclusion".to_string(),
        ))
    }

    fn signer_address(&self) -> &str {
        &self.signer_address
    }
}
