pub mod keys;
pub mod substrate;

use std::{collections::BTreeSet, fmt, str::FromStr};

use async_trait::async_trait;

use crate::error::{ChainResult, ConfigError};

/// Era index as stored by the staking pallet
pub type Era = u32;

/// Extrinsic hash of an included payout, 0x-prefixed hex
pub type TransactionReference = String;

/// Supported relay chains
/// Selects the RPC endpoint, key file and explorer links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Polkadot,
    Kusama,
    Westend,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "polkadot" => Ok(Network::Polkadot),
            "kusama" => Ok(Network::Kusama),
            "westend" => Ok(Network::Westend),
            other => Err(ConfigError::UnknownNetwork(other.to_string())),
        }
    }
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Polkadot => "polkadot",
            Network::Kusama => "kusama",
            Network::Westend => "westend",
        }
    }

    /// Public RPC endpoint used when no `rpc_url` is configured
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::Polkadot => "wss://rpc.polkadot.io",
            Network::Kusama => "wss://kusama-rpc.polkadot.io",
            Network::Westend => "wss://westend-rpc.polkadot.io",
        }
    }

    /// Key file holding the payout account's secret phrase
    pub fn seed_file_name(&self) -> String {
        format!(".{}", self.as_str())
    }

    pub fn explorer_account_url(&self, address: &str) -> String {
        format!("https://{}.subscan.io/account/{}", self.as_str(), address)
    }
}

/// Validator stash account, kept in the canonical form it was configured with
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatorStash(String);

impl ValidatorStash {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for operator messages
    pub fn short(&self) -> String {
        short_address(&self.0)
    }
}

impl fmt::Display for ValidatorStash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reward exposure of a stash in one era, reduced to what claiming needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardExposure {
    pub page_count: u32,
}

impl RewardExposure {
    /// Pages in `[0, page_count)` not present in `claimed`, ascending
    pub fn unclaimed_pages(&self, claimed: &BTreeSet<u32>) -> Vec<u32> {
        (0..self.page_count)
            .filter(|page| !claimed.contains(page))
            .collect()
    }
}

/// Read and write access to the staking pallet
///
/// One client is owned by a run and never used concurrently.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Index of the currently active era
    async fn current_era_index(&self) -> ChainResult<Era>;

    /// Reward pages of `stash` already claimed for `era` (empty when none recorded)
    async fn claimed_pages(&self, era: Era, stash: &ValidatorStash) -> ChainResult<BTreeSet<u32>>;

    /// Exposure overview of `stash` in `era`, `None` when the validator was not active
    async fn reward_exposure(
        &self,
        era: Era,
        stash: &ValidatorStash,
    ) -> ChainResult<Option<RewardExposure>>;

    /// Sign and submit `payout_stakers(stash, era)`, resolving once the
    /// transaction is included in a block
    async fn submit_payout(&self, stash: &ValidatorStash, era: Era)
        -> ChainResult<TransactionReference>;

    /// SS58 address of the account paying the transaction fees
    fn signer_address(&self) -> &str;
}

/// `abcdef...vwxyz` style abbreviation; short inputs are returned unchanged
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 11 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 5..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unclaimed_pages() {
        let exposure = RewardExposure { page_count: 4 };

        let claimed: BTreeSet<u32> = [0, 2].into_iter().collect();
        assert_eq!(exposure.unclaimed_pages(&claimed), vec![1, 3]);

        let all: BTreeSet<u32> = (0..4).collect();
        assert!(exposure.unclaimed_pages(&all).is_empty());

        assert_eq!(exposure.unclaimed_pages(&BTreeSet::new()), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_unclaimed_pages_ignores_out_of_range_claims() {
        let exposure = RewardExposure { page_count: 2 };
        let claimed: BTreeSet<u32> = [0, 5, 9].into_iter().collect();

        let unclaimed = exposure.unclaimed_pages(&claimed);
        assert_eq!(unclaimed, vec![1]);
        assert!(unclaimed.iter().all(|page| *page < exposure.page_count));
    }

    #[test]
    fn test_zero_page_exposure_is_fully_claimed() {
        let exposure = RewardExposure { page_count: 0 };
        assert!(exposure.unclaimed_pages(&BTreeSet::new()).is_empty());
    }

    #[test]
    fn test_short_address() {
        let stash = ValidatorStash::new("15oF4uVJwmo4TdGW7VfQxNLavjCXviqxT9S1MgbjMNHr6Sp5");
        assert_eq!(stash.short(), "15oF4u...r6Sp5");
        assert_eq!(short_address("abc"), "abc");
        assert_eq!(
            stash.to_string(),
            "15oF4uVJwmo4TdGW7VfQxNLavjCXviqxT9S1MgbjMNHr6Sp5"
        );
    }

    #[test]
    fn test_network_parsing() {
        assert_eq!("Polkadot".parse::<Network>().unwrap(), Network::Polkadot);
        assert_eq!(" kusama ".parse::<Network>().unwrap(), Network::Kusama);
        assert!(matches!(
            "rococo".parse::<Network>(),
            Err(ConfigError::UnknownNetwork(_))
        ));
    }

    #[test]
    fn test_network_conventions() {
        assert_eq!(Network::Kusama.default_rpc_url(), "wss://kusama-rpc.polkadot.io");
        assert_eq!(Network::Polkadot.seed_file_name(), ".polkadot");
        assert_eq!(
            Network::Polkadot.explorer_account_url("1abc"),
            "https://polkadot.subscan.io/account/1abc"
        );
    }
}
