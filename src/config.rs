// Job configuration
//
// A key=value `description` file in the working directory, overlaid by
// `PAYOUT_*` environment variables:
//
//   network=polkadot
//   validators=15oF4u...,13K6QT...
//   num_eras=4
//   bot_token=none
//   chat_id=none
//   notification_mode=all

use std::{fs, path::PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::{
    chain::{Network, ValidatorStash},
    error::ConfigError,
    notify::NotifyTarget,
    reconcile::{NotificationMode, ReconciliationSettings},
};

pub const DEFAULT_CONFIG_PATH: &str = "description";
pub const DEFAULT_NUM_ERAS: u32 = 4;
const ENV_PREFIX: &str = "PAYOUT";

#[derive(Debug, Deserialize)]
struct RawConfig {
    network: Option<String>,
    rpc_url: Option<String>,
    validators: Option<String>,
    num_eras: Option<String>,
    bot_token: Option<String>,
    chat_id: Option<String>,
    notification_mode: Option<String>,
    seed_file: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub network: Network,
    pub rpc_url: String,
    /// Configured order, duplicates kept
    pub validators: Vec<ValidatorStash>,
    pub num_eras: u32,
    pub notify_target: Option<NotifyTarget>,
    pub notification_mode: NotificationMode,
    pub seed_file: PathBuf,
}

impl AppConfig {
    /// Load from `$PAYOUT_CONFIG` (default `./description`) plus the environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("PAYOUT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());

        let contents = fs::read_to_string(&path).map_err(|e| ConfigError::Unreadable {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Self::from_sources(&contents, Environment::with_prefix(ENV_PREFIX))
    }

    fn from_sources(contents: &str, env: Environment) -> Result<Self, ConfigError> {
        let raw: RawConfig = Config::builder()
            .add_source(File::from_str(contents, FileFormat::Ini))
            .add_source(env)
            .build()?
            .try_deserialize()?;

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let network: Network = non_empty(raw.network)
            .ok_or(ConfigError::MissingField("network"))?
            .parse()?;

        let validators: Vec<ValidatorStash> = non_empty(raw.validators)
            .ok_or(ConfigError::MissingField("validators"))?
            .split(',')
            .map(str::trim)
            .filter(|stash| !stash.is_empty())
            .map(ValidatorStash::new)
            .collect();

        if validators.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "validators",
                reason: "no validator stash listed".to_string(),
            });
        }

        let num_eras = match non_empty(raw.num_eras) {
            None => DEFAULT_NUM_ERAS,
            Some(value) => parse_num_eras(&value)?,
        };

        let rpc_url = non_empty(raw.rpc_url)
            .unwrap_or_else(|| network.default_rpc_url().to_string());

        let seed_file = non_empty(raw.seed_file)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(network.seed_file_name()));

        Ok(Self {
            network,
            rpc_url,
            validators,
            num_eras,
            notify_target: NotifyTarget::from_parts(
                raw.bot_token.as_deref(),
                raw.chat_id.as_deref(),
            ),
            notification_mode: NotificationMode::from_config(raw.notification_mode.as_deref())?,
            seed_file,
        })
    }

    pub fn reconciliation_settings(&self) -> ReconciliationSettings {
        ReconciliationSettings {
            network: self.network,
            num_eras: self.num_eras,
            notification_mode: self.notification_mode,
            notify_target: self.notify_target.clone(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_num_eras(value: &str) -> Result<u32, ConfigError> {
    let num_eras: u32 = value.parse().map_err(|_| ConfigError::InvalidValue {
        field: "num_eras",
        reason: format!("{} is not a whole number", value),
    })?;

    if num_eras == 0 {
        return Err(ConfigError::InvalidValue {
            field: "num_eras",
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(num_eras)
}
