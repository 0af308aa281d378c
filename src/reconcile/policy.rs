use std::{fmt, str::FromStr};

use crate::error::ConfigError;

/// Which payout events reach the operator channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationMode {
    #[default]
    All,
    SuccessOnly,
    FailedOnly,
}

impl NotificationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationMode::All => "all",
            NotificationMode::SuccessOnly => "success_only",
            NotificationMode::FailedOnly => "failed_only",
        }
    }

    /// Parse an optional configuration value; absent or blank means `All`
    pub fn from_config(value: Option<&str>) -> Result<Self, ConfigError> {
        match value.map(str::trim) {
            None | Some("") => Ok(NotificationMode::default()),
            Some(value) => value.parse(),
        }
    }

    pub fn should_notify(self, is_success: bool) -> bool {
        should_notify(self, is_success)
    }
}

impl fmt::Display for NotificationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "all" => Ok(NotificationMode::All),
            "success" | "success_only" => Ok(NotificationMode::SuccessOnly),
            "failed" | "failed_only" => Ok(NotificationMode::FailedOnly),
            _ => Err(ConfigError::UnknownNotificationMode(s.to_string())),
        }
    }
}

/// Decide whether an outcome is reported under `mode`
pub fn should_notify(mode: NotificationMode, is_success: bool) -> bool {
    match mode {
        NotificationMode::All => true,
        NotificationMode::SuccessOnly => is_success,
        NotificationMode::FailedOnly => !is_success,
    }
}
