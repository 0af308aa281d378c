pub mod telegram;

pub use telegram::TelegramNotifier;

use std::fmt;

use async_trait::async_trait;

/// Literal that disables notifications when used as bot token or chat id
pub const DISABLED_SENTINEL: &str = "none";

/// Where operator messages are delivered
#[derive(Clone, PartialEq, Eq)]
pub struct NotifyTarget {
    pub bot_token: String,
    pub chat_id: String,
}

impl NotifyTarget {
    /// Build a target from raw configuration values
    ///
    /// Returns `None` when either value is absent, blank or the disable
    /// sentinel, which suppresses every notification for the run.
    pub fn from_parts(bot_token: Option<&str>, chat_id: Option<&str>) -> Option<Self> {
        let enabled = |value: &str| {
            let value = value.trim();
            !value.is_empty() && !value.eq_ignore_ascii_case(DISABLED_SENTINEL)
        };

        match (bot_token, chat_id) {
            (Some(token), Some(chat)) if enabled(token) && enabled(chat) => Some(Self {
                bot_token: token.trim().to_string(),
                chat_id: chat.trim().to_string(),
            }),
            _ => None,
        }
    }
}

impl fmt::Debug for NotifyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifyTarget")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Operator-facing message channel
///
/// Delivery is fire-and-forget: implementations log their own failures
/// and never report them back to the caller.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, text: &str, target: &NotifyTarget);
}
