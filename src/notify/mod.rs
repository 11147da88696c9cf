mod dry_run;
mod messages;
mod sms;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

pub use dry_run::DryRunNotifier;
pub use messages::{reminder_message, welcome_message};
pub use sms::Fast2SmsClient;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("sms transport failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Outbound SMS capability. The provider's reply is passed back untouched.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, phone: &str, message: &str) -> Result<serde_json::Value, NotifyError>;
}

/// Outcome of one notification, as reported to the caller.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Delivery {
    Sent { response: serde_json::Value },
    Failed { error: String },
}

impl Delivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, Delivery::Sent { .. })
    }
}

/// Fire-and-forget send: transport errors are logged and folded into the result, never retried.
pub async fn dispatch(notifier: &dyn Notifier, phone: &str, message: &str) -> Delivery {
    match notifier.send(phone, message).await {
        Ok(response) => {
            info!(%phone, "sms dispatched");
            Delivery::Sent { response }
        }
        Err(e) => {
            warn!(%phone, error = %e, "sms dispatch failed");
            Delivery::Failed {
                error: e.to_string(),
            }
        }
    }
}
