use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use super::{Notifier, NotifyError};

/// Used when no SMS API key is configured: logs instead of sending.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunNotifier;

#[async_trait]
impl Notifier for DryRunNotifier {
    async fn send(&self, phone: &str, message: &str) -> Result<serde_json::Value, NotifyError> {
        info!(%phone, %message, "dry-run sms");
        Ok(json!({ "dry_run": true }))
    }
}
