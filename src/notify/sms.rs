use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument};

use super::{Notifier, NotifyError};
use crate::config::SmsConfig;

/// Fast2SMS bulk endpoint client.
#[derive(Clone)]
pub struct Fast2SmsClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    sender_id: String,
    language: String,
    route: String,
}

#[derive(Debug, Serialize)]
struct SmsPayload<'a> {
    sender_id: &'a str,
    message: &'a str,
    language: &'a str,
    route: &'a str,
    numbers: &'a str,
}

impl Fast2SmsClient {
    pub fn new(cfg: &SmsConfig, api_key: String) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("build sms http client")?;
        Ok(Self {
            http,
            endpoint: cfg.endpoint.clone(),
            api_key,
            sender_id: cfg.sender_id.clone(),
            language: cfg.language.clone(),
            route: cfg.route.clone(),
        })
    }

    fn payload<'a>(&'a self, phone: &'a str, message: &'a str) -> SmsPayload<'a> {
        SmsPayload {
            sender_id: &self.sender_id,
            message,
            language: &self.language,
            route: &self.route,
            numbers: phone,
        }
    }
}

#[async_trait]
impl Notifier for Fast2SmsClient {
    #[instrument(skip(self, message))]
    async fn send(&self, phone: &str, message: &str) -> Result<serde_json::Value, NotifyError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("authorization", &self.api_key)
            .json(&self.payload(phone, message))
            .send()
            .await?;
        let status = response.status();
        let body = response.json::<serde_json::Value>().await?;
        debug!(%status, "sms provider replied");
        Ok(body)
    }
}
