use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use super::{outcome_from_response, transport_failure, DeliveryOutcome, NotificationProvider};
use crate::intake::render::NotificationMessage;

pub const RESEND_API_BASE: &str = "https://api.resend.com";

/// Primary transactional email API.
#[derive(Clone)]
pub struct ResendProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct ResendEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

impl ResendProvider {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: RESEND_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl fmt::Debug for ResendProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResendProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl NotificationProvider for ResendProvider {
    fn name(&self) -> &'static str {
        "resend"
    }

    async fn send(&self, message: &NotificationMessage) -> DeliveryOutcome {
        let payload = ResendEmail {
            from: &message.from,
            to: [&message.to],
            reply_to: message.reply_to.as_deref(),
            subject: &message.subject,
            html: &message.html,
            text: &message.text,
        };

        let response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(response) => outcome_from_response(self.name(), response).await,
            Err(err) => transport_failure(self.name(), err),
        }
    }
}
