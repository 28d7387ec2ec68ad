use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use super::{outcome_from_response, transport_failure, DeliveryOutcome, NotificationProvider};
use crate::intake::render::NotificationMessage;

pub const SENDGRID_API_BASE: &str = "https://api.sendgrid.com";

/// Secondary transactional email API, selected when only its key is configured.
#[derive(Clone)]
pub struct SendGridProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct MailSend<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<Address<'a>>,
    content: [Content<'a>; 2],
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
    subject: &'a str,
}

#[derive(Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

impl SendGridProvider {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: SENDGRID_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl fmt::Debug for SendGridProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendGridProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl NotificationProvider for SendGridProvider {
    fn name(&self) -> &'static str {
        "sendgrid"
    }

    async fn send(&self, message: &NotificationMessage) -> DeliveryOutcome {
        let payload = MailSend {
            personalizations: [Personalization {
                to: [Address { email: &message.to }],
                subject: &message.subject,
            }],
            from: Address {
                email: &message.from,
            },
            reply_to: message
                .reply_to
                .as_deref()
                .map(|email| Address { email }),
            // SendGrid requires text/plain ahead of text/html.
            content: [
                Content {
                    kind: "text/plain",
                    value: &message.text,
                },
                Content {
                    kind: "text/html",
                    value: &message.html,
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/v3/mail/send", self.base_url))
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
