//! Outbound delivery of rendered lead notifications.

mod console;
mod resend;
mod sendgrid;

pub use console::{ConsoleProvider, DEFAULT_RETAINED_MESSAGES};
pub use resend::{ResendProvider, RESEND_API_BASE};
pub use sendgrid::{SendGridProvider, SENDGRID_API_BASE};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use super::render::NotificationMessage;
use super::validation::is_valid_email;
use crate::config::{AppEnvironment, NotificationConfig};

const USER_AGENT: &str = concat!("contact-intake/", env!("CARGO_PKG_VERSION"));
const MAX_LOGGED_BODY: usize = 512;

/// Outcome of one delivery attempt. Expected failures are values, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed(DeliveryFailure),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered)
    }
}

/// Why a provider could not deliver. Internal detail only; never sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryFailure {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("provider rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("delivery timed out after {0:?}")]
    TimedOut(Duration),
}

/// Capability to transmit a rendered lead notification.
#[async_trait]
pub trait NotificationProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, message: &NotificationMessage) -> DeliveryOutcome;
}

/// Configuration problems detected while choosing a provider at startup.
#[derive(Debug, thiserror::Error)]
pub enum ProviderSetupError {
    #[error("{provider} credential is set but blank")]
    BlankCredential { provider: &'static str },
    #[error("{field} is not a valid email address: '{value}'")]
    InvalidAddress { field: &'static str, value: String },
    #[error("unable to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Picks the provider once for the process lifetime: Resend when its key is
/// present, otherwise SendGrid, otherwise the console. Development always
/// uses the console.
pub fn resolve_provider(
    config: &NotificationConfig,
    environment: AppEnvironment,
) -> Result<Arc<dyn NotificationProvider>, ProviderSetupError> {
    if !is_valid_email(&config.recipient) {
        return Err(ProviderSetupError::InvalidAddress {
            field: "CONTACT_EMAIL",
            value: config.recipient.clone(),
        });
    }
    if !is_valid_email(&config.sender) {
        return Err(ProviderSetupError::InvalidAddress {
            field: "FROM_EMAIL",
            value: config.sender.clone(),
        });
    }

    let resend_key = credential("RESEND_API_KEY", config.resend_api_key.as_deref())?;
    let sendgrid_key = credential("SENDGRID_API_KEY", config.sendgrid_api_key.as_deref())?;

    if environment == AppEnvironment::Development {
        info!("development environment; notifications go to the console provider");
        return Ok(Arc::new(ConsoleProvider::default()));
    }

    if let Some(key) = resend_key {
        let client = http_client(config.timeout)?;
        info!(provider = "resend", "notification provider resolved");
        return Ok(Arc::new(ResendProvider::new(client, key)));
    }

    if let Some(key) = sendgrid_key {
        let client = http_client(config.timeout)?;
        info!(provider = "sendgrid", "notification provider resolved");
        return Ok(Arc::new(SendGridProvider::new(client, key)));
    }

    warn!("no email provider configured; notifications go to the console provider");
    Ok(Arc::new(ConsoleProvider::default()))
}

fn credential(
    provider: &'static str,
    raw: Option<&str>,
) -> Result<Option<String>, ProviderSetupError> {
    match raw {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => {
            Err(ProviderSetupError::BlankCredential { provider })
        }
        Some(value) => Ok(Some(value.trim().to_string())),
    }
}

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}

/// Maps an HTTP response to a delivery outcome; only 2xx counts as delivered.
pub(crate) async fn outcome_from_response(
    provider: &'static str,
    response: reqwest::Response,
) -> DeliveryOutcome {
    let status = response.status();
    if status.is_success() {
        info!(provider, status = status.as_u16(), "notification delivered");
        return DeliveryOutcome::Delivered;
    }

    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_LOGGED_BODY {
        let cut = (0..=MAX_LOGGED_BODY)
            .rev()
            .find(|index| body.is_char_boundary(*index))
            .unwrap_or(0);
        body.truncate(cut);
    }
    warn!(provider, status = status.as_u16(), %body, "provider rejected notification");
    DeliveryOutcome::Failed(DeliveryFailure::Rejected {
        status: status.as_u16(),
        body,
    })
}

pub(crate) fn transport_failure(provider: &'static str, err: reqwest::Error) -> DeliveryOutcome {
    warn!(provider, error = %err, "notification transport failed");
    if err.is_timeout() {
        return DeliveryOutcome::Failed(DeliveryFailure::Transport(format!(
            "request timed out: {err}"
        )));
    }
    DeliveryOutcome::Failed(DeliveryFailure::Transport(err.to_string()))
}
