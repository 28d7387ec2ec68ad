use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use super::{DeliveryOutcome, NotificationProvider};
use crate::intake::render::NotificationMessage;

pub const DEFAULT_RETAINED_MESSAGES: usize = 50;

/// Inert provider: logs the message, keeps the most recent copies, always
/// reports delivery.
#[derive(Debug)]
pub struct ConsoleProvider {
    retain: usize,
    sent: Mutex<VecDeque<NotificationMessage>>,
}

impl Default for ConsoleProvider {
    fn default() -> Self {
        Self::with_retention(DEFAULT_RETAINED_MESSAGES)
    }
}

impl ConsoleProvider {
    /// Keeps at most `retain` messages; older ones are dropped first.
    pub fn with_retention(retain: usize) -> Self {
        Self {
            retain,
            sent: Mutex::new(VecDeque::with_capacity(retain.min(DEFAULT_RETAINED_MESSAGES))),
        }
    }

    /// Retained messages, oldest first.
    pub fn sent(&self) -> Vec<NotificationMessage> {
        self.sent
            .lock()
            .expect("console provider mutex poisoned")
            .iter()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl NotificationProvider for ConsoleProvider {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn send(&self, message: &NotificationMessage) -> DeliveryOutcome {
        info!(
            to = %message.to,
            from = %message.from,
            reply_to = message.reply_to.as_deref().unwrap_or(""),
            subject = %message.subject,
            lead_score = message.digest.lead_score,
            "email captured by console provider\n{}",
            message.text
        );

        if self.retain > 0 {
            let mut sent = self.sent.lock().expect("console provider mutex poisoned");
            while sent.len() >= self.retain {
                sent.pop_front();
            }
            sent.push_back(message.clone());
        }
        DeliveryOutcome::Delivered
    }
}
