use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::domain::ContactSubmission;
use super::notify::{DeliveryFailure, DeliveryOutcome, NotificationProvider};
use super::rate_limit::{contact_key, RateLimitDecision, RateLimiter};
use super::render::MessageRenderer;
use super::scoring::{LeadScore, ScoringEngine};
use super::validation::{validate, ValidationError};

pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Steps a submission moves through. Every path ends at `Responded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeStage {
    Received,
    Validated,
    RateChecked,
    Scored,
    Rendered,
    Dispatched,
    Responded,
}

/// Terminal result of one submission. Each variant maps to one response shape.
#[derive(Debug, Clone, PartialEq)]
pub enum IntakeOutcome {
    Accepted {
        rate_limit: RateLimitDecision,
        score: LeadScore,
    },
    Invalid(ValidationError),
    RateLimited {
        rate_limit: RateLimitDecision,
    },
    DispatchFailed {
        rate_limit: RateLimitDecision,
        score: LeadScore,
        failure: DeliveryFailure,
    },
}

impl IntakeOutcome {
    /// Rate-limit metadata, present whenever the rate check was reached.
    pub fn rate_limit(&self) -> Option<&RateLimitDecision> {
        match self {
            IntakeOutcome::Accepted { rate_limit, .. }
            | IntakeOutcome::RateLimited { rate_limit }
            | IntakeOutcome::DispatchFailed { rate_limit, .. } => Some(rate_limit),
            IntakeOutcome::Invalid(_) => None,
        }
    }

    pub fn score(&self) -> Option<&LeadScore> {
        match self {
            IntakeOutcome::Accepted { score, .. } | IntakeOutcome::DispatchFailed { score, .. } => {
                Some(score)
            }
            IntakeOutcome::Invalid(_) | IntakeOutcome::RateLimited { .. } => None,
        }
    }
}

/// Orchestrates validation, rate limiting, scoring, rendering, and dispatch.
/// Holds shared handles only; one instance serves every request.
pub struct IntakePipeline {
    limiter: Arc<RateLimiter>,
    engine: ScoringEngine,
    renderer: MessageRenderer,
    provider: Arc<dyn NotificationProvider>,
    dispatch_timeout: Duration,
}

impl IntakePipeline {
    pub fn new(
        limiter: Arc<RateLimiter>,
        provider: Arc<dyn NotificationProvider>,
        renderer: MessageRenderer,
    ) -> Self {
        Self {
            limiter,
            engine: ScoringEngine::default(),
            renderer,
            provider,
            dispatch_timeout: DEFAULT_DISPATCH_TIMEOUT,
        }
    }

    /// A zero timeout keeps the default.
    pub fn with_dispatch_timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.dispatch_timeout = timeout;
        }
        self
    }

    pub fn dispatch_timeout(&self) -> Duration {
        self.dispatch_timeout
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub fn renderer(&self) -> &MessageRenderer {
        &self.renderer
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Runs one submission from `client` through every stage.
    pub async fn submit(&self, submission: ContactSubmission, client: &str) -> IntakeOutcome {
        trace_stage(IntakeStage::Received, client);

        let submission = match validate(submission) {
            Ok(valid) => valid,
            Err(rejection) => {
                info!(client, invalid_fields = rejection.errors.len(), "contact submission rejected");
                trace_stage(IntakeStage::Responded, client);
                return IntakeOutcome::Invalid(rejection);
            }
        };
        trace_stage(IntakeStage::Validated, client);

        let rate_limit = self.limiter.check(&contact_key(client));
        trace_stage(IntakeStage::RateChecked, client);
        if !rate_limit.allowed {
            warn!(client, reset_at = %rate_limit.reset_at, "contact submission rate limited");
            trace_stage(IntakeStage::Responded, client);
            return IntakeOutcome::RateLimited { rate_limit };
        }

        let received_at = Utc::now();
        let score = self.engine.score(submission.classification());
        info!(
            client,
            lead_score = score.total,
            raw_score = score.raw_total,
            priority = score.priority.label(),
            "lead scored"
        );
        trace_stage(IntakeStage::Scored, client);

        let message = self.renderer.render(&submission, &score, received_at);
        trace_stage(IntakeStage::Rendered, client);

        let outcome =
            match tokio::time::timeout(self.dispatch_timeout, self.provider.send(&message)).await {
                Ok(outcome) => outcome,
                Err(_) => DeliveryOutcome::Failed(DeliveryFailure::TimedOut(self.dispatch_timeout)),
            };
        trace_stage(IntakeStage::Dispatched, client);

        let result = match outcome {
            DeliveryOutcome::Delivered => {
                info!(
                    client,
                    provider = self.provider.name(),
                    name = submission.name(),
                    email = submission.email(),
                    subject = submission.subject(),
                    lead_score = score.total,
                    remaining = rate_limit.remaining,
                    "contact form submitted successfully"
                );
                IntakeOutcome::Accepted { rate_limit, score }
            }
            DeliveryOutcome::Failed(failure) => {
                error!(
                    client,
                    provider = self.provider.name(),
                    lead_score = score.total,
                    error = %failure,
                    "contact notification failed"
                );
                IntakeOutcome::DispatchFailed {
                    rate_limit,
                    score,
                    failure,
                }
            }
        };
        trace_stage(IntakeStage::Responded, client);
        result
    }
}

fn trace_stage(stage: IntakeStage, client: &str) {
    debug!(client, ?stage, "intake stage");
}
