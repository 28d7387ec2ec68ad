//! Contact form intake: validation, per-client rate limiting, lead scoring,
//! message rendering, and notification dispatch.

pub mod domain;
pub mod notify;
pub mod pipeline;
pub mod rate_limit;
pub mod render;
pub mod router;
pub mod scoring;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{ContactSubmission, FieldError, LeadClassification, ValidatedSubmission};
pub use notify::{
    resolve_provider, ConsoleProvider, DeliveryFailure, DeliveryOutcome, NotificationProvider,
    ProviderSetupError, ResendProvider, SendGridProvider,
};
pub use pipeline::{IntakeOutcome, IntakePipeline, IntakeStage};
pub use rate_limit::{contact_key, RateLimitDecision, RateLimitPolicy, RateLimiter};
pub use render::{LeadDigest, MessageRenderer, NotificationMessage};
pub use router::{client_address, intake_router};
pub use scoring::{LeadFactor, LeadPriority, LeadScore, ScoreComponent, ScoringEngine};
pub use validation::{validate, ValidationError};
