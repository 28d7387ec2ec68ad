use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use chrono::FixedOffset;
use serde_json::Value;

use crate::intake::domain::{ContactSubmission, LeadClassification};
use crate::intake::notify::{DeliveryFailure, DeliveryOutcome, NotificationProvider};
use crate::intake::pipeline::IntakePipeline;
use crate::intake::rate_limit::{RateLimitPolicy, RateLimiter};
use crate::intake::render::{MessageRenderer, NotificationMessage};

pub(super) fn submission() -> ContactSubmission {
    ContactSubmission {
        name: "Jordan Rivera".to_string(),
        email: "jordan@example.com".to_string(),
        phone: "(925) 555-0142".to_string(),
        subject: "Backyard drainage".to_string(),
        message: "Water pools against the foundation after every storm.".to_string(),
        classification: LeadClassification {
            project_type: Some("drainage".to_string()),
            timeline: Some("1-3-months".to_string()),
            budget: Some("15k-50k".to_string()),
            property_type: Some("residential".to_string()),
            urgency: Some("urgent".to_string()),
            address: Some("1200 First St, Livermore, CA 94550".to_string()),
        },
    }
}

pub(super) fn top_lead() -> LeadClassification {
    LeadClassification {
        project_type: Some("emergency".to_string()),
        timeline: Some("immediate".to_string()),
        budget: Some("over-100k".to_string()),
        property_type: Some("commercial".to_string()),
        urgency: Some("emergency".to_string()),
        address: Some("77 Main Street, Pleasanton".to_string()),
    }
}

pub(super) fn renderer() -> MessageRenderer {
    MessageRenderer::new(
        "leads@example.com",
        "noreply@example.com",
        FixedOffset::west_opt(8 * 3600).expect("valid offset"),
    )
}

pub(super) fn limiter(max_requests: u32) -> Arc<RateLimiter> {
    Arc::new(RateLimiter::new(RateLimitPolicy::new(max_requests, 900_000)))
}

pub(super) fn pipeline_with(
    provider: Arc<dyn NotificationProvider>,
    max_requests: u32,
) -> IntakePipeline {
    IntakePipeline::new(limiter(max_requests), provider, renderer())
}

/// Counts calls and always fails with a provider-specific error.
#[derive(Default)]
pub(super) struct FailingProvider {
    pub(super) calls: AtomicUsize,
}

pub(super) const PROVIDER_SECRET_DETAIL: &str = "sg-internal: api key revoked for account 8812";

#[async_trait]
impl NotificationProvider for FailingProvider {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn send(&self, _message: &NotificationMessage) -> DeliveryOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        DeliveryOutcome::Failed(DeliveryFailure::Rejected {
            status: 401,
            body: PROVIDER_SECRET_DETAIL.to_string(),
        })
    }
}

/// Never finishes within any reasonable dispatch timeout.
pub(super) struct StalledProvider;

#[async_trait]
impl NotificationProvider for StalledProvider {
    fn name(&self) -> &'static str {
        "stalled"
    }

    async fn send(&self, _message: &NotificationMessage) -> DeliveryOutcome {
        tokio::time::sleep(Duration::from_secs(30)).await;
        DeliveryOutcome::Delivered
    }
}

pub(super) fn json_request(payload: &Value, client: &str) -> Request<Body> {
    Request::post("/api/contact")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", client)
        .body(Body::from(serde_json::to_vec(payload).expect("payload serializes")))
        .expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
