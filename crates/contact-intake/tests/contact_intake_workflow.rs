use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::{FixedOffset, Utc};
use contact_intake::intake::{
    intake_router, ConsoleProvider, ContactSubmission, DeliveryOutcome, IntakeOutcome,
    IntakePipeline, LeadClassification, MessageRenderer, NotificationMessage,
    NotificationProvider, RateLimitPolicy, RateLimiter,
};
use serde_json::{json, Value};
use tower::ServiceExt;

const MAX_REQUESTS: u32 = 5;

fn submission() -> ContactSubmission {
    ContactSubmission {
        name: "Casey Nguyen".to_string(),
        email: "casey@example.org".to_string(),
        phone: "925-555-0199".to_string(),
        subject: "Retaining wall estimate".to_string(),
        message: "Our hillside wall is leaning and we need an assessment.".to_string(),
        classification: LeadClassification {
            project_type: Some("retaining-wall".to_string()),
            timeline: Some("immediate".to_string()),
            budget: Some("50k-100k".to_string()),
            property_type: Some("commercial".to_string()),
            urgency: None,
            address: Some("500 Railroad Ave, Danville".to_string()),
        },
    }
}

fn pipeline(provider: Arc<dyn NotificationProvider>) -> IntakePipeline {
    IntakePipeline::new(
        Arc::new(RateLimiter::new(RateLimitPolicy::new(MAX_REQUESTS, 900_000))),
        provider,
        MessageRenderer::new(
            "office@example.org",
            "forms@example.org",
            FixedOffset::east_opt(0).expect("utc"),
        ),
    )
}

fn post(payload: &Value, client: &str) -> Request<Body> {
    Request::post("/api/contact")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-real-ip", client)
        .body(Body::from(payload.to_string()))
        .expect("request builds")
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json payload")
}

struct DownProvider;

#[async_trait]
impl NotificationProvider for DownProvider {
    fn name(&self) -> &'static str {
        "down"
    }

    async fn send(&self, _message: &NotificationMessage) -> DeliveryOutcome {
        DeliveryOutcome::Failed(contact_intake::intake::DeliveryFailure::Transport(
            "connection reset by mail relay".to_string(),
        ))
    }
}

#[tokio::test]
async fn fresh_client_is_accepted_and_notified() {
    let provider = Arc::new(ConsoleProvider::default());
    let pipeline = pipeline(provider.clone());

    let outcome = pipeline.submit(submission(), "203.0.113.9").await;

    let IntakeOutcome::Accepted { rate_limit, score } = outcome else {
        panic!("expected acceptance");
    };
    assert_eq!(rate_limit.remaining, MAX_REQUESTS - 1);
    // retaining-wall 80 + immediate 100 + 50k-100k 90 + commercial 100 + danville 20
    assert_eq!(score.total, 390);

    let sent = provider.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "office@example.org");
    assert_eq!(sent[0].reply_to.as_deref(), Some("casey@example.org"));
}

#[tokio::test]
async fn burst_from_one_client_is_throttled_after_quota() {
    let router = intake_router(Arc::new(pipeline(Arc::new(ConsoleProvider::default()))));
    let payload = serde_json::to_value(submission()).expect("serializes");

    for attempt in 0..MAX_REQUESTS {
        let response = router
            .clone()
            .oneshot(post(&payload, "198.51.100.77"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK, "attempt {attempt}");
    }

    let response = router
        .clone()
        .oneshot(post(&payload, "198.51.100.77"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = json_body(response).await;
    assert_eq!(body["rateLimited"], true);
    assert!(body["resetTime"].as_i64().expect("reset time") > Utc::now().timestamp_millis());

    let other_client = router
        .oneshot(post(&payload, "198.51.100.78"))
        .await
        .expect("route executes");
    assert_eq!(other_client.status(), StatusCode::OK);
}

#[tokio::test]
async fn nine_character_message_is_rejected_before_dispatch() {
    let provider = Arc::new(ConsoleProvider::default());
    let router = intake_router(Arc::new(pipeline(provider.clone())));
    let mut payload = serde_json::to_value(submission()).expect("serializes");
    payload["message"] = json!("nine char");

    let response = router
        .oneshot(post(&payload, "203.0.113.10"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["errors"]
        .as_array()
        .expect("errors")
        .iter()
        .any(|error| error["field"] == "message"));
    assert!(provider.sent().is_empty());
}

#[tokio::test]
async fn provider_outage_is_reported_generically() {
    let router = intake_router(Arc::new(pipeline(Arc::new(DownProvider))));
    let payload = serde_json::to_value(submission()).expect("serializes");

    let response = router
        .oneshot(post(&payload, "192.0.2.99"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.headers()["x-ratelimit-remaining"], "4");
    let body = json_body(response).await;
    assert_eq!(
        body,
        json!({
            "success": false,
            "message": "Something went wrong. Please try again or contact us directly.",
        })
    );
}
