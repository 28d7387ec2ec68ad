use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::warn;

use super::domain::{ContactSubmission, FieldError};
use super::pipeline::{IntakeOutcome, IntakePipeline};
use super::rate_limit::RateLimitDecision;

pub const CONTACT_PATH: &str = "/api/contact";

const FALLBACK_CLIENT: &str = "127.0.0.1";
const SUCCESS_MESSAGE: &str = "Thank you for your message! We'll get back to you soon.";
const INVALID_MESSAGE: &str = "Please check your form data";
const FAILURE_MESSAGE: &str = "Something went wrong. Please try again or contact us directly.";

const LIMIT_HEADER: &str = "x-ratelimit-limit";
const REMAINING_HEADER: &str = "x-ratelimit-remaining";
const RESET_HEADER: &str = "x-ratelimit-reset";

/// JSON envelope shared by every contact endpoint response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IntakeResponseBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rate_limited: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reset_time: Option<i64>,
}

impl IntakeResponseBody {
    fn plain(success: bool, message: impl Into<String>) -> Self {
        Self {
            success,
            message: message.into(),
            errors: None,
            rate_limited: None,
            reset_time: None,
        }
    }
}

/// Router exposing the contact form endpoint.
pub fn intake_router(pipeline: Arc<IntakePipeline>) -> Router {
    Router::new()
        .route(CONTACT_PATH, post(submit_handler))
        .with_state(pipeline)
}

/// Resolves the caller's address from proxy headers, falling back to loopback.
pub fn client_address(headers: &HeaderMap) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    if let Some(forwarded) = header("x-forwarded-for") {
        if let Some(first) = forwarded
            .split(',')
            .map(str::trim)
            .find(|candidate| !candidate.is_empty())
        {
            return first.to_string();
        }
    }

    header("x-real-ip")
        .or_else(|| header("cf-connecting-ip"))
        .unwrap_or(FALLBACK_CLIENT)
        .to_string()
}

pub(crate) async fn submit_handler(
    State(pipeline): State<Arc<IntakePipeline>>,
    headers: HeaderMap,
    payload: Result<Json<ContactSubmission>, JsonRejection>,
) -> Response {
    let client = client_address(&headers);

    let submission = match payload {
        Ok(Json(submission)) => submission,
        Err(rejection) => {
            warn!(client = %client, error = %rejection.body_text(), "unreadable contact payload");
            let body = IntakeResponseBody {
                errors: Some(vec![FieldError::new("body", rejection.body_text())]),
                ..IntakeResponseBody::plain(false, INVALID_MESSAGE)
            };
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    let outcome = pipeline.submit(submission, &client).await;
    outcome_response(&pipeline, outcome)
}

fn outcome_response(pipeline: &IntakePipeline, outcome: IntakeOutcome) -> Response {
    match outcome {
        IntakeOutcome::Accepted { rate_limit, .. } => with_rate_limit_headers(
            (
                StatusCode::OK,
                Json(IntakeResponseBody::plain(true, SUCCESS_MESSAGE)),
            )
                .into_response(),
            &rate_limit,
        ),
        IntakeOutcome::Invalid(rejection) => {
            let body = IntakeResponseBody {
                errors: Some(rejection.errors),
                ..IntakeResponseBody::plain(false, INVALID_MESSAGE)
            };
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
        IntakeOutcome::RateLimited { rate_limit } => {
            let retry_at = pipeline.renderer().local_time_of_day(rate_limit.reset_at);
            let body = IntakeResponseBody {
                rate_limited: Some(true),
                reset_time: Some(rate_limit.reset_millis()),
                ..IntakeResponseBody::plain(
                    false,
                    format!("Too many requests. Please try again after {retry_at}."),
                )
            };
            with_rate_limit_headers(
                (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response(),
                &rate_limit,
            )
        }
        IntakeOutcome::DispatchFailed { rate_limit, .. } => with_rate_limit_headers(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(IntakeResponseBody::plain(false, FAILURE_MESSAGE)),
            )
                .into_response(),
            &rate_limit,
        ),
    }
}

fn with_rate_limit_headers(mut response: Response, decision: &RateLimitDecision) -> Response {
    let headers = response.headers_mut();
    headers.insert(LIMIT_HEADER, HeaderValue::from(decision.limit));
    headers.insert(REMAINING_HEADER, HeaderValue::from(decision.remaining));
    headers.insert(RESET_HEADER, HeaderValue::from(decision.reset_millis()));
    response
}
