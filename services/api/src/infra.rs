use contact_intake::config::AppConfig;
use contact_intake::error::AppError;
use contact_intake::intake::{
    resolve_provider, IntakePipeline, MessageRenderer, RateLimitPolicy, RateLimiter,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Composition root for the intake pipeline. The limiter and provider are
/// built once here and shared by every request.
pub(crate) fn build_pipeline(config: &AppConfig) -> Result<Arc<IntakePipeline>, AppError> {
    let policy = RateLimitPolicy::from(&config.rate_limit);
    let limiter = Arc::new(RateLimiter::new(policy));

    let notifications = &config.notifications;
    let provider = resolve_provider(notifications, config.environment)?;
    let renderer = MessageRenderer::new(
        notifications.recipient.clone(),
        notifications.sender.clone(),
        notifications.utc_offset,
    );

    let pipeline = IntakePipeline::new(limiter, provider, renderer)
        .with_dispatch_timeout(notifications.timeout);

    info!(
        provider = pipeline.provider_name(),
        max_requests = policy.max_requests(),
        window_secs = policy.window().num_seconds(),
        dispatch_timeout_secs = pipeline.dispatch_timeout().as_secs(),
        "contact intake pipeline assembled"
    );

    Ok(Arc::new(pipeline))
}
