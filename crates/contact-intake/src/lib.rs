//! Contact intake: validation, per-client rate limiting, lead scoring, and
//! notification dispatch for inbound lead submissions.

pub mod config;
pub mod error;
pub mod intake;
pub mod telemetry;
