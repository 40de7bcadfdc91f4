/*!
 * Structured Tracing
 * Subscriber setup for the proxy dispatch spans and checker logs
 */

use crate::core::limits::ENV_TRACE_JSON;
use tracing::info;
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Whether an environment value switches JSON output on
fn json_requested(raw: Option<String>) -> bool {
    raw.map(|v| v == "1" || v == "true").unwrap_or(false)
}

/// Initialize structured tracing
///
/// Returns `false` when a global subscriber was already installed.
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info); `security_proxy=trace` shows
///   one span per proxied operation
/// - SECURITY_TRACE_JSON: Enable JSON output (default: false)
pub fn init_tracing() -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let use_json = json_requested(std::env::var(ENV_TRACE_JSON).ok());
    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .compact(),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        info!(json = use_json, "Security proxy tracing initialized");
    }
    installed
}
