//! Tracing initialization.
//!
//! The service picks one of three logging profiles through `LOG_LEVEL`:
//!
//! | profile | format | level |
//! |---------|--------|-------|
//! | `debug` | pretty | debug |
//! | `dev`   | json   | debug |
//! | `prod`  | json   | info  |
//!
//! Unknown profiles fall back to `dev`. `RUST_LOG`, when set, overrides the level.

use std::env;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

pub const PROFILE_DEBUG: &str = "debug";
pub const PROFILE_DEV: &str = "dev";
pub const PROFILE_PROD: &str = "prod";

/// Configuration for tracing initialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Service name for log attribution
    pub service_name: String,
    /// Profile name the config was derived from
    pub profile: String,
    /// Log format: "json" or "pretty"
    pub format: String,
    /// Log level filter (e.g., "info", "debug", "subscription_service=debug,info")
    pub level: String,
    /// Whether to log span events (enter/exit)
    pub log_spans: bool,
    /// Whether to include file/line in logs
    pub include_location: bool,
}

impl TracingConfig {
    /// Config for a service under the given logging profile.
    pub fn for_profile(service_name: impl Into<String>, profile: &str) -> Self {
        let (profile, format, level) = match profile {
            PROFILE_DEBUG => (PROFILE_DEBUG, "pretty", "debug"),
            PROFILE_PROD => (PROFILE_PROD, "json", "info"),
            _ => (PROFILE_DEV, "json", "debug"),
        };

        Self {
            service_name: service_name.into(),
            profile: profile.to_string(),
            format: format.to_string(),
            level: level.to_string(),
            log_spans: env::var("LOG_SPANS").map(|v| v == "true").unwrap_or(false),
            include_location: profile == PROFILE_DEBUG,
        }
    }

    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}

/// Installs the global subscriber. Call once, at startup.
pub fn init_tracing(config: TracingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let span_events = if config.log_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    if config.is_json() {
        let layer = fmt::layer()
            .json()
            .with_span_events(span_events)
            .with_current_span(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .init();
    } else {
        let layer = fmt::layer()
            .pretty()
            .with_span_events(span_events)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_target(true);

        tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .init();
    }

    tracing::info!(
        service = %config.service_name,
        profile = %config.profile,
        format = %config.format,
        "Tracing initialized"
    );
}
