//! Tracing setup
//!
//! `RUST_LOG` wins when present. Otherwise `APP_LOG_LEVEL` accepts the
//! familiar level names (DEBUG, INFO, WARNING, ERROR, CRITICAL) and anything
//! unrecognised falls back to INFO.

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_LEVEL_VAR: &str = "APP_LOG_LEVEL";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Map an `APP_LOG_LEVEL` value onto a tracing level directive
pub fn level_from_env_value(value: Option<&str>) -> &'static str {
    match value.map(|v| v.trim().to_ascii_uppercase()).as_deref() {
        Some("TRACE") => "trace",
        Some("DEBUG") => "debug",
        Some("INFO") => "info",
        Some("WARNING") | Some("WARN") => "warn",
        Some("ERROR") | Some("CRITICAL") | Some("FATAL") => "error",
        _ => DEFAULT_LOG_LEVEL,
    }
}

/// Install the global subscriber
pub fn init() {
    let app_level = level_from_env_value(std::env::var(LOG_LEVEL_VAR).ok().as_deref());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("{app_level},voicechat={app_level},wgpu=warn,eframe=warn,winit=warn").into()
    });

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .try_init();

    info!("Log level set to {}", app_level.to_ascii_uppercase());
}
