use crate::config::RuntimeConfig;
use std::io;
use tracing::Level;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Transport crates that are chatty at debug level.
const QUIET_TARGETS: &[&str] = &["hyper=warn", "reqwest=warn", "rustls=warn", "h2=warn"];

pub fn parse_level(value: &str) -> Level {
    match value.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

pub fn init_tracing(cfg: &RuntimeConfig) {
    let level = parse_level(&cfg.log_level);

    let filter = QUIET_TARGETS.iter().fold(
        EnvFilter::from_default_env().add_directive(level.into()),
        |filter, directive| {
            filter.add_directive(directive.parse().unwrap_or_else(|_| level.into()))
        },
    );

    let make_writer = io::stdout;

    if cfg.log_format.eq_ignore_ascii_case("pretty") {
        let layer = fmt::layer()
            .with_writer(make_writer)
            .with_ansi(cfg.log_color)
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_level(true);

        let _ = Registry::default().with(filter).with(layer).try_init();
    } else {
        let layer = fmt::layer()
            .with_writer(make_writer)
            .with_ansi(false)
            .with_target(true)
            .with_level(true)
            .json()
            .flatten_event(true);

        let _ = Registry::default().with(filter).with(layer).try_init();
    }
}
