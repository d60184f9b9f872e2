//! Telemetry
//!
//! Sets up `tracing-subscriber` for structured logging. Logs always go to
//! stderr; stdout belongs to the conversation.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter directive for a level, scoped so dependency noise stays at `warn`.
fn filter_directive(log_level: &str) -> String {
    format!("warn,travel_agent={}", log_level)
}

/// Initialize the tracing subscriber with the given log level.
///
/// Priority: `RUST_LOG` env var > `log_level` parameter.
///
/// In debug builds: pretty-printed output.
/// In release builds: JSON structured output with spans.
pub fn init_telemetry_with_level(log_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(log_level)));

    #[cfg(debug_assertions)]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .ok();
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive("debug"), "warn,travel_agent=debug");
    }

    #[test]
    fn test_repeated_init_is_harmless() {
        init_telemetry_with_level("info");
        init_telemetry_with_level("trace");
    }
}
