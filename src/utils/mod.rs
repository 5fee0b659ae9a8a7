use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber with sensible defaults.
///
/// Hosts that install their own subscriber should skip this; a second global
/// subscriber is ignored rather than treated as an error.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

        let filter = EnvFilter::from_default_env().add_directive(
            "budget_planner=info"
                .parse()
                .unwrap_or_else(|_| LevelFilter::INFO.into()),
        );

        let _ = fmt().with_env_filter(filter).try_init();
    });
}
