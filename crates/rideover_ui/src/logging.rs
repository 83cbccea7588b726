use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Set to `1` or `true` to log debug output from the app crates.
pub const VERBOSE_ENV: &str = "RIDEOVER_LOG_VERBOSE";

pub fn init() {
    let verbose = std::env::var(VERBOSE_ENV)
        .map(|value| is_truthy(&value))
        .unwrap_or(false);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "rideover_core=debug,rideover_ui=debug,warn"
    } else {
        "rideover_core=info,rideover_ui=info,warn"
    }
}

fn is_truthy(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
