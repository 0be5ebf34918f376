use env_logger::Env;

/// Env var that switches the binary from env_logger to a tracing subscriber.
pub const TRACING_ENV: &str = "SPEC_DEDUP_TRACING";

const DEFAULT_FILTER: &str = "info";

fn tracing_requested() -> bool {
    std::env::var(TRACING_ENV)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Installs the process logger. RUST_LOG overrides the `info` default in both modes;
/// with SPEC_DEDUP_TRACING set, `log` records are forwarded to a tracing fmt subscriber.
pub fn init_logging() {
    if !tracing_requested() {
        let _ = env_logger::Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER))
            .try_init();
        return;
    }

    let _ = tracing_log::LogTracer::init();
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        log::debug!("tracing subscriber already installed");
    }
}
