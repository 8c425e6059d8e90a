use tracing_subscriber::EnvFilter;

/// Stdout tracing, overridable via RUST_LOG; the http client's request
/// chatter stays at warn.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
