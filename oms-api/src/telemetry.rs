use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Default filter directive and output format for a deployment environment.
/// Unknown environments log like `dev`.
pub fn log_settings(env: &str, crate_name: &str) -> (String, LogFormat) {
    match env {
        "local" => (
            format!("{crate_name}=debug,oms_order=debug,oms_store=debug,tower_http=debug,axum::rejection=trace"),
            LogFormat::Pretty,
        ),
        "prod" => (format!("{crate_name}=info,oms_order=info,oms_store=info,tower_http=info"), LogFormat::Json),
        _ => (
            format!("{crate_name}=debug,oms_order=debug,oms_store=debug,tower_http=debug"),
            LogFormat::Json,
        ),
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the default directive.
pub fn init_tracing(env: &str, crate_name: &str) {
    let (directive, format) = log_settings(env, crate_name);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| directive.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer().pretty()).init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}
