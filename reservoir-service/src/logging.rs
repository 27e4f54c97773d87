//! Tracing subscriber setup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Env;

/// Default filter directives for an environment, used when `RUST_LOG` is unset.
pub fn default_filter(env: Env) -> &'static str {
    match env {
        Env::Local | Env::Dev => "reservoir_service=debug,reservoir=debug,tower_http=debug",
        Env::Prod => "reservoir_service=info,reservoir=info,tower_http=info",
    }
}

/// Install the global tracing subscriber for `env`.
///
/// Must be called once, before any request is served.
pub fn init(env: Env) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(env).into());
    let registry = tracing_subscriber::registry().with(filter);

    match env {
        Env::Local => registry.with(fmt::layer().pretty()).init(),
        Env::Dev => registry.with(fmt::layer().compact()).init(),
        Env::Prod => registry
            .with(fmt::layer().json().with_current_span(true).with_span_list(false))
            .init(),
    }
}
