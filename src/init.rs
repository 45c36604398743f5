use crate::config::{ConfigError, HandlerConfig};
use crate::handler::Handler;
use crate::layer::ConsoleLayer;
use std::sync::Arc;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Error returned when the global subscriber cannot be installed.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("invalid logging configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("global subscriber already set: {0}")]
    AlreadySet(#[from] SetGlobalDefaultError),
}

/// Initialize the global `tracing` subscriber with a [`ConsoleLayer`]
/// built from `config`.
///
/// **Parameters**
/// - `config`: fully resolved [`HandlerConfig`].
///
/// **Effects**
///
/// Installs a [`Registry`] combined with [`ConsoleLayer`] as the global
/// default subscriber, so every `tracing` event in the process goes
/// through the handler. Returns the handler so callers can also feed it
/// records directly.
pub fn init_logging(config: HandlerConfig) -> Result<Arc<Handler>, InitError> {
    let handler = Arc::new(Handler::new(config)?);
    let subscriber = Registry::default().with(ConsoleLayer::new(Arc::clone(&handler)));
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(handler)
}

/// Same as [`init_logging`], with the configuration read from the
/// environment by [`config_from_env`](crate::env::config_from_env).
pub fn init_logging_from_env() -> Result<Arc<Handler>, InitError> {
    init_logging(crate::env::config_from_env()?)
}
