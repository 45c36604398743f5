use std::io;
use std::sync::Arc;

use crate::destination::Destination;
use crate::level::{Level, ParseLevelError};
use crate::otel::{InstrumentationScope, Resource};
use crate::render::DEFAULT_INLINE_THRESHOLD;

/// Handler configuration, fixed once the handler is built.
///
/// **Fields**
/// - `process`: name shown before the area in every line; must be non-empty
///   and contain neither `:` nor whitespace.
/// - `min_level`: records below this level are dropped silently.
/// - `timestamp`: prefix lines with an RFC 3339 UTC timestamp.
/// - `colour`: wrap the process/area and level in ANSI colours. `colored`
///   still applies `NO_COLOR` and `CLICOLOR_FORCE` on top of this flag.
/// - `show_empty_attrs`: print `{}` for records without attributes.
/// - `otel`: add trace correlation and service identity to every record.
/// - `resource`, `scope`: identity reported when `otel` is on.
/// - `inline_threshold`: inline attribute length above which the block
///   layout is used.
/// - `destination`: where lines are written.
#[derive(Clone, Debug)]
pub struct HandlerConfig {
    pub process: String,
    pub min_level: Level,
    pub timestamp: bool,
    pub colour: bool,
    pub show_empty_attrs: bool,
    pub otel: bool,
    pub resource: Resource,
    pub scope: InstrumentationScope,
    pub inline_threshold: usize,
    pub destination: Arc<Destination>,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            process: "app".to_string(),
            min_level: Level::INFO,
            timestamp: true,
            colour: true,
            show_empty_attrs: false,
            otel: false,
            resource: Resource::default(),
            scope: InstrumentationScope::default(),
            inline_threshold: DEFAULT_INLINE_THRESHOLD,
            destination: Arc::new(Destination::stderr()),
        }
    }
}

impl HandlerConfig {
    /// Check option combinations that would make every line malformed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.process.is_empty() {
            return Err(ConfigError::EmptyProcess);
        }
        if self.process.contains(|c: char| c == ':' || c.is_whitespace()) {
            return Err(ConfigError::InvalidProcess(self.process.clone()));
        }
        if self.inline_threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        Ok(())
    }
}

/// Error raised while building a handler configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("process name must not be empty")]
    EmptyProcess,

    #[error("process name {0:?} must not contain ':' or whitespace")]
    InvalidProcess(String),

    #[error("inline threshold must be greater than zero")]
    ZeroThreshold,

    #[error(transparent)]
    Level(#[from] ParseLevelError),

    #[error("cannot open log destination: {0}")]
    Destination(#[from] io::Error),
}
