//! Environment variable names used to build a [`HandlerConfig`] for
//! services that configure logging from their environment.
//!
//! These are purely helpers; the handler itself never reads the
//! environment.

use std::path::Path;
use std::sync::Arc;

use crate::config::{ConfigError, HandlerConfig};
use crate::destination::Destination;
use crate::otel::{Resource, UNKNOWN_SERVICE};

/// Process name shown in front of every line.
pub const LOG_PROCESS_ENV: &str = "LOG_PROCESS";

/// Minimum level, by name (`trace` .. `fatal`) or number.
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Prefix lines with a timestamp.
pub const LOG_TIMESTAMP_ENV: &str = "LOG_TIMESTAMP";

/// Colour console output.
pub const LOG_COLOUR_ENV: &str = "LOG_COLOUR";

/// Print `{}` for records without attributes.
pub const LOG_EMPTY_ATTRS_ENV: &str = "LOG_EMPTY_ATTRS";

/// Add OpenTelemetry correlation fields.
pub const LOG_OTEL_ENV: &str = "LOG_OTEL";

/// Append to this file instead of writing to stderr.
pub const LOG_FILE_ENV: &str = "LOG_FILE";

/// Service name reported with correlation fields.
pub const OTEL_SERVICE_NAME_ENV: &str = "OTEL_SERVICE_NAME";

/// Service version reported with correlation fields.
pub const OTEL_SERVICE_VERSION_ENV: &str = "OTEL_SERVICE_VERSION";

/// Instrumentation scope name.
pub const LOG_SCOPE_NAME_ENV: &str = "LOG_SCOPE_NAME";

/// Instrumentation scope version.
pub const LOG_SCOPE_VERSION_ENV: &str = "LOG_SCOPE_VERSION";

/// Version reported when none is configured.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Resolve a [`HandlerConfig`] from the process environment.
pub fn config_from_env() -> Result<HandlerConfig, ConfigError> {
    config_from_lookup(|key| std::env::var(key).ok())
}

/// Resolve a [`HandlerConfig`] from any key lookup.
///
/// Unset variables keep the [`HandlerConfig::default`] value. Flags that
/// are neither truthy nor falsy are ignored. An unparseable level or an
/// unopenable log file is an error.
pub fn config_from_lookup<F>(lookup: F) -> Result<HandlerConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = HandlerConfig::default();

    if let Some(process) = lookup(LOG_PROCESS_ENV) {
        config.process = process;
    }
    if let Some(level) = lookup(LOG_LEVEL_ENV) {
        config.min_level = level.parse()?;
    }

    let flag = |key: &str, current: bool| lookup(key).and_then(|v| parse_flag(&v)).unwrap_or(current);
    config.timestamp = flag(LOG_TIMESTAMP_ENV, config.timestamp);
    config.colour = flag(LOG_COLOUR_ENV, config.colour);
    config.show_empty_attrs = flag(LOG_EMPTY_ATTRS_ENV, config.show_empty_attrs);
    config.otel = flag(LOG_OTEL_ENV, config.otel);

    config.resource = Resource::new(
        lookup(OTEL_SERVICE_NAME_ENV).unwrap_or_else(default_service_name),
        lookup(OTEL_SERVICE_VERSION_ENV).unwrap_or_else(|| UNKNOWN_VERSION.to_string()),
    );
    if let Some(name) = lookup(LOG_SCOPE_NAME_ENV) {
        config.scope.name = name;
    }
    if let Some(version) = lookup(LOG_SCOPE_VERSION_ENV) {
        config.scope.version = version;
    }

    if let Some(path) = lookup(LOG_FILE_ENV).filter(|p| !p.trim().is_empty()) {
        config.destination = Arc::new(Destination::file(path)?);
    }

    Ok(config)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// `unknown_service:<executable>` following the OpenTelemetry resource
/// convention, or plain `unknown_service` when the executable is unknown.
pub fn default_service_name() -> String {
    std::env::current_exe()
        .ok()
        .as_deref()
        .and_then(Path::file_stem)
        .and_then(|stem| stem.to_str())
        .map(|stem| format!("{UNKNOWN_SERVICE}:{stem}"))
        .unwrap_or_else(|| UNKNOWN_SERVICE.to_string())
}
