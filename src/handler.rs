use opentelemetry::Context;
use std::borrow::Cow;
use std::fmt::Write as _;
use std::io;
use std::sync::Arc;

use crate::color::ColorRegistry;
use crate::config::{ConfigError, HandlerConfig};
use crate::level::Level;
use crate::otel::OtelFields;
use crate::record::{Attributes, Record};
use crate::render::{render, Rendered};
use crate::trace_context::TraceCorrelation;

/// Turns [`Record`]s into console lines and writes them to the configured
/// [`Destination`](crate::destination::Destination).
///
/// Formatting happens without holding any lock; only the final write of a
/// complete line is serialized, so concurrent callers never interleave
/// partial lines.
#[derive(Debug)]
pub struct Handler {
    config: HandlerConfig,
    registry: Arc<ColorRegistry>,
}

impl Handler {
    /// Build a handler that shares the process-wide [`ColorRegistry`].
    pub fn new(config: HandlerConfig) -> Result<Self, ConfigError> {
        Self::with_registry(config, ColorRegistry::global())
    }

    pub fn with_registry(
        config: HandlerConfig,
        registry: Arc<ColorRegistry>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Handler { config, registry })
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.config.min_level
    }

    /// Format and write one record.
    ///
    /// Records below the minimum level are skipped without output. The
    /// only error is a failing destination; it is returned once and the
    /// record is not kept for another attempt.
    pub fn handle(&self, record: &Record, cx: &Context) -> Result<(), HandlerError> {
        if !self.enabled(record.level) {
            return Ok(());
        }
        let line = self.format_line(record, cx);
        self.config.destination.write_line(&line)?;
        Ok(())
    }

    /// Correlation fields for `record`, with the full trace id.
    pub fn otel_fields(&self, record: &Record, cx: &Context) -> OtelFields {
        OtelFields::new(
            record,
            TraceCorrelation::extract(cx),
            &self.config.resource,
            &self.config.scope,
        )
    }

    /// The complete console line for `record`, terminated by `\n`.
    pub fn format_line(&self, record: &Record, cx: &Context) -> String {
        let (attrs, correlation) = self.correlate(record, cx);
        let config = &self.config;
        let mut line = String::new();

        if config.timestamp {
            let _ = write!(line, "{} ", record.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"));
        }

        let origin = format!("{}:{}", config.process, record.area);
        if config.colour {
            let color = self.registry.color_for(&config.process, &record.area);
            line.push_str(&color.paint(&origin));
        } else {
            line.push_str(&origin);
        }

        if let Some(correlation) = &correlation {
            let _ = write!(line, " [{}]", correlation.short_trace_id());
        }

        let level = record.level.to_string();
        line.push(' ');
        if config.colour {
            line.push_str(&record.level.color().paint(&level));
        } else {
            line.push_str(&level);
        }

        if !record.message.is_empty() {
            line.push(' ');
            push_escaped(&mut line, &record.message);
        }

        match render(&attrs, config.inline_threshold, config.show_empty_attrs) {
            Some(Rendered::Inline(text)) => {
                line.push(' ');
                line.push_str(&text);
            }
            Some(Rendered::Block(text)) => {
                line.push('\n');
                line.push_str(&text);
            }
            None => {}
        }

        line.push('\n');
        line
    }

    /// Attributes to render plus the trace correlation, when OTEL mode is on.
    fn correlate<'a>(
        &self,
        record: &'a Record,
        cx: &Context,
    ) -> (Cow<'a, Attributes>, Option<TraceCorrelation>) {
        if !self.config.otel {
            return (Cow::Borrowed(&record.attributes), None);
        }
        let fields = self.otel_fields(record, cx);
        let mut attrs = record.attributes.clone();
        fields.merge_into(&mut attrs);
        (Cow::Owned(attrs), Some(fields.correlation))
    }
}

/// Control characters in the message are written as escapes so one
/// record stays on one line.
fn push_escaped(line: &mut String, message: &str) {
    for c in message.chars() {
        if c.is_control() {
            line.extend(c.escape_default());
        } else {
            line.push(c);
        }
    }
}

/// Error returned from [`Handler::handle`].
#[derive(thiserror::Error, Debug)]
pub enum HandlerError {
    #[error("failed to write log line: {0}")]
    Destination(#[from] io::Error),
}
