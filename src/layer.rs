use crate::handler::Handler;
use crate::level::Level;
use crate::record::{AttrValue, Attributes, Record};
use chrono::Utc;
use std::sync::{Arc, atomic::{AtomicU64, Ordering}};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that turns every enabled event into a
/// [`Record`] and hands it to a [`Handler`].
///
/// The event target becomes the record's area and the OpenTelemetry
/// context current on the calling thread supplies trace correlation.
/// Formatting and the write happen on the calling thread; there is no
/// background task or queue.
pub struct ConsoleLayer {
    handler: Arc<Handler>,
    /// Total events seen by the layer (before filtering by level).
    pub total_events: Arc<AtomicU64>,
    /// Events whose line could not be written.
    pub failed_writes: Arc<AtomicU64>,
}

impl ConsoleLayer {
    pub fn new(handler: Arc<Handler>) -> Self {
        Self {
            handler,
            total_events: Arc::new(AtomicU64::new(0)),
            failed_writes: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn handler(&self) -> &Arc<Handler> {
        &self.handler
    }
}

impl<S> Layer<S> for ConsoleLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);
        let meta = event.metadata();
        let level = Level::from(*meta.level());
        if !self.handler.enabled(level) {
            return;
        }

        let mut attributes = Attributes::new();
        let mut message: Option<String> = None;
        let mut visitor = FieldVisitor { fields: &mut attributes, message: &mut message };
        event.record(&mut visitor);

        let record = Record {
            timestamp: Utc::now(),
            level,
            area: meta.target().to_string(),
            message: message.unwrap_or_default(),
            attributes,
        };

        let cx = opentelemetry::Context::current();
        if let Err(e) = self.handler.handle(&record, &cx) {
            // A subscriber has no caller to return the error to.
            self.failed_writes.fetch_add(1, Ordering::Relaxed);
            eprintln!("{}", e);
        }
    }
}

/// Collects event fields into [`Attributes`], keeping their native type
/// where `tracing` exposes one.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut Attributes,
    pub message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), AttrValue::from(value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), AttrValue::Int(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), AttrValue::Uint(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), AttrValue::Float(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), AttrValue::Bool(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let text = format!("{:?}", value);
        if field.name() == "message" {
            *self.message = Some(text);
        } else {
            self.fields.insert(field.name().to_string(), AttrValue::Str(text));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorRegistry;
    use crate::config::HandlerConfig;
    use crate::destination::{Destination, SharedBuffer};
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Registry;

    fn layer(buffer: &SharedBuffer) -> ConsoleLayer {
        let config = HandlerConfig {
            process: "svc".into(),
            timestamp: false,
            colour: false,
            destination: Arc::new(Destination::new(buffer.clone())),
            ..Default::default()
        };
        let handler = Handler::with_registry(config, Arc::new(ColorRegistry::new())).unwrap();
        ConsoleLayer::new(Arc::new(handler))
    }

    #[test]
    fn events_become_lines() {
        let buffer = SharedBuffer::new();
        let layer = layer(&buffer);
        let total = Arc::clone(&layer.total_events);
        let subscriber = Registry::default().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "http", key = "value", "Hello World");
            tracing::debug!(target: "http", "filtered out");
            tracing::warn!(target: "db", attempts = 3u64, ok = false, ratio = 0.5, "retrying {}", "query");
        });

        assert_eq!(
            buffer.lines(),
            [
                "svc:http INFO Hello World key=value",
                "svc:db WARN retrying query attempts=3 ok=false ratio=0.5",
            ]
        );
        assert_eq!(total.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn debug_fields_are_captured_as_text() {
        let buffer = SharedBuffer::new();
        let subscriber = Registry::default().with(layer(&buffer));

        tracing::subscriber::with_default(subscriber, || {
            let peers = vec![1, 2];
            tracing::error!(target: "net", ?peers, "unreachable");
        });

        assert_eq!(buffer.lines(), [r#"svc:net ERROR unreachable peers="[1, 2]""#]);
    }
}
