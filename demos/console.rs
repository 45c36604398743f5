use opentelemetry::trace::{SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState};
use opentelemetry::Context;
use tracing::{error, info, warn};

use tracing_otel_console::init::init_logging;
use tracing_otel_console::otel::Resource;
use tracing_otel_console::{HandlerConfig, Level, Record};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = HandlerConfig {
        process: "demo".to_string(),
        min_level: Level::DEBUG,
        otel: true,
        resource: Resource::new("demo-service", "0.1.0"),
        ..Default::default()
    };
    let handler = init_logging(config)?;

    info!(target: "http", key = "value", "Hello World");

    // Attach a remote span so the events below carry its trace id.
    let span_context = SpanContext::new(
        TraceId::from_hex("1234567890abcdef1234567890abcdef")?,
        SpanId::from_hex("fedcba9876543210")?,
        TraceFlags::SAMPLED,
        true,
        TraceState::default(),
    );
    let cx = Context::new().with_remote_span_context(span_context);
    {
        let _guard = cx.clone().attach();
        warn!(target: "db", table = "orders", elapsed_ms = 1250u64, "slow query");
        error!(target: "http", status = 502u64, "upstream failed");
    }

    // Records can also be handed to the handler directly.
    let record = Record::new(Level::FATAL, "jobs", "scheduler stopped").with_attr("pending", 3i64);
    handler.handle(&record, &cx)?;
    if cx.has_active_span() {
        println!("{}", handler.otel_fields(&record, &cx).to_json()?);
    }
    Ok(())
}
