use std::io::{self, Write};
use std::sync::Arc;
use std::thread;

use opentelemetry::trace::{SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState};
use opentelemetry::Context;
use tracing_otel_console::color::ColorRegistry;
use tracing_otel_console::otel::Resource;
use tracing_otel_console::{
    AttrValue, Attributes, Destination, Handler, HandlerConfig, HandlerError, Level, Record,
    SharedBuffer,
};

fn config(buffer: &SharedBuffer) -> HandlerConfig {
    HandlerConfig {
        process: "svc".into(),
        timestamp: false,
        colour: false,
        destination: Arc::new(Destination::new(buffer.clone())),
        ..Default::default()
    }
}

fn handler(config: HandlerConfig) -> Handler {
    Handler::with_registry(config, Arc::new(ColorRegistry::new())).unwrap()
}

fn traced(trace_id: &str) -> Context {
    let span_context = SpanContext::new(
        TraceId::from_hex(trace_id).unwrap(),
        SpanId::from_hex("fedcba9876543210").unwrap(),
        TraceFlags::SAMPLED,
        true,
        TraceState::default(),
    );
    Context::new().with_remote_span_context(span_context)
}

#[test]
fn scenario_plain_info_line() {
    let buffer = SharedBuffer::new();
    let handler = handler(config(&buffer));
    let record = Record::new(Level::INFO, "http", "Hello World").with_attr("key", "value");

    handler.handle(&record, &Context::new()).unwrap();

    assert_eq!(buffer.contents(), "svc:http INFO Hello World key=value\n");
}

#[test]
fn scenario_otel_adds_short_and_full_trace_id() {
    let buffer = SharedBuffer::new();
    let handler = handler(HandlerConfig {
        otel: true,
        resource: Resource::new("svc", "1.0.0"),
        ..config(&buffer)
    });
    let record = Record::new(Level::INFO, "http", "Hello World").with_attr("key", "value");
    let cx = traced("1234567890abcdef1234567890abcdef");

    handler.handle(&record, &cx).unwrap();

    let output = buffer.contents();
    let first = output.lines().next().unwrap();
    assert_eq!(first, "svc:http [12345678] INFO Hello World");
    assert!(
        output.contains(r#"  "trace_id": "1234567890abcdef1234567890abcdef","#),
        "{output}"
    );
    assert!(output.contains(r#"  "span_id": "fedcba9876543210","#));
    assert!(output.contains(r#"  "trace_flags": "01","#));
    assert!(output.contains(r#"  "severity_number": 9,"#));
    assert!(output.contains(r#"  "severity_text": "INFO","#));
    assert!(output.contains(r#"  "key": "value","#));

    let fields = handler.otel_fields(&record, &cx);
    let json: serde_json::Value = serde_json::from_str(&fields.to_json().unwrap()).unwrap();
    assert_eq!(json["trace_id"], "1234567890abcdef1234567890abcdef");
    assert!(json["trace_id"]
        .as_str()
        .unwrap()
        .starts_with("12345678"));
}

#[test]
fn scenario_long_attributes_switch_to_block() {
    let buffer = SharedBuffer::new();
    let handler = handler(config(&buffer));
    // user=alice request=0123456789abcdef0123456789abcde -> 50 characters inline
    let record = Record::new(Level::INFO, "http", "Hello World")
        .with_attr("user", "alice")
        .with_attr("request", "0123456789abcdef0123456789abcde");
    assert_eq!(tracing_otel_console::render::inline(&record.attributes).len(), 50);

    handler.handle(&record, &Context::new()).unwrap();

    assert_eq!(
        buffer.lines(),
        [
            "svc:http INFO Hello World",
            "{",
            r#"  "user": "alice","#,
            r#"  "request": "0123456789abcdef0123456789abcde""#,
            "}",
        ]
    );
}

#[test]
fn short_attributes_stay_on_one_line() {
    let buffer = SharedBuffer::new();
    let handler = handler(config(&buffer));
    let record = Record::new(Level::WARN, "db", "slow")
        .with_attr("ms", 1500u64)
        .with_attr("table", "users");

    handler.handle(&record, &Context::new()).unwrap();

    assert_eq!(buffer.lines(), ["svc:db WARN slow ms=1500 table=users"]);
}

#[test]
fn missing_trace_gives_empty_bracket() {
    let buffer = SharedBuffer::new();
    let handler = handler(HandlerConfig { otel: true, ..config(&buffer) });

    handler
        .handle(&Record::new(Level::ERROR, "http", "boom"), &Context::new())
        .unwrap();

    let output = buffer.contents();
    assert!(output.starts_with("svc:http [] ERROR boom"), "{output}");
    assert!(!output.contains("trace_id"));
}

#[test]
fn caller_service_name_is_not_overwritten() {
    let buffer = SharedBuffer::new();
    let handler = handler(HandlerConfig {
        otel: true,
        resource: Resource::new("from-resource", "1"),
        ..config(&buffer)
    });
    let record = Record::new(Level::INFO, "http", "hi").with_attr("service.name", "from-caller");

    handler.handle(&record, &traced("1234567890abcdef1234567890abcdef")).unwrap();

    let output = buffer.contents();
    assert!(output.contains(r#""service.name": "from-caller""#), "{output}");
    assert!(!output.contains("from-resource"));
}

#[test]
fn nested_and_unknown_values_degrade_to_text() {
    #[derive(Debug)]
    #[allow(dead_code)]
    struct Opaque(&'static str);

    let buffer = SharedBuffer::new();
    let handler = handler(HandlerConfig { inline_threshold: 200, ..config(&buffer) });
    let mut inner = Attributes::new();
    inner.insert("a".into(), AttrValue::from(1i64));
    let record = Record::new(Level::new(2), "jobs", "ran")
        .with_attr("inner", inner)
        .with_attr("list", vec![AttrValue::from(true), AttrValue::from(1.5f64)])
        .with_attr("thing", AttrValue::opaque(Opaque("x")));

    handler.handle(&record, &Context::new()).unwrap();

    assert_eq!(
        buffer.lines(),
        [r#"svc:jobs INFO+2 ran inner={a=1} list=[true 1.5] thing=Opaque("x")"#]
    );
}

#[test]
fn closed_destination_is_reported() {
    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let handler = handler(HandlerConfig {
        process: "svc".into(),
        destination: Arc::new(Destination::new(Closed)),
        ..Default::default()
    });
    let err = handler
        .handle(&Record::new(Level::INFO, "http", "lost"), &Context::new())
        .unwrap_err();
    assert!(matches!(err, HandlerError::Destination(e) if e.kind() == io::ErrorKind::BrokenPipe));

    // Filtered records never touch the destination.
    assert!(handler
        .handle(&Record::new(Level::DEBUG, "http", "skipped"), &Context::new())
        .is_ok());
}

#[test]
fn concurrent_handles_never_interleave_lines() {
    colored::control::set_override(true);
    let buffer = SharedBuffer::new();
    let registry = Arc::new(ColorRegistry::new());
    let handler = Arc::new(
        Handler::with_registry(
            HandlerConfig { colour: true, ..config(&buffer) },
            Arc::clone(&registry),
        )
        .unwrap(),
    );

    let threads: Vec<_> = (0..8)
        .map(|t| {
            let handler = Arc::clone(&handler);
            thread::spawn(move || {
                for i in 0..200 {
                    let record = Record::new(Level::INFO, format!("area{}", t % 4), "tick")
                        .with_attr("thread", t as u64)
                        .with_attr("i", i as u64);
                    handler.handle(&record, &Context::new()).unwrap();
                }
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }

    let lines = buffer.lines();
    assert_eq!(lines.len(), 8 * 200);
    for line in &lines {
        assert!(line.contains(" tick thread="), "{line}");
        assert!(line.ends_with(|c: char| c.is_ascii_digit()), "{line}");
    }
    assert_eq!(registry.len(), 4);
    for area in 0..4 {
        let color = registry.color_for("svc", &format!("area{area}"));
        let prefix = color.paint(&format!("svc:area{area}"));
        let count = lines.iter().filter(|l| l.starts_with(&prefix)).count();
        assert_eq!(count, 2 * 200);
    }
}
