//! Trace correlation pulled out of an OpenTelemetry [`Context`].

use opentelemetry::trace::TraceContextExt;
use opentelemetry::Context;
use serde::Serialize;

/// Number of trace id characters shown in console lines.
pub const SHORT_TRACE_ID_LEN: usize = 8;

/// Trace, span and flags of the span active in a context.
///
/// Every field is either lowercase hex in its canonical width (32, 16 and
/// 2 characters) or empty when the context carries no valid span.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TraceCorrelation {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub trace_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub span_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub trace_flags: String,
}

impl TraceCorrelation {
    /// Read the active span context. Never fails: a context without a span,
    /// or with an invalid span context, yields empty fields.
    pub fn extract(cx: &Context) -> Self {
        if !cx.has_active_span() {
            return Self::default();
        }
        let span = cx.span();
        let span_context = span.span_context();
        if !span_context.is_valid() {
            return Self::default();
        }
        TraceCorrelation {
            trace_id: format!("{:032x}", span_context.trace_id()),
            span_id: format!("{:016x}", span_context.span_id()),
            trace_flags: format!("{:02x}", span_context.trace_flags().to_u8()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.trace_id.is_empty()
    }

    /// Leading characters of [`trace_id`](Self::trace_id) for console
    /// display; always a prefix of the full id.
    pub fn short_trace_id(&self) -> &str {
        self.trace_id
            .get(..SHORT_TRACE_ID_LEN)
            .unwrap_or(&self.trace_id)
    }
}
