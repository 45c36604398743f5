use serde::Serialize;

use crate::record::{AttrValue, Attributes, Record};
use crate::trace_context::TraceCorrelation;

/// Reserved field names surfaced to tracing-aware consumers.
pub mod fields {
    pub const TRACE_ID: &str = "trace_id";
    pub const SPAN_ID: &str = "span_id";
    pub const TRACE_FLAGS: &str = "trace_flags";
    pub const SERVICE_NAME: &str = "service.name";
    pub const SERVICE_VERSION: &str = "service.version";
    pub const RESOURCE: &str = "resource";
    pub const SCOPE_NAME: &str = "scope.name";
    pub const SCOPE_VERSION: &str = "scope.version";
    pub const TIMESTAMP: &str = "timestamp";
    pub const SEVERITY_TEXT: &str = "severity_text";
    pub const SEVERITY_NUMBER: &str = "severity_number";
    pub const BODY: &str = "body";
    pub const ATTRIBUTES: &str = "attributes";
}

/// Service name used when none is configured.
pub const UNKNOWN_SERVICE: &str = "unknown_service";

/// Identity of the emitting service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resource {
    #[serde(rename = "service.name")]
    pub service_name: String,
    #[serde(rename = "service.version")]
    pub service_version: String,
}

impl Resource {
    pub fn new(service_name: impl Into<String>, service_version: impl Into<String>) -> Self {
        Resource {
            service_name: service_name.into(),
            service_version: service_version.into(),
        }
    }

    /// Service name, or [`UNKNOWN_SERVICE`] when unset.
    pub fn service_name_or_default(&self) -> &str {
        if self.service_name.trim().is_empty() {
            UNKNOWN_SERVICE
        } else {
            &self.service_name
        }
    }
}

/// Library doing the instrumenting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentationScope {
    pub name: String,
    pub version: String,
}

impl Default for InstrumentationScope {
    fn default() -> Self {
        InstrumentationScope {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Correlation fields for one record, in the shape of an OpenTelemetry
/// log record.
///
/// `attributes` only holds what the caller supplied; the reserved fields
/// live at the top level.
#[derive(Debug, Clone, Serialize)]
pub struct OtelFields {
    pub timestamp: String,
    pub severity_text: &'static str,
    pub severity_number: u8,
    pub body: String,
    pub attributes: AttrValue,
    pub resource: Resource,
    #[serde(rename = "scope.name")]
    pub scope_name: String,
    #[serde(rename = "scope.version")]
    pub scope_version: String,
    /// `trace_id`, `span_id` and `trace_flags`, each omitted when empty.
    #[serde(flatten)]
    pub correlation: TraceCorrelation,
}

impl OtelFields {
    pub fn new(
        record: &Record,
        correlation: TraceCorrelation,
        resource: &Resource,
        scope: &InstrumentationScope,
    ) -> Self {
        let severity = record.level.severity();
        OtelFields {
            timestamp: record.timestamp.to_rfc3339(),
            severity_text: severity.text,
            severity_number: severity.number,
            body: record.message.clone(),
            attributes: AttrValue::Map(record.attributes.clone()),
            resource: Resource::new(
                resource.service_name_or_default(),
                resource.service_version.clone(),
            ),
            scope_name: scope.name.clone(),
            scope_version: scope.version.clone(),
            correlation,
        }
    }

    /// Add the reserved fields to `attrs`, keeping any value the caller
    /// already set under the same key. Empty trace fields are left out.
    pub fn merge_into(&self, attrs: &mut Attributes) {
        let trace = [
            (fields::TRACE_ID, &self.correlation.trace_id),
            (fields::SPAN_ID, &self.correlation.span_id),
            (fields::TRACE_FLAGS, &self.correlation.trace_flags),
        ];
        for (key, value) in trace {
            if !value.is_empty() {
                insert_absent(attrs, key, AttrValue::Str(value.clone()));
            }
        }
        insert_absent(attrs, fields::SEVERITY_NUMBER, AttrValue::Uint(u64::from(self.severity_number)));
        insert_absent(attrs, fields::SEVERITY_TEXT, AttrValue::from(self.severity_text));
        insert_absent(attrs, fields::SERVICE_NAME, AttrValue::Str(self.resource.service_name.clone()));
        insert_absent(attrs, fields::SERVICE_VERSION, AttrValue::Str(self.resource.service_version.clone()));
        insert_absent(attrs, fields::SCOPE_NAME, AttrValue::Str(self.scope_name.clone()));
        insert_absent(attrs, fields::SCOPE_VERSION, AttrValue::Str(self.scope_version.clone()));
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn insert_absent(attrs: &mut Attributes, key: &str, value: AttrValue) {
    if !attrs.contains_key(key) {
        attrs.insert(key.to_string(), value);
    }
}
