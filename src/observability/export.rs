//! File-backed OpenTelemetry span export.
//!
//! Each exported batch becomes one line of OTLP JSON
//! (`resourceSpans → scopeSpans → spans`) appended to a [`RotatingFile`].

use super::rotation::RotatingFile;
use futures_util::future::BoxFuture;
use opentelemetry::trace::{Event, Link, SpanId, SpanKind, Status, TraceError};
use opentelemetry::{KeyValue, Value};
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::TracerProvider;
use serde_json::{json, Value as Json};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Instrumentation scope reported for every span.
pub const SCOPE_NAME: &str = "Folio";

struct FileSpanExporter {
    file: RotatingFile,
    resource: Resource,
    shut_down: bool,
}

impl SpanExporter for FileSpanExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        let result = if self.shut_down {
            Err(TraceError::from("file exporter is shut down"))
        } else {
            let line = otlp_document(&self.resource, &batch).to_string();
            self.file
                .append_line(&line)
                .map_err(|e| TraceError::from(e.to_string()))
        };
        Box::pin(std::future::ready(result))
    }

    fn shutdown(&mut self) {
        self.shut_down = true;
    }

    fn set_resource(&mut self, resource: &Resource) {
        self.resource = resource.clone();
    }
}

impl std::fmt::Debug for FileSpanExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSpanExporter")
            .field("file", &self.file)
            .field("shut_down", &self.shut_down)
            .finish_non_exhaustive()
    }
}

/// Builds a tracer provider that synchronously appends spans to `path`.
pub fn file_tracer_provider(path: PathBuf, resource: Resource) -> TracerProvider {
    let exporter = FileSpanExporter {
        file: RotatingFile::new(path),
        resource: resource.clone(),
        shut_down: false,
    };

    TracerProvider::builder()
        .with_config(opentelemetry_sdk::trace::Config::default().with_resource(resource))
        .with_simple_exporter(exporter)
        .build()
}

/// Renders a batch as a single OTLP JSON document.
pub fn otlp_document(resource: &Resource, batch: &[SpanData]) -> Json {
    let resource_attributes: Vec<Json> = resource
        .iter()
        .map(|(key, value)| json!({ "key": key.as_str(), "value": any_value(value) }))
        .collect();

    json!({
        "resourceSpans": [{
            "resource": { "attributes": resource_attributes },
            "scopeSpans": [{
                "scope": { "name": SCOPE_NAME },
                "spans": batch.iter().map(span).collect::<Vec<_>>(),
            }],
        }],
    })
}

fn span(data: &SpanData) -> Json {
    let parent = if data.parent_span_id == SpanId::INVALID {
        String::new()
    } else {
        format!("{:016x}", data.parent_span_id)
    };
    let (code, message) = match &data.status {
        Status::Unset => (0, String::new()),
        Status::Ok => (1, String::new()),
        Status::Error { description } => (2, description.to_string()),
    };

    json!({
        "traceId": format!("{:032x}", data.span_context.trace_id()),
        "spanId": format!("{:016x}", data.span_context.span_id()),
        "parentSpanId": parent,
        "name": data.name,
        "kind": kind_code(&data.span_kind),
        "startTimeUnixNano": unix_nanos(data.start_time),
        "endTimeUnixNano": unix_nanos(data.end_time),
        "attributes": attributes(&data.attributes),
        "events": data.events.iter().map(event).collect::<Vec<_>>(),
        "links": data.links.iter().map(link).collect::<Vec<_>>(),
        "status": { "code": code, "message": message },
    })
}

fn event(event: &Event) -> Json {
    json!({
        "timeUnixNano": unix_nanos(event.timestamp),
        "name": event.name,
        "attributes": attributes(&event.attributes),
    })
}

fn link(link: &Link) -> Json {
    json!({
        "traceId": format!("{:032x}", link.span_context.trace_id()),
        "spanId": format!("{:016x}", link.span_context.span_id()),
        "attributes": attributes(&link.attributes),
    })
}

fn attributes(pairs: &[KeyValue]) -> Vec<Json> {
    pairs
        .iter()
        .map(|kv| json!({ "key": kv.key.as_str(), "value": any_value(&kv.value) }))
        .collect()
}

/// OTLP `AnyValue`; 64-bit integers are strings per the JSON mapping.
fn any_value(value: &Value) -> Json {
    match value {
        Value::Bool(b) => json!({ "boolValue": b }),
        Value::I64(i) => json!({ "intValue": i.to_string() }),
        Value::F64(f) => json!({ "doubleValue": f }),
        Value::String(s) => json!({ "stringValue": s.as_str() }),
        Value::Array(_) => json!({ "stringValue": value.to_string() }),
    }
}

const fn kind_code(kind: &SpanKind) -> u8 {
    match kind {
        SpanKind::Internal => 1,
        SpanKind::Server => 2,
        SpanKind::Client => 3,
        SpanKind::Producer => 4,
        SpanKind::Consumer => 5,
    }
}

fn unix_nanos(at: SystemTime) -> String {
    at.duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0)
        .to_string()
}
