//! OpenTelemetry tracing exported to a local file.
//!
//! ```text
//! tracing macros → tracing-opentelemetry → opentelemetry_sdk → OTLP JSON file
//! ```
//!
//! Spans land in `<data_dir>/folio-otlp.json`, one OTLP document per line.
//! The file rotates at 10 MiB and keeps three backups.
//!
//! The level comes from `Config::trace_level` (default `info`) and accepts any
//! `EnvFilter` directive, e.g. `folio::app=debug,info`.

mod export;
mod rotation;

use crate::infrastructure::Environment;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_sdk::resource::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// File name of the span export inside the data directory.
pub const TRACE_FILE_NAME: &str = "folio-otlp.json";

const DEFAULT_LEVEL: &str = "info";

/// Installs the global tracing subscriber.
///
/// Returns `false` without installing anything when the data directory cannot
/// be created or a global subscriber is already set, so repeated calls are
/// harmless.
pub fn init_tracing(config: &Config, env: &dyn Environment) -> bool {
    let level = config.trace_level.as_deref().unwrap_or(DEFAULT_LEVEL);

    let data_dir = env.data_dir();
    if std::fs::create_dir_all(data_dir).is_err() {
        return false;
    }

    let resource = Resource::new(vec![
        KeyValue::new("service.name", export::SCOPE_NAME),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        KeyValue::new("os.type", env.platform().to_string()),
    ]);

    let provider = export::file_tracer_provider(data_dir.join(TRACE_FILE_NAME), resource);
    let otel_layer = OpenTelemetryLayer::new(provider.tracer(export::SCOPE_NAME));

    tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(otel_layer)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::FixedEnvironment;
    use chrono::Utc;

    #[test]
    fn unusable_data_dir_skips_installation() {
        let dir = tempfile::TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();

        let env = FixedEnvironment::new(blocker.join("traces"), Utc::now());
        assert!(!init_tracing(&Config::default(), &env));
    }
}
