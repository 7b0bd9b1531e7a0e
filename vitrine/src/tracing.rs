//! Installation of vitrine's `tracing` subscriber

use std::fmt;
use std::fmt::Debug;

use serde_json::Map;
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::Event;
use tracing::Subscriber;
use tracing::field::Field;
use tracing::field::Visit;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::FormatFields;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Config;
use crate::config::LogFormat;
use crate::error::VitrineError;

/// Installs the global subscriber
///
/// Events are filtered by `RUST_LOG` or, if it is not set, by [`Config::log_level`].
pub fn init(config: &Config) -> Result<(), VitrineError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)?,
    };
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init()?,
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().event_format(FlatJson {
                service_name: config.service_name.clone(),
            }))
            .try_init()?,
    }
    Ok(())
}

/// [`Format`](tracing_subscriber::fmt::format::Format) for `tracing_subscriber::fmt` layer.
///
/// It formats each event as its own self-contained flat JSON log line,
/// similar to the [`Json`](tracing_subscriber::fmt::format::Json) format.
///
/// It has at least the following keys:
/// - `service_name`
/// - `timestamp`
/// - `level`
/// - `target`
///
/// It may also have the following keys:
/// - `message`
/// - `filename`
/// - `line_number`
/// - `span_name`
///
/// Additionally, it has every key-value pair recorded by the event.
#[derive(Debug, Clone)]
pub struct FlatJson {
    pub service_name: String,
}

impl<S, N> FormatEvent<S, N> for FlatJson
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();

        let mut line = FlatLine::default();
        line.insert("service_name", self.service_name.as_str());
        line.insert(
            "timestamp",
            OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_else(|_| "ERROR".to_string()),
        );
        line.insert("level", meta.level().to_string());
        line.insert("target", meta.target());
        if let Some(filename) = meta.file() {
            line.insert("filename", filename);
        }
        if let Some(line_number) = meta.line() {
            line.insert("line_number", line_number);
        }
        if let Some(span) = ctx.lookup_current() {
            line.insert("span_name", span.name());
        }

        event.record(&mut line);

        writeln!(writer, "{}", Value::Object(line.0))
    }
}

/// Collects an event's fields into a single json object
#[derive(Default)]
struct FlatLine(Map<String, Value>);

impl FlatLine {
    fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }
}

impl Visit for FlatLine {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field.name(), value);
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field.name(), value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field.name(), value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field.name(), value);
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field.name(), value);
    }

    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        self.insert(field.name(), format!("{value:?}"));
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Arc;
    use std::sync::Mutex;

    use tracing::info;
    use tracing::info_span;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn flat_json_writes_one_object_per_event() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer()
                .event_format(FlatJson {
                    service_name: "acme-site".to_string(),
                })
                .with_writer(move || writer.clone()),
        );

        tracing::subscriber::with_default(subscriber, || {
            let _span = info_span!("fetch").entered();
            info!(sequence = 3u64, table = "site_settings", "Applied change");
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 1);

        let line: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(line["service_name"], "acme-site");
        assert_eq!(line["level"], "INFO");
        assert_eq!(line["message"], "Applied change");
        assert_eq!(line["sequence"], 3);
        assert_eq!(line["table"], "site_settings");
        assert_eq!(line["span_name"], "fetch");
        assert!(line["timestamp"].is_string());
        assert!(line["line_number"].is_u64());
    }
}
