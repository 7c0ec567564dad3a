//! Machine-readable record encoding
//!
//! One JSON object per line. Attachments carried in the `attrs` field are
//! spliced into the record as top-level keys, next to `module` and
//! `caller`; they never replace the record's own keys.

use std::fmt;

use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::{ChronoLocal, FormatTime};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Field whose JSON object value is flattened into the record
pub(crate) const ATTRS_FIELD: &str = "attrs";

/// Event formatter producing flat JSON records
pub struct JsonRecord {
    timer: ChronoLocal,
}

impl JsonRecord {
    pub fn new() -> Self {
        Self {
            timer: ChronoLocal::rfc_3339(),
        }
    }

    fn to_record(&self, event: &Event<'_>) -> Result<Map<String, Value>, fmt::Error> {
        let mut timestamp = String::new();
        self.timer.format_time(&mut Writer::new(&mut timestamp))?;

        let mut record = Map::new();
        record.insert("timestamp".to_string(), Value::String(timestamp));
        record.insert(
            "level".to_string(),
            Value::String(event.metadata().level().as_str().to_string()),
        );

        let mut visitor = RecordVisitor {
            record: &mut record,
            attrs: None,
        };
        event.record(&mut visitor);

        if let Some(Value::Object(attrs)) = visitor.attrs.take() {
            for (key, value) in attrs {
                record.entry(key).or_insert(value);
            }
        }
        Ok(record)
    }
}

impl Default for JsonRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, N> FormatEvent<S, N> for JsonRecord
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let record = self.to_record(event)?;
        let line = serde_json::to_string(&record).map_err(|_| fmt::Error)?;
        writeln!(writer, "{}", line)
    }
}

struct RecordVisitor<'a> {
    record: &'a mut Map<String, Value>,
    attrs: Option<Value>,
}

impl RecordVisitor<'_> {
    fn insert(&mut self, field: &Field, value: Value) {
        self.record.insert(field.name().to_string(), value);
    }
}

impl Visit for RecordVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let text = format!("{:?}", value);
        if field.name() == ATTRS_FIELD {
            // Rendered from a JSON object by the logger
            match serde_json::from_str::<Value>(&text) {
                Ok(object @ Value::Object(_)) => self.attrs = Some(object),
                _ => self.insert(field, Value::String(text)),
            }
            return;
        }
        self.insert(field, Value::String(text));
    }
}
