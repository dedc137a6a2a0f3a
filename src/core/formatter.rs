//! Wire encoder for the Logtail ingestion format
//!
//! A single entry encodes as
//!
//! ```json
//! {"dt": "2024-01-01T12:00:00.000000+00:00", "message": "...", "level": "Info",
//!  "monolog": {"channel": "app", "context": {}, "extra": {}}}
//! ```
//!
//! and a batch as a JSON array of such objects in input order.

use super::fields::Fields;
use super::log_entry::LogEntry;
use chrono::SecondsFormat;
use serde::Serialize;

#[derive(Serialize)]
struct WireRecord<'a> {
    dt: String,
    message: &'a str,
    level: &'static str,
    monolog: MonologSection<'a>,
}

#[derive(Serialize)]
struct MonologSection<'a> {
    channel: &'a str,
    context: &'a Fields,
    extra: &'a Fields,
}

impl<'a> From<&'a LogEntry> for WireRecord<'a> {
    fn from(entry: &'a LogEntry) -> Self {
        Self {
            dt: entry
                .timestamp()
                .to_rfc3339_opts(SecondsFormat::Micros, false),
            message: entry.message(),
            level: entry.level().name(),
            monolog: MonologSection {
                channel: entry.channel(),
                context: entry.context(),
                extra: entry.extra(),
            },
        }
    }
}

/// Encodes entries into the JSON payload the ingestion endpoint expects
#[derive(Debug, Clone, Copy, Default)]
pub struct LogtailFormatter;

impl LogtailFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Encode one entry as a JSON object
    pub fn encode(&self, entry: &LogEntry) -> Vec<u8> {
        let record = WireRecord::from(entry);
        serde_json::to_vec(&record).unwrap_or_else(|err| Self::fallback(entry, &err).into_bytes())
    }

    /// Encode entries as a JSON array, preserving order
    pub fn encode_batch(&self, entries: &[LogEntry]) -> Vec<u8> {
        let records: Vec<WireRecord<'_>> = entries.iter().map(WireRecord::from).collect();
        match serde_json::to_vec(&records) {
            Ok(payload) => payload,
            // One bad record must not sink the batch
            Err(_) => {
                let mut payload = Vec::with_capacity(entries.len() * 256);
                payload.push(b'[');
                for (index, entry) in entries.iter().enumerate() {
                    if index > 0 {
                        payload.push(b',');
                    }
                    payload.extend_from_slice(&self.encode(entry));
                }
                payload.push(b']');
                payload
            }
        }
    }

    /// Minimal record used when an entry's fields cannot be serialized
    fn fallback(entry: &LogEntry, err: &serde_json::Error) -> String {
        serde_json::json!({
            "dt": entry.timestamp().to_rfc3339_opts(SecondsFormat::Micros, false),
            "message": entry.message(),
            "level": entry.level().name(),
            "monolog": {
                "channel": entry.channel(),
                "context": { "encoding_error": err.to_string() },
                "extra": {},
            },
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FieldValue, LogLevel};
    use chrono::{TimeZone, Utc};
    use serde_json::Value;

    fn decode(payload: &[u8]) -> Value {
        serde_json::from_slice(payload).expect("payload should be valid JSON")
    }

    #[test]
    fn test_encode_single_entry() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let entry = LogEntry::new(LogLevel::Info, "test", "Test message")
            .with_timestamp(at)
            .with_context(Fields::new().with_field("key", "value"))
            .with_extra(Fields::new().with_field("extra_key", "extra_value"));

        let decoded = decode(&LogtailFormatter::new().encode(&entry));

        assert_eq!(decoded["dt"], "2024-01-01T12:00:00.000000+00:00");
        assert_eq!(decoded["message"], "Test message");
        assert_eq!(decoded["level"], "Info");
        assert_eq!(decoded["monolog"]["channel"], "test");
        assert_eq!(decoded["monolog"]["context"], serde_json::json!({"key": "value"}));
        assert_eq!(
            decoded["monolog"]["extra"],
            serde_json::json!({"extra_key": "extra_value"})
        );
    }

    #[test]
    fn test_empty_maps_encode_as_objects() {
        let entry = LogEntry::new(LogLevel::Debug, "test", "bare");
        let decoded = decode(&LogtailFormatter::new().encode(&entry));

        assert_eq!(decoded["monolog"]["context"], serde_json::json!({}));
        assert_eq!(decoded["monolog"]["extra"], serde_json::json!({}));
    }

    #[test]
    fn test_encode_batch_preserves_order() {
        let entries = vec![
            LogEntry::new(LogLevel::Debug, "x", "Debug message"),
            LogEntry::new(LogLevel::Error, "y", "Error message")
                .with_context(Fields::new().with_field("error", true)),
        ];

        let decoded = decode(&LogtailFormatter::new().encode_batch(&entries));
        let items = decoded.as_array().expect("batch should be an array");

        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["level"], "Debug");
        assert_eq!(items[0]["monolog"]["channel"], "x");
        assert_eq!(items[1]["level"], "Error");
        assert_eq!(items[1]["monolog"]["channel"], "y");
        assert_eq!(items[1]["monolog"]["context"], serde_json::json!({"error": true}));
    }

    #[test]
    fn test_encode_empty_batch() {
        let payload = LogtailFormatter::new().encode_batch(&[]);
        assert_eq!(payload, b"[]");
    }

    #[test]
    fn test_deep_nesting_is_not_truncated() {
        let mut value = FieldValue::from("deep_value");
        for depth in (0..64).rev() {
            value = FieldValue::Map(Fields::new().with_field(format!("level{}", depth), value));
        }
        let entry = LogEntry::new(LogLevel::Info, "app", "deep")
            .with_context(Fields::new().with_field("root", value));

        let decoded = decode(&LogtailFormatter::new().encode(&entry));

        let mut cursor = &decoded["monolog"]["context"]["root"];
        for depth in 0..64 {
            cursor = &cursor[format!("level{}", depth)];
        }
        assert_eq!(cursor, "deep_value");
    }

    #[test]
    fn test_complex_context_roundtrip() {
        let context = Fields::new()
            .with_field(
                "user",
                Fields::new()
                    .with_field("id", 123)
                    .with_field("name", "John Doe")
                    .with_field("roles", vec!["admin", "user"]),
            )
            .with_field(
                "metadata",
                Fields::new()
                    .with_field("ip", "192.168.1.1")
                    .with_field("user_agent", "cargo-test"),
            );
        let entry = LogEntry::new(LogLevel::Info, "app", "Complex context test").with_context(context);

        let decoded = decode(&LogtailFormatter::new().encode(&entry));

        assert_eq!(
            decoded["monolog"]["context"],
            serde_json::json!({
                "user": {"id": 123, "name": "John Doe", "roles": ["admin", "user"]},
                "metadata": {"ip": "192.168.1.1", "user_agent": "cargo-test"}
            })
        );
    }

    #[test]
    fn test_errors_are_normalized() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "Test exception");
        let entry = LogEntry::new(LogLevel::Error, "error", "Exception occurred")
            .with_context(Fields::new().with_field("exception", FieldValue::error(&err)));

        let decoded = decode(&LogtailFormatter::new().encode(&entry));
        let exception = &decoded["monolog"]["context"]["exception"];

        assert_eq!(exception["class"], "std::io::error::Error");
        assert_eq!(exception["message"], "Test exception");
        assert_eq!(exception["code"], 0);
        assert!(exception["file"].as_str().unwrap().contains("formatter.rs:"));
    }

    #[test]
    fn test_unencodable_leaves_do_not_abort_payload() {
        let entry = LogEntry::new(LogLevel::Warning, "app", "odd values").with_context(
            Fields::new()
                .with_field("ratio", f64::NAN)
                .with_field("raw", FieldValue::Bytes(vec![0xfe, b'a']))
                .with_field("handle", FieldValue::opaque(&std::time::Duration::from_millis(5))),
        );

        let decoded = decode(&LogtailFormatter::new().encode(&entry));
        let context = &decoded["monolog"]["context"];

        assert_eq!(context["ratio"], "NaN");
        assert_eq!(context["raw"], "\u{fffd}a");
        assert_eq!(context["handle"], "5ms");
    }
}
