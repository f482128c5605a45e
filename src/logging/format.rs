//! Line encoders.
//!
//! Every record becomes exactly one newline-terminated line. JSON lines carry
//! `timestamp`, `level`, `message`, then `log_type`/`caller` when present, then
//! the record's fields. Fields whose names collide with those keys are dropped.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use chrono::{DateTime, Local, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::config::validation::ValidationError;
use crate::logging::event::{FieldValue, LogEvent};

/// RFC 3339 with microseconds and a numeric offset.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f%:z";

const RESERVED_KEYS: [&str; 5] = ["timestamp", "level", "message", "log_type", "caller"];

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable single line.
    Console,
}

impl FromStr for LogFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "console" | "text" => Ok(LogFormat::Console),
            _ => Err(ValidationError::InvalidFormat(s.to_string())),
        }
    }
}

/// Render a timestamp in the wire format.
pub fn format_timestamp(ts: &DateTime<Utc>, local_time: bool) -> String {
    if local_time {
        ts.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string()
    } else {
        ts.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Encode an event as a single newline-terminated line.
pub fn encode(event: &LogEvent, format: LogFormat, local_time: bool) -> Vec<u8> {
    match format {
        LogFormat::Json => encode_json(event, local_time),
        LogFormat::Console => encode_console(event, local_time).into_bytes(),
    }
}

fn encode_json(event: &LogEvent, local_time: bool) -> Vec<u8> {
    let line = JsonLine { event, local_time };
    let mut buf = match serde_json::to_vec(&line) {
        Ok(buf) => buf,
        // Only reachable through non-string map keys, which Fields cannot hold.
        Err(e) => format!(
            "{{\"level\":\"error\",\"message\":\"failed to encode log record: {}\"}}",
            e
        )
        .into_bytes(),
    };
    buf.push(b'\n');
    buf
}

struct JsonLine<'a> {
    event: &'a LogEvent,
    local_time: bool,
}

impl Serialize for JsonLine<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let event = self.event;
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(
            "timestamp",
            &format_timestamp(&event.timestamp, self.local_time),
        )?;
        map.serialize_entry("level", &event.level)?;
        map.serialize_entry("message", &event.message)?;
        if let Some(log_type) = event.log_type {
            map.serialize_entry("log_type", &log_type)?;
        }
        if let Some(caller) = &event.caller {
            map.serialize_entry("caller", caller)?;
        }
        for (key, value) in &event.fields {
            if !RESERVED_KEYS.contains(&key.as_str()) {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

fn encode_console(event: &LogEvent, local_time: bool) -> String {
    let mut line = String::with_capacity(128);
    // Writing into a String cannot fail.
    let _ = write_console(&mut line, event, local_time);
    line.push('\n');
    line
}

fn write_console(out: &mut String, event: &LogEvent, local_time: bool) -> fmt::Result {
    write!(
        out,
        "{} {} ",
        format_timestamp(&event.timestamp, local_time),
        event.level.short()
    )?;
    if let Some(caller) = &event.caller {
        write!(out, "{} > ", caller)?;
    }
    out.push_str(&event.message);
    if let Some(log_type) = event.log_type {
        write!(out, " log_type={}", log_type.as_str())?;
    }
    for (key, value) in &event.fields {
        if RESERVED_KEYS.contains(&key.as_str()) {
            continue;
        }
        match value {
            FieldValue::Str(s) if s.is_empty() || s.contains(char::is_whitespace) => {
                write!(out, " {}={:?}", key, s)?
            }
            other => write!(out, " {}={}", key, other)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::event::{Level, LogType};
    use chrono::TimeZone;

    fn sample_event() -> LogEvent {
        let mut event = LogEvent::new(Level::Info, "User authenticated");
        event.timestamp = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        event.log_type = Some(LogType::Audit);
        event.fields.insert("user_id".into(), "u-1".into());
        event.fields.insert("reason".into(), "bad password".into());
        event
    }

    #[test]
    fn test_json_line_shape() {
        let line = encode(&sample_event(), LogFormat::Json, false);
        assert_eq!(line.last(), Some(&b'\n'));

        let value: serde_json::Value = serde_json::from_slice(&line).unwrap();
        assert_eq!(value["timestamp"], "2024-03-09T14:05:07.000000+00:00");
        assert_eq!(value["level"], "info");
        assert_eq!(value["message"], "User authenticated");
        assert_eq!(value["log_type"], "audit");
        assert_eq!(value["user_id"], "u-1");
    }

    #[test]
    fn test_reserved_field_names_are_dropped() {
        let mut event = sample_event();
        event.fields.insert("level".into(), "spoofed".into());
        let line = encode(&event, LogFormat::Json, false);
        let text = String::from_utf8(line).unwrap();
        assert!(!text.contains("spoofed"));
    }

    #[test]
    fn test_console_line() {
        let line = String::from_utf8(encode(&sample_event(), LogFormat::Console, false)).unwrap();
        assert_eq!(
            line,
            "2024-03-09T14:05:07.000000+00:00 INF User authenticated log_type=audit \
             reason=\"bad password\" user_id=u-1\n"
        );
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("console".parse::<LogFormat>().unwrap(), LogFormat::Console);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
