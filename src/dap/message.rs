//! Shape classification for raw DAP messages.
//!
//! Messages stay `serde_json::Value` end to end: the bridge rewrites a handful
//! of fields and must forward everything else byte-for-byte, including fields
//! added by protocol extensions it has never heard of. Typed envelopes would
//! silently drop those.

use serde_json::Value;

/// The protocol-level shape of a message, borrowed from its JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageShape<'a> {
    /// `{"type": "event", "event": ...}`
    Event(&'a str),
    /// `{"type": "request", "command": ...}`
    Request(&'a str),
    /// `{"type": "response", "command": ..., "success": ...}`
    Response { command: &'a str, success: bool },
    /// Anything else, malformed envelopes included.
    Other,
}

/// Classify a message by its `type` tag and kind field.
pub fn shape_of(message: &Value) -> MessageShape<'_> {
    match message.get("type").and_then(Value::as_str) {
        Some("event") => match message.get("event").and_then(Value::as_str) {
            Some(event) => MessageShape::Event(event),
            None => MessageShape::Other,
        },
        Some("request") => match message.get("command").and_then(Value::as_str) {
            Some(command) => MessageShape::Request(command),
            None => MessageShape::Other,
        },
        Some("response") => match message.get("command").and_then(Value::as_str) {
            Some(command) => MessageShape::Response {
                command,
                success: message
                    .get("success")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            },
            None => MessageShape::Other,
        },
        _ => MessageShape::Other,
    }
}

/// Compact `shape:kind` label for trace logging.
pub fn describe(message: &Value) -> String {
    match shape_of(message) {
        MessageShape::Event(event) => format!("event:{event}"),
        MessageShape::Request(command) => format!("request:{command}"),
        MessageShape::Response { command, success } => {
            format!("response:{command}({})", if success { "ok" } else { "err" })
        }
        MessageShape::Other => "unknown".to_string(),
    }
}
