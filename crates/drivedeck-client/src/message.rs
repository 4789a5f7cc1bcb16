//! Live channel message payloads

use serde_json::Value;
use tracing::debug;

/// A payload received on the push channel.
///
/// Frames are UTF-8 text and usually carry a JSON document, but the
/// backend also emits plain-text notices (heartbeats and the like). A
/// frame that fails to decode is forwarded as raw text rather than
/// dropped; the decode failure is logged, never escalated.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveMessage {
    /// Successfully decoded JSON, forwarded verbatim without schema
    /// validation.
    Json(Value),
    /// Raw text fallback for frames that are not valid JSON.
    Text(String),
}

impl LiveMessage {
    /// Decode a raw frame, falling back to raw text.
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(value) => LiveMessage::Json(value),
            Err(e) => {
                debug!(error = %e, "Frame is not JSON, forwarding as raw text");
                LiveMessage::Text(raw.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json_frame() {
        let message = LiveMessage::parse(r#"{"device": "/dev/sda", "temperature": 41}"#);
        assert_eq!(
            message,
            LiveMessage::Json(json!({"device": "/dev/sda", "temperature": 41}))
        );
    }

    #[test]
    fn test_parse_malformed_frame_falls_back_to_text() {
        let message = LiveMessage::parse("Heartbeat: update from backend");
        assert_eq!(
            message,
            LiveMessage::Text("Heartbeat: update from backend".to_string())
        );
    }
}
