//! Envelope demultiplexing and tolerant payload coercion.
//!
//! Every channel message is `{ "type": ..., "payload": ... }`. Fields are
//! coerced the forgiving way the backend's consumers always have: missing or
//! malformed values become `false`, `0` or `""`, never an error.
use serde_json::{Map, Value};

use hirelens_logging::lens_debug;

use crate::aggregation::{ResultPayload, SkillMap, WeightMap};
use crate::status::StatusSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Status,
    Result,
}

impl MessageKind {
    pub fn from_wire(kind: &str) -> Option<Self> {
        match kind {
            "STATUS" => Some(MessageKind::Status),
            "CHART_MAP" => Some(MessageKind::Result),
            _ => None,
        }
    }

    pub fn wire_name(self) -> &'static str {
        match self {
            MessageKind::Status => "STATUS",
            MessageKind::Result => "CHART_MAP",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Status(StatusSnapshot),
    Result(ResultPayload),
}

impl Inbound {
    pub fn kind(&self) -> MessageKind {
        match self {
            Inbound::Status(_) => MessageKind::Status,
            Inbound::Result(_) => MessageKind::Result,
        }
    }
}

/// Parses a raw frame body. Unparsable bodies and unknown kinds yield `None`.
pub fn route(raw: &str) -> Option<Inbound> {
    match serde_json::from_str::<Value>(raw) {
        Ok(envelope) => route_value(&envelope),
        Err(err) => {
            lens_debug!("dropping unparsable frame ({} bytes): {}", raw.len(), err);
            None
        }
    }
}

pub fn route_value(envelope: &Value) -> Option<Inbound> {
    let Some(kind) = envelope.get("type").and_then(Value::as_str) else {
        lens_debug!("dropping frame without a message type");
        return None;
    };
    let Some(kind) = MessageKind::from_wire(kind) else {
        lens_debug!("dropping frame of unknown type {}", kind);
        return None;
    };
    let payload = envelope.get("payload").unwrap_or(&Value::Null);
    Some(match kind {
        MessageKind::Status => Inbound::Status(parse_status_payload(payload)),
        MessageKind::Result => Inbound::Result(parse_result_payload(payload)),
    })
}

pub fn parse_status_payload(payload: &Value) -> StatusSnapshot {
    let field = |name: &str| payload.get(name).unwrap_or(&Value::Null);
    StatusSnapshot {
        overlay_visible: coerce_flag(field("updatingDataWindowVisible")),
        downloading: coerce_flag(field("downloadingData")),
        downloaded_total: coerce_count(field("downloadedOffersNumber")),
        remotive_count: coerce_count(field("remotiveCount")),
        remote_ok_count: coerce_count(field("remoteOkCount")),
        adzuna_count: coerce_count(field("adzunaCount")),
        joinrise_count: coerce_count(field("joinriseCount")),
        processing_by_ai: coerce_flag(field("processingByAI")),
        processed_by_ai: coerce_count(field("processedByAINumber")),
        saved_to_database: coerce_flag(field("savedToDatabase")),
        cancelled: coerce_flag(field("cancelled")),
        error_text: match field("errorMessage") {
            Value::String(text) => text.clone(),
            _ => String::new(),
        },
    }
}

/// Also used for the catch-up payload fetched over REST.
pub fn parse_result_payload(payload: &Value) -> ResultPayload {
    let locations = payload
        .get("locations")
        .and_then(Value::as_object)
        .map(coerce_weights);
    let skills = payload
        .get("skills")
        .and_then(Value::as_object)
        .map(|categories| {
            categories
                .iter()
                .map(|(category, items)| {
                    let items = items.as_object().map(coerce_weights).unwrap_or_default();
                    (category.clone(), items)
                })
                .collect::<SkillMap>()
        });
    ResultPayload { locations, skills }
}

fn coerce_weights(map: &Map<String, Value>) -> WeightMap {
    map.iter()
        .map(|(key, value)| (key.clone(), coerce_count(value)))
        .collect()
}

/// Truthiness: `null`, `false`, `0`, NaN and `""` are false.
pub fn coerce_flag(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Numeric coercion narrowed to counters: negative, NaN and non-numeric
/// values become 0, fractions are truncated.
pub fn coerce_count(value: &Value) -> u64 {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    };
    match number {
        Some(n) if n.is_finite() && n > 0.0 => n.trunc() as u64,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn counts_follow_numeric_coercion() {
        assert_eq!(coerce_count(&json!(7)), 7);
        assert_eq!(coerce_count(&json!("12")), 12);
        assert_eq!(coerce_count(&json!(" 3.9 ")), 3);
        assert_eq!(coerce_count(&json!("abc")), 0);
        assert_eq!(coerce_count(&json!(null)), 0);
        assert_eq!(coerce_count(&json!(true)), 1);
        assert_eq!(coerce_count(&json!(-4)), 0);
        assert_eq!(coerce_count(&json!("NaN")), 0);
        assert_eq!(coerce_count(&json!([1])), 0);
    }

    #[test]
    fn flags_follow_truthiness() {
        assert!(coerce_flag(&json!(true)));
        assert!(coerce_flag(&json!(1)));
        assert!(coerce_flag(&json!("yes")));
        assert!(coerce_flag(&json!({})));
        assert!(!coerce_flag(&json!(0)));
        assert!(!coerce_flag(&json!("")));
        assert!(!coerce_flag(&json!(null)));
    }

    #[test]
    fn wire_names_round_trip() {
        for kind in [MessageKind::Status, MessageKind::Result] {
            assert_eq!(MessageKind::from_wire(kind.wire_name()), Some(kind));
        }
        assert_eq!(MessageKind::from_wire("TYPE_CHART1"), None);
    }
}
