//! Cross-document message protocol between the host and the embedded app.
//!
//! Messages are JSON objects discriminated by `event`, falling back to
//! `type`. Known kinds deserialize into [`BridgeMessage`]; everything else
//! is classified by [`Inbound`] so unknown kinds stay an explicit arm.
//!
//! | Kind                      | Direction     | Payload                              |
//! |---------------------------|---------------|--------------------------------------|
//! | `BAIBIAN_APP_READY`       | app -> host   | optional `appId`                     |
//! | `BAIBIAN_APP_ERROR`       | app -> host   | `error` or `message`                 |
//! | `APP_FILES_UPDATED`       | app -> host   | none                                 |
//! | `GET_APP_FILES_REQUEST`   | app -> host   | none                                 |
//! | `GET_APP_FILES_RESPONSE`  | host -> app   | `files`, `timestamp`, `source`, `error?` |
//! | `BAIBIAN_APP_FILE_UPDATE` | host -> app   | `targetAppId`, `timestamp`           |

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::BridgeError;
use crate::bundle::FileBundle;

pub const APP_READY: &str = "BAIBIAN_APP_READY";
pub const APP_ERROR: &str = "BAIBIAN_APP_ERROR";
pub const APP_FILES_UPDATED: &str = "APP_FILES_UPDATED";
pub const GET_APP_FILES_REQUEST: &str = "GET_APP_FILES_REQUEST";
pub const GET_APP_FILES_RESPONSE: &str = "GET_APP_FILES_RESPONSE";
pub const APP_FILE_UPDATE: &str = "BAIBIAN_APP_FILE_UPDATE";

/// `source` field of responses sent by this host
pub const RESPONSE_SOURCE: &str = "appshell-host";

/// Prefixes of SDK-internal and bundler chatter that is never dispatched
const IGNORED_PREFIXES: &[&str] = &["BAIBIAN_SDK_", "SDK_", "webpack"];

/// Known protocol messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum BridgeMessage {
    #[serde(rename = "BAIBIAN_APP_READY")]
    Ready {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        app_id: Option<Value>,
    },

    #[serde(rename = "BAIBIAN_APP_ERROR")]
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<Value>,
    },

    #[serde(rename = "APP_FILES_UPDATED")]
    FilesUpdated,

    #[serde(rename = "GET_APP_FILES_REQUEST")]
    FilesRequest,

    #[serde(rename = "GET_APP_FILES_RESPONSE")]
    FilesResponse {
        files: FileBundle,
        timestamp: u64,
        source: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    #[serde(rename = "BAIBIAN_APP_FILE_UPDATE")]
    FileUpdate { target_app_id: String, timestamp: u64 },
}

impl BridgeMessage {
    /// Host -> app push after the bundle was regenerated.
    pub fn file_update(app_id: impl Into<String>, timestamp: u64) -> Self {
        Self::FileUpdate {
            target_app_id: app_id.into(),
            timestamp,
        }
    }

    /// Reply to `GET_APP_FILES_REQUEST`.
    pub fn files_response(files: FileBundle, timestamp: u64, error: Option<String>) -> Self {
        Self::FilesResponse {
            files,
            timestamp,
            source: RESPONSE_SOURCE.to_string(),
            error,
        }
    }

    /// Wire name of this message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ready { .. } => APP_READY,
            Self::Error { .. } => APP_ERROR,
            Self::FilesUpdated => APP_FILES_UPDATED,
            Self::FilesRequest => GET_APP_FILES_REQUEST,
            Self::FilesResponse { .. } => GET_APP_FILES_RESPONSE,
            Self::FileUpdate { .. } => APP_FILE_UPDATE,
        }
    }

    /// Identifying data of a `Ready` message, if any.
    pub fn ready_app_id(&self) -> Option<String> {
        let Self::Ready { app_id } = self else {
            return None;
        };
        app_id.as_ref().and_then(render)
    }

    /// Human-readable error text of an `Error` message.
    ///
    /// Prefers `error`, then `message`. Non-string values are rendered as
    /// JSON.
    pub fn error_text(&self) -> Option<String> {
        let Self::Error { error, message } = self else {
            return None;
        };
        let text = error
            .as_ref()
            .and_then(render)
            .or_else(|| message.as_ref().and_then(render))
            .unwrap_or_else(|| "unknown error".into());
        Some(text)
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, BridgeError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Classified inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Message(BridgeMessage),
    /// SDK-internal chatter, dropped on purpose.
    Ignored(String),
    /// Discriminant not part of the protocol (empty if missing).
    Unknown(String),
}

impl Inbound {
    /// Parse raw message data.
    ///
    /// Fails only on invalid JSON or a known kind with a broken payload.
    pub fn parse(data: &str) -> Result<Self, BridgeError> {
        let value: Value = serde_json::from_str(data)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, BridgeError> {
        let Value::Object(mut object) = value else {
            return Ok(Self::Unknown(String::new()));
        };

        let kind = object
            .get("event")
            .and_then(Value::as_str)
            .or_else(|| object.get("type").and_then(Value::as_str))
            .unwrap_or_default()
            .to_string();

        if is_known(&kind) {
            object.remove("event");
            object.insert("type".into(), Value::String(kind));
            let message = serde_json::from_value(Value::Object(object))?;
            return Ok(Self::Message(message));
        }

        if IGNORED_PREFIXES.iter().any(|p| kind.starts_with(p)) {
            return Ok(Self::Ignored(kind));
        }
        Ok(Self::Unknown(kind))
    }
}

/// Payload value as text; `null` counts as absent.
fn render(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn is_known(kind: &str) -> bool {
    matches!(
        kind,
        APP_READY
            | APP_ERROR
            | APP_FILES_UPDATED
            | GET_APP_FILES_REQUEST
            | GET_APP_FILES_RESPONSE
            | APP_FILE_UPDATE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(data: &str) -> BridgeMessage {
        match Inbound::parse(data).unwrap() {
            Inbound::Message(msg) => msg,
            other => panic!("expected protocol message, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_event_discriminant() {
        let msg = message(r#"{"event":"BAIBIAN_APP_READY","appId":"todo"}"#);
        assert_eq!(
            msg,
            BridgeMessage::Ready {
                app_id: Some(Value::String("todo".into()))
            }
        );
        assert_eq!(msg.ready_app_id().as_deref(), Some("todo"));
    }

    #[test]
    fn test_ready_accepts_any_app_id() {
        let msg = message(r#"{"event":"BAIBIAN_APP_READY","appId":42}"#);
        assert_eq!(msg.ready_app_id().as_deref(), Some("42"));

        let msg = message(r#"{"event":"BAIBIAN_APP_READY","appId":null}"#);
        assert_eq!(msg.ready_app_id(), None);

        let msg = message(r#"{"type":"BAIBIAN_APP_READY"}"#);
        assert_eq!(msg.ready_app_id(), None);
    }

    #[test]
    fn test_parse_type_discriminant() {
        assert_eq!(
            message(r#"{"type":"GET_APP_FILES_REQUEST","requestId":7}"#),
            BridgeMessage::FilesRequest
        );
    }

    #[test]
    fn test_event_wins_over_type() {
        let msg = message(r#"{"event":"APP_FILES_UPDATED","type":"something-else"}"#);
        assert_eq!(msg, BridgeMessage::FilesUpdated);
    }

    #[test]
    fn test_error_text_prefers_error_then_message() {
        let msg = message(r#"{"event":"BAIBIAN_APP_ERROR","error":"boom","message":"other"}"#);
        assert_eq!(msg.error_text().as_deref(), Some("boom"));

        let msg = message(r#"{"type":"BAIBIAN_APP_ERROR","message":"render failed"}"#);
        assert_eq!(msg.error_text().as_deref(), Some("render failed"));

        let msg = message(r#"{"type":"BAIBIAN_APP_ERROR","error":{"code":42}}"#);
        assert_eq!(msg.error_text().as_deref(), Some(r#"{"code":42}"#));

        let msg = message(r#"{"type":"BAIBIAN_APP_ERROR","message":{"text":"boom"}}"#);
        assert_eq!(msg.error_text().as_deref(), Some(r#"{"text":"boom"}"#));

        let msg = message(r#"{"type":"BAIBIAN_APP_ERROR","error":null,"message":"late"}"#);
        assert_eq!(msg.error_text().as_deref(), Some("late"));

        let msg = message(r#"{"type":"BAIBIAN_APP_ERROR"}"#);
        assert_eq!(msg.error_text().as_deref(), Some("unknown error"));
    }

    #[test]
    fn test_sdk_chatter_is_ignored() {
        assert_eq!(
            Inbound::parse(r#"{"type":"BAIBIAN_SDK_CALL","method":"db.query"}"#).unwrap(),
            Inbound::Ignored("BAIBIAN_SDK_CALL".into())
        );
        assert_eq!(
            Inbound::parse(r#"{"type":"webpackOk"}"#).unwrap(),
            Inbound::Ignored("webpackOk".into())
        );
    }

    #[test]
    fn test_unknown_kinds() {
        assert_eq!(
            Inbound::parse(r#"{"type":"HELLO"}"#).unwrap(),
            Inbound::Unknown("HELLO".into())
        );
        assert_eq!(
            Inbound::parse(r#"{"payload":1}"#).unwrap(),
            Inbound::Unknown(String::new())
        );
        assert_eq!(
            Inbound::parse(r#""just a string""#).unwrap(),
            Inbound::Unknown(String::new())
        );
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(Inbound::parse("{not json").is_err());
    }

    #[test]
    fn test_file_update_wire_format() {
        let json = BridgeMessage::file_update("todo", 1_700_000_000_000)
            .to_json()
            .unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["type"], APP_FILE_UPDATE);
        assert_eq!(value["targetAppId"], "todo");
        assert_eq!(value["timestamp"], 1_700_000_000_000u64);
    }

    #[test]
    fn test_files_response_wire_format() {
        let files: FileBundle = [("a.txt", "hello")].into_iter().collect();
        let json = BridgeMessage::files_response(files, 5, None).to_json().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["type"], GET_APP_FILES_RESPONSE);
        assert_eq!(value["files"]["a.txt"], "hello");
        assert_eq!(value["source"], RESPONSE_SOURCE);
        assert!(value.get("error").is_none());

        let json = BridgeMessage::files_response(FileBundle::new(), 5, Some("gone".into()))
            .to_json()
            .unwrap();
        assert!(json.contains(r#""error":"gone""#));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(BridgeMessage::FilesRequest.kind(), GET_APP_FILES_REQUEST);
        assert_eq!(message(r#"{"event":"BAIBIAN_APP_ERROR"}"#).kind(), APP_ERROR);
    }
}
