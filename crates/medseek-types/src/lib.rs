//! Core types and structures for medseek
//!
//! This crate provides the wire types shared by the client logic and the
//! browser front end: sessions, chat messages, socket frames, REST payloads,
//! the specialty catalogue and the client error taxonomy.

use serde::{Deserialize, Deserializer, Serialize};

mod error;
pub mod specialty;

pub use error::ClientError;
pub use specialty::{specialty_info, Specialty, SpecialtyInfo};

// ============================================================================
// Constants
// ============================================================================

/// Sender id the backend uses for doctor replies
pub const ASSISTANT_ID: &str = "assistant";

/// Session ID type (opaque string issued by the backend)
pub type SessionId = String;

// ============================================================================
// Session
// ============================================================================

/// An active consultation held by the app shell while the chat is open
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: SessionId,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<Specialty>,
}

impl Session {
    pub fn new(session_id: impl Into<String>, user_id: impl Into<String>, specialty: Option<Specialty>) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
            specialty,
        }
    }

    /// Display record for this session's specialty (default record when unset)
    pub fn specialty_info(&self) -> &'static SpecialtyInfo {
        match self.specialty {
            Some(specialty) => specialty.info(),
            None => SpecialtyInfo::general(),
        }
    }
}

// ============================================================================
// Message Types
// ============================================================================

/// Helper function to deserialize string or null values
pub fn deserialize_string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Discriminator carried in the `type` field of socket frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// A chat entry
    #[default]
    Message,
    /// Backend failed to process the last message
    Error,
    /// Informational status from the backend
    Status,
    #[serde(other)]
    Unknown,
}

/// A chat entry, either received over the socket or loaded from history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    #[serde(deserialize_with = "deserialize_string_or_null")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Message {
    /// A chat entry authored by `user_id`
    pub fn from_user(user_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Message,
            content: content.into(),
            user_id: Some(user_id.into()),
        }
    }

    /// A chat entry authored by the doctor
    pub fn from_assistant(content: impl Into<String>) -> Self {
        Self::from_user(ASSISTANT_ID, content)
    }

    pub fn is_from_assistant(&self) -> bool {
        self.user_id.as_deref() == Some(ASSISTANT_ID)
    }

    /// Parse one inbound socket payload
    pub fn parse_frame(text: &str) -> Result<Self, ClientError> {
        serde_json::from_str(text)
            .map_err(|e| ClientError::Protocol(format!("Failed to parse message: {}", e)))
    }
}

/// Frames sent from client to server over the socket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientFrame {
    Message { content: String },
}

impl ClientFrame {
    pub fn to_json(&self) -> Result<String, ClientError> {
        serde_json::to_string(self)
            .map_err(|e| ClientError::Protocol(format!("Failed to serialize: {}", e)))
    }
}

// ============================================================================
// REST payloads
// ============================================================================

/// Body of `POST /session/create`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<Specialty>,
}

/// Response of `POST /session/create`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: SessionId,
    #[serde(default)]
    pub status: Option<String>,
}

/// Response of `POST /session/close`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseAck {
    #[serde(default)]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbound_frame_shape() {
        let frame = ClientFrame::Message {
            content: "hello".to_string(),
        };
        assert_eq!(
            frame.to_json().unwrap(),
            r#"{"type":"message","content":"hello"}"#
        );
    }

    #[test]
    fn test_parse_assistant_frame() {
        let msg = Message::parse_frame(
            r#"{"type":"message","content":"hi, how can I help?","user_id":"assistant"}"#,
        )
        .unwrap();
        assert_eq!(msg.kind, MessageKind::Message);
        assert!(msg.is_from_assistant());
        assert_eq!(msg.content, "hi, how can I help?");
    }

    #[test]
    fn test_parse_echo_without_user_id() {
        let msg = Message::parse_frame(r#"{"type":"message","content":"hello"}"#).unwrap();
        assert_eq!(msg.user_id, None);
        assert!(!msg.is_from_assistant());
    }

    #[test]
    fn test_parse_history_entry() {
        // History entries carry extra fields and no `type`
        let json = r#"{"id":"m1","session_id":"s1","user_id":"assistant","role":"assistant","content":"Hello","created_at":"2024-01-01T00:00:00Z"}"#;
        let msg = Message::parse_frame(json).unwrap();
        assert_eq!(msg.kind, MessageKind::Message);
        assert!(msg.is_from_assistant());
    }

    #[test]
    fn test_unknown_kind_and_null_content() {
        let msg = Message::parse_frame(r#"{"type":"typing","content":null}"#).unwrap();
        assert_eq!(msg.kind, MessageKind::Unknown);
        assert_eq!(msg.content, "");
    }

    #[test]
    fn test_malformed_frames() {
        assert!(Message::parse_frame("not json").is_err());
        assert!(Message::parse_frame(r#"["message"]"#).is_err());
        assert!(Message::parse_frame(r#"{"type":"message"}"#).is_err());
        assert!(matches!(
            Message::parse_frame("{"),
            Err(ClientError::Protocol(_))
        ));
    }

    #[test]
    fn test_create_request_omits_missing_specialty() {
        let req = CreateSessionRequest {
            user_id: "a@b.com".to_string(),
            specialty: None,
        };
        assert_eq!(serde_json::to_string(&req).unwrap(), r#"{"user_id":"a@b.com"}"#);

        let req = CreateSessionRequest {
            user_id: "a@b.com".to_string(),
            specialty: Some(Specialty::Pediatrics),
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"user_id":"a@b.com","specialty":"pediatrics"}"#
        );
    }

    #[test]
    fn test_create_response_tolerates_extra_fields() {
        let resp: CreateSessionResponse =
            serde_json::from_str(r#"{"session_id":"s1","status":"active","extra":1}"#).unwrap();
        assert_eq!(resp.session_id, "s1");
        assert_eq!(resp.status.as_deref(), Some("active"));
    }
}
