//! Wire types for the voice provider's realtime control channel.
//!
//! Server events mirror the provider's callback surface one-to-one:
//! `call-start`, `call-end`, `speech-start`, `speech-end`, `transcript`
//! and `error`. Transcript payloads distinguish provisional (`partial`)
//! fragments from committed (`final`) ones.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-call parameters sent with a start request. The variable values are
/// substituted into the agent script selected by the session descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantOverrides {
    #[serde(default)]
    pub variable_values: HashMap<String, String>,
    #[serde(default)]
    pub client_messages: Vec<String>,
    #[serde(default)]
    pub server_messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    #[serde(rename = "start")]
    Start {
        descriptor: String,
        #[serde(rename = "assistantOverrides")]
        overrides: AssistantOverrides,
    },
    #[serde(rename = "stop")]
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    System,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptType {
    Partial,
    Final,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEvent {
    role: Role,
    #[serde(rename = "transcriptType")]
    transcript_type: TranscriptType,
    transcript: String,
}

impl TranscriptEvent {
    pub fn new(role: Role, transcript_type: TranscriptType, transcript: impl Into<String>) -> Self {
        Self {
            role,
            transcript_type,
            transcript: transcript.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn transcript_type(&self) -> TranscriptType {
        self.transcript_type
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    message: String,
}

impl ErrorEvent {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "call-start")]
    CallStart,
    #[serde(rename = "call-end")]
    CallEnd,
    #[serde(rename = "speech-start")]
    SpeechStart,
    #[serde(rename = "speech-end")]
    SpeechEnd,
    #[serde(rename = "transcript")]
    Transcript(TranscriptEvent),
    #[serde(rename = "error")]
    Error(ErrorEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_final_transcript_payload() {
        let payload = r#"{
            "type": "transcript",
            "transcriptType": "final",
            "role": "assistant",
            "transcript": "Tell me about a project you are proud of."
        }"#;

        let event: ServerEvent = serde_json::from_str(payload).unwrap();
        match event {
            ServerEvent::Transcript(t) => {
                assert_eq!(t.role(), Role::Assistant);
                assert_eq!(t.transcript_type(), TranscriptType::Final);
                assert_eq!(t.transcript(), "Tell me about a project you are proud of.");
            }
            other => panic!("expected a transcript event, got {:?}", other),
        }
    }

    #[test]
    fn deserializes_partial_transcript_and_lifecycle_events() {
        let event: ServerEvent = serde_json::from_str(
            r#"{"type": "transcript", "transcriptType": "partial", "role": "user", "transcript": "so my last proj"}"#,
        )
        .unwrap();
        match event {
            ServerEvent::Transcript(t) => assert_eq!(t.transcript_type(), TranscriptType::Partial),
            other => panic!("expected a transcript event, got {:?}", other),
        }

        let event: ServerEvent = serde_json::from_str(r#"{"type": "call-start"}"#).unwrap();
        assert_eq!(event, ServerEvent::CallStart);

        let event: ServerEvent =
            serde_json::from_str(r#"{"type": "error", "message": "ejection"}"#).unwrap();
        assert_eq!(event, ServerEvent::Error(ErrorEvent::new("ejection")));
    }

    #[test]
    fn serializes_start_request_with_overrides() {
        let mut variable_values = HashMap::new();
        variable_values.insert("questions".to_string(), "- What is Rust?".to_string());

        let event = ClientEvent::Start {
            descriptor: "interviewer".to_string(),
            overrides: AssistantOverrides {
                variable_values,
                ..Default::default()
            },
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "start");
        assert_eq!(value["descriptor"], "interviewer");
        assert_eq!(
            value["assistantOverrides"]["variableValues"]["questions"],
            "- What is Rust?"
        );
    }
}
