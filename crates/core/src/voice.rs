use anyhow::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::collections::HashMap;

/// Who produced an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    System,
    Assistant,
}

/// Whether a transcript fragment is committed or still provisional.
///
/// A partial fragment is a speech-to-text hypothesis subject to revision;
/// only final fragments are ever recorded in a session's transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptKind {
    Partial,
    Final,
}

/// Normalized events the controller consumes from the voice provider.
///
/// These correspond one-to-one to the provider's callback surface:
/// call-start, call-end, message (transcript), speech-start, speech-end
/// and error. The adapter that talks to the concrete provider is
/// responsible for mapping its wire events into this vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEvent {
    CallStarted,
    CallEnded,
    Transcript {
        speaker: Speaker,
        kind: TranscriptKind,
        text: String,
    },
    SpeechStarted,
    SpeechEnded,
    Error(String),
}

/// Per-call parameters sent alongside the session descriptor when a call
/// starts. The variable values seed the agent script (participant
/// identifiers for a generate session, the formatted question list for an
/// interview session).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartOverrides {
    pub variable_values: HashMap<String, String>,
    pub client_messages: Vec<String>,
    pub server_messages: Vec<String>,
}

impl StartOverrides {
    pub fn with_variable(mut self, key: &str, value: &str) -> Self {
        self.variable_values.insert(key.to_string(), value.to_string());
        self
    }
}

// The `VoiceSession` trait is the capability boundary to the external
// voice provider. The controller holds a shared, non-owning handle to it
// and never assumes exclusive lifetime ownership of the underlying
// channel. Keeping this a trait lets unit tests drive the controller with
// a `mockall` fake instead of a live connection.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait VoiceSession: Send + Sync {
    /// Begins a voice session for the given descriptor. Resolves once the
    /// provider acknowledges the start request, not when the call actually
    /// connects; the connect is reported later as `CallStarted`.
    async fn start(&self, descriptor: &str, overrides: StartOverrides) -> Result<()>;

    /// Requests that the provider stop the running session. From the
    /// controller's perspective this is fire-and-forget: the local state
    /// transition does not wait for a stop confirmation.
    async fn stop(&self) -> Result<()>;
}
