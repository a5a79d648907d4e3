use anyhow::{Context, Result};
use async_trait::async_trait;
use interprep_core::voice::{Speaker, StartOverrides, TranscriptKind, VoiceEvent, VoiceSession};
use tokio::sync::{Mutex, mpsc};
use vapi_realtime::VapiClient;
use vapi_realtime::types::{self, Role, TranscriptType};

/// An adapter that implements the controller's `VoiceSession` capability
/// on top of the provider's wire client. It is generic over the
/// `VapiClient` trait to allow for mocking the underlying client in tests.
pub struct VapiAdapter<C: VapiClient> {
    client: Mutex<C>,
}

impl<C: VapiClient> VapiAdapter<C> {
    /// Subscribes to the wire event stream exactly once and returns the
    /// adapter together with the receiver of normalized events. The pump
    /// task exits as soon as that receiver is dropped, so no handler can
    /// outlive the session that owns it.
    pub async fn new(mut client: C) -> Result<(Self, mpsc::Receiver<VoiceEvent>)> {
        let mut server_rx = client
            .server_events()
            .await
            .context("failed to subscribe to voice provider events")?;
        let (event_tx, event_rx) = mpsc::channel(128);

        tokio::spawn(async move {
            while let Ok(event) = server_rx.recv().await {
                if event_tx.send(normalize_event(event)).await.is_err() {
                    tracing::warn!("voice event receiver dropped, stopping pump task");
                    break;
                }
            }
        });

        Ok((
            Self {
                client: Mutex::new(client),
            },
            event_rx,
        ))
    }
}

fn normalize_event(event: types::ServerEvent) -> VoiceEvent {
    match event {
        types::ServerEvent::CallStart => VoiceEvent::CallStarted,
        types::ServerEvent::CallEnd => VoiceEvent::CallEnded,
        types::ServerEvent::SpeechStart => VoiceEvent::SpeechStarted,
        types::ServerEvent::SpeechEnd => VoiceEvent::SpeechEnded,
        types::ServerEvent::Transcript(t) => VoiceEvent::Transcript {
            speaker: speaker_for(t.role()),
            kind: match t.transcript_type() {
                TranscriptType::Final => TranscriptKind::Final,
                TranscriptType::Partial => TranscriptKind::Partial,
            },
            text: t.transcript().to_string(),
        },
        types::ServerEvent::Error(e) => VoiceEvent::Error(e.message().to_string()),
    }
}

fn speaker_for(role: Role) -> Speaker {
    match role {
        Role::User => Speaker::User,
        Role::System => Speaker::System,
        Role::Assistant => Speaker::Assistant,
    }
}

#[async_trait]
impl<C: VapiClient> VoiceSession for VapiAdapter<C> {
    async fn start(&self, descriptor: &str, overrides: StartOverrides) -> Result<()> {
        let overrides = types::AssistantOverrides {
            variable_values: overrides.variable_values,
            client_messages: overrides.client_messages,
            server_messages: overrides.server_messages,
        };
        self.client
            .lock()
            .await
            .start_call(descriptor.to_string(), overrides)
            .await
    }

    async fn stop(&self) -> Result<()> {
        self.client.lock().await.stop_call().await
    }
}
