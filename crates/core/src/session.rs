use crate::Route;
use crate::feedback::{FeedbackRequest, FeedbackService, TranscriptMessage};
use crate::identity::UserProfile;
use crate::voice::{Speaker, StartOverrides, TranscriptKind, VoiceEvent, VoiceSession};
use std::sync::Arc;
use tokio::sync::mpsc::Sender;

/// Lifecycle state of one call attempt.
///
/// Transitions are monotonic along `Inactive -> Connecting -> Active ->
/// Finished`, with the single exception of a rejected start, which resets
/// `Connecting` back to `Inactive` so the call stays retryable. `Finished`
/// is terminal: starting over requires a fresh `CallSession`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    Inactive,
    Connecting,
    Active,
    Finished,
}

/// What kind of session this call runs, fixed at construction.
///
/// A `Generate` call collects the material for a new interview script and
/// produces no feedback; an `Interview` call conducts an existing script
/// and is scored when it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Generate,
    Interview,
}

/// One finalized utterance. Partial transcripts are never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
}

/// One voice-interview attempt.
///
/// Created `Inactive`, mutated only by its controller in response to
/// provider events, and discarded once terminal handling completes. The
/// transcript grows in strict arrival order and is never touched again
/// after the session reaches `Finished`.
#[derive(Debug)]
pub struct CallSession {
    pub status: CallStatus,
    pub kind: SessionKind,
    /// Opaque identifier the provider uses to select the agent script.
    pub descriptor: String,
    pub participant: Option<UserProfile>,
    pub interview_id: Option<String>,
    pub question_set: Vec<String>,
    pub transcript: Vec<TranscriptEntry>,
    /// Whether the remote agent is currently vocalizing. UI-only state,
    /// never persisted.
    pub agent_speaking: bool,
}

impl CallSession {
    pub fn generate(descriptor: impl Into<String>, participant: Option<UserProfile>) -> Self {
        Self {
            status: CallStatus::Inactive,
            kind: SessionKind::Generate,
            descriptor: descriptor.into(),
            participant,
            interview_id: None,
            question_set: Vec::new(),
            transcript: Vec::new(),
            agent_speaking: false,
        }
    }

    pub fn interview(
        descriptor: impl Into<String>,
        participant: Option<UserProfile>,
        interview_id: impl Into<String>,
        question_set: Vec<String>,
    ) -> Self {
        Self {
            status: CallStatus::Inactive,
            kind: SessionKind::Interview,
            descriptor: descriptor.into(),
            participant,
            interview_id: Some(interview_id.into()),
            question_set,
            transcript: Vec::new(),
            agent_speaking: false,
        }
    }

    /// Builds the provider-specific instruction payload for this session.
    ///
    /// A generate call sends the participant identifiers so the agent can
    /// address the user; an interview call sends the formatted question
    /// list (an empty list yields an empty string, not an error).
    pub fn start_overrides(&self) -> StartOverrides {
        match self.kind {
            SessionKind::Generate => {
                let mut overrides = StartOverrides::default();
                if let Some(user) = &self.participant {
                    overrides = overrides
                        .with_variable("username", &user.name)
                        .with_variable("userid", &user.id);
                }
                overrides
            }
            SessionKind::Interview => StartOverrides::default()
                .with_variable("questions", &format_questions(&self.question_set)),
        }
    }
}

/// Renders an interview script as a dash-prefixed bullet list, one
/// question per line.
pub fn format_questions(questions: &[String]) -> String {
    questions
        .iter()
        .map(|question| format!("- {question}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drives one `CallSession` through its lifecycle.
///
/// The controller owns the session exclusively and holds shared handles to
/// its external collaborators: the voice provider capability, the feedback
/// scoring service, and a channel on which it emits navigation routes. All
/// event handling is sequential; events are applied in the order they
/// arrive and are never deduplicated or coalesced.
pub struct CallController {
    session: CallSession,
    voice: Arc<dyn VoiceSession>,
    feedback: Arc<dyn FeedbackService>,
    route_tx: Sender<Route>,
}

impl CallController {
    pub fn new(
        session: CallSession,
        voice: Arc<dyn VoiceSession>,
        feedback: Arc<dyn FeedbackService>,
        route_tx: Sender<Route>,
    ) -> Self {
        Self {
            session,
            voice,
            feedback,
            route_tx,
        }
    }

    pub fn session(&self) -> &CallSession {
        &self.session
    }

    /// Starts the call. A rejected start is logged and resets the session
    /// to `Inactive`, leaving it retryable rather than stuck in
    /// `Connecting`.
    pub async fn start_call(&mut self) {
        if self.session.status != CallStatus::Inactive {
            tracing::warn!(status = ?self.session.status, "ignoring start request for a call that is not inactive");
            return;
        }

        self.session.status = CallStatus::Connecting;
        let overrides = self.session.start_overrides();
        if let Err(e) = self.voice.start(&self.session.descriptor, overrides).await {
            tracing::error!("failed to start call: {e:?}");
            self.session.status = CallStatus::Inactive;
        }
    }

    /// Ends the call on the user's request. The local transition to
    /// `Finished` is authoritative for the UI; the remote stop request is
    /// fire-and-forget and its failure only gets logged.
    pub async fn end_call(&mut self) {
        if self.session.status == CallStatus::Finished {
            return;
        }

        self.session.status = CallStatus::Finished;
        if let Err(e) = self.voice.stop().await {
            tracing::warn!("failed to request remote stop: {e:?}");
        }
        self.finish().await;
    }

    /// Applies one provider event to the session.
    ///
    /// Once the session is `Finished` every further event is dropped, so a
    /// late transcript fragment can neither mutate the transcript nor
    /// re-trigger termination handling.
    pub async fn handle_event(&mut self, event: VoiceEvent) {
        if self.session.status == CallStatus::Finished {
            tracing::debug!(?event, "dropping event for finished session");
            return;
        }

        match event {
            VoiceEvent::CallStarted => {
                self.session.status = CallStatus::Active;
            }
            VoiceEvent::CallEnded => {
                self.session.status = CallStatus::Finished;
                self.finish().await;
            }
            VoiceEvent::Transcript {
                speaker,
                kind: TranscriptKind::Final,
                text,
            } => {
                self.session.transcript.push(TranscriptEntry { speaker, text });
            }
            VoiceEvent::Transcript {
                kind: TranscriptKind::Partial,
                ..
            } => {
                // Provisional hypothesis, discarded. It neither appends nor
                // overwrites a prior entry.
            }
            VoiceEvent::SpeechStarted => {
                self.session.agent_speaking = true;
            }
            VoiceEvent::SpeechEnded => {
                self.session.agent_speaking = false;
            }
            VoiceEvent::Error(message) => {
                // Mid-call transport errors are non-fatal and do not alter
                // the session status.
                tracing::error!("voice transport error: {message}");
            }
        }
    }

    // Termination handling. Runs exactly once per session: both call sites
    // transition into the terminal `Finished` state first, and the guard in
    // `handle_event` structurally prevents re-entry.
    async fn finish(&mut self) {
        let route = match self.session.kind {
            SessionKind::Generate => Route::Home,
            SessionKind::Interview => self.interview_route().await,
        };

        if let Err(e) = self.route_tx.send(route).await {
            tracing::error!("failed to deliver navigation route: {e:?}");
        }
    }

    // Scores the finished interview. Any failure degrades to the home
    // route; the user is never blocked on the feedback pipeline.
    async fn interview_route(&self) -> Route {
        let Some(interview_id) = self.session.interview_id.clone() else {
            tracing::warn!("interview session finished without an interview id");
            return Route::Home;
        };

        let user_id = self
            .session
            .participant
            .as_ref()
            .map(|user| user.id.clone())
            .unwrap_or_default();

        let request = FeedbackRequest {
            interview_id: interview_id.clone(),
            user_id,
            transcript: self
                .session
                .transcript
                .iter()
                .map(TranscriptMessage::from)
                .collect(),
        };

        match self.feedback.generate_feedback(request).await {
            Ok(response) => match (response.success, response.feedback_id) {
                (true, Some(feedback_id)) => Route::InterviewFeedback {
                    interview_id,
                    feedback_id,
                },
                _ => {
                    tracing::warn!(
                        message = ?response.message,
                        "feedback generation unsuccessful, falling back to home"
                    );
                    Route::Home
                }
            },
            Err(e) => {
                tracing::error!("feedback generation failed: {e:?}");
                Route::Home
            }
        }
    }
}
