mod config;
mod vapi_adapter;

use crate::config::Config;
use crate::vapi_adapter::VapiAdapter;
use anyhow::{Context, Result};
use clap::Parser;
use interprep_core::Route;
use interprep_core::feedback::FeedbackClient;
use interprep_core::identity::{IdentityClient, IdentityService};
use interprep_core::session::{CallController, CallSession, CallStatus};
use std::sync::Arc;
use tracing_subscriber::fmt::time::ChronoLocal;

/// Which flow to run against the voice agent.
#[derive(Clone, Copy, clap::ValueEnum)]
enum Kind {
    /// Collect the material for a new interview script; no feedback is
    /// generated afterwards.
    Generate,
    /// Conduct an existing interview script and score it when it ends.
    Interview,
}

#[derive(Parser)]
struct Cli {
    /// The session kind to run
    #[arg(value_enum)]
    kind: Kind,
    /// The interview to conduct (interview sessions only)
    #[arg(long)]
    interview_id: Option<String>,
    /// A question seeding the interview script; repeatable
    #[arg(long = "question")]
    questions: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load application configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(ChronoLocal::rfc_3339())
        .init();

    tracing::info!("Configuration loaded successfully. Starting InterPrep service...");

    // --- 3. Parse Command-Line Arguments ---
    let args = Cli::parse();

    // --- 4. Resolve the Current User ---
    let identity = IdentityClient::new(format!("{}/api/session", config.app_base_url));
    let participant = identity
        .current_user()
        .await
        .context("Failed to query the identity service")?;
    match &participant {
        Some(user) => tracing::info!("Signed in as {} ({})", user.name, user.id),
        None => tracing::info!("No signed-in user, continuing anonymously"),
    }

    // --- 5. Build the Session ---
    let session = match args.kind {
        Kind::Generate => {
            let workflow_id = config.workflow_id.clone().ok_or_else(|| {
                anyhow::anyhow!("VAPI_WORKFLOW_ID must be set for generate sessions")
            })?;
            CallSession::generate(workflow_id, participant)
        }
        Kind::Interview => {
            let interview_id = args
                .interview_id
                .clone()
                .context("--interview-id is required for interview sessions")?;
            CallSession::interview(
                config.interviewer_id.clone(),
                participant,
                interview_id,
                args.questions.clone(),
            )
        }
    };

    // --- 6. Connect to the Voice Provider ---
    let vapi_config = vapi_realtime::Config::builder()
        .with_base_url(&config.vapi_base_url)
        .with_api_key(&config.vapi_api_key)
        .build();
    let client = vapi_realtime::connect_with_config(1024, vapi_config)
        .await
        .context("Failed to connect to the voice provider")?;
    let (adapter, mut events_rx) = VapiAdapter::new(client)
        .await
        .context("Failed to subscribe to voice provider events")?;

    // --- 7. Wire the Controller ---
    let feedback = FeedbackClient::new(config.app_base_url.clone());
    let (route_tx, mut route_rx) = tokio::sync::mpsc::channel::<Route>(8);
    let mut controller =
        CallController::new(session, Arc::new(adapter), Arc::new(feedback), route_tx);

    controller.start_call().await;
    if controller.session().status != CallStatus::Connecting {
        anyhow::bail!("the voice provider rejected the start request");
    }

    // This task feeds provider events to the controller in arrival order
    // and turns Ctrl-C into a user-initiated end of call.
    let driver = tokio::spawn(async move {
        loop {
            tokio::select! {
                maybe_event = events_rx.recv() => match maybe_event {
                    Some(event) => controller.handle_event(event).await,
                    None => {
                        tracing::warn!("voice event stream closed");
                        break;
                    }
                },
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received Ctrl-C, ending call...");
                    controller.end_call().await;
                    break;
                }
            }
        }
    });

    // This task acts on the navigation route emitted by termination handling.
    let navigator = tokio::spawn(async move {
        if let Some(route) = route_rx.recv().await {
            match route {
                Route::Home => tracing::info!("Navigating to the home view"),
                Route::InterviewFeedback {
                    interview_id,
                    feedback_id,
                } => {
                    tracing::info!("Opening feedback {} for interview {}", feedback_id, interview_id)
                }
            }
        }
    });

    tokio::select! {
        _ = driver => {},
        _ = navigator => {},
    }
    tracing::info!("Shutting down...");
    Ok(())
}
