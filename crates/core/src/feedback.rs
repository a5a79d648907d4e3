use crate::session::TranscriptEntry;
use crate::voice::Speaker;
use anyhow::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// One finalized utterance in the shape the scoring service expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptMessage {
    pub role: Speaker,
    pub content: String,
}

impl From<&TranscriptEntry> for TranscriptMessage {
    fn from(entry: &TranscriptEntry) -> Self {
        Self {
            role: entry.speaker,
            content: entry.text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub interview_id: String,
    pub user_id: String,
    pub transcript: Vec<TranscriptMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    pub success: bool,
    #[serde(default)]
    pub feedback_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// The `FeedbackService` trait abstracts the external scoring service that
// turns a finished transcript into a durable feedback record. Ordinary
// service-side failure is reported through `success = false`; only
// transport-level errors surface as `Err`, and callers must treat both
// identically. The adapter performs no retries, and the controller
// guarantees at most one invocation per terminated session.
//
// `#[cfg_attr(test, automock)]` generates a `MockFeedbackService` so the
// controller can be tested without a live scoring endpoint.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait FeedbackService: Send + Sync {
    async fn generate_feedback(&self, request: FeedbackRequest) -> Result<FeedbackResponse>;
}

/// HTTP client for the feedback generation endpoint.
pub struct FeedbackClient {
    client: Client,
    base_url: String,
}

impl FeedbackClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }
}

#[async_trait]
impl FeedbackService for FeedbackClient {
    async fn generate_feedback(&self, request: FeedbackRequest) -> Result<FeedbackResponse> {
        let response = self
            .client
            .post(format!("{}/api/feedback", self.base_url))
            .json(&request)
            .send()
            .await?
            .json::<FeedbackResponse>()
            .await?;

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_camel_case_keys() {
        let request = FeedbackRequest {
            interview_id: "iv1".to_string(),
            user_id: "u1".to_string(),
            transcript: vec![TranscriptMessage {
                role: Speaker::Assistant,
                content: "Tell me about yourself.".to_string(),
            }],
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["interviewId"], "iv1");
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["transcript"][0]["role"], "assistant");
        assert_eq!(value["transcript"][0]["content"], "Tell me about yourself.");
    }

    #[test]
    fn response_tolerates_missing_optional_fields() {
        let response: FeedbackResponse = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert!(!response.success);
        assert_eq!(response.feedback_id, None);
        assert_eq!(response.message, None);

        let response: FeedbackResponse =
            serde_json::from_str(r#"{"success": true, "feedbackId": "fb1"}"#).unwrap();
        assert!(response.success);
        assert_eq!(response.feedback_id.as_deref(), Some("fb1"));
    }

    // This is an integration test that posts to a live feedback endpoint.
    // It is ignored by default so `cargo test` runs without a running
    // service. To run it, set FEEDBACK_BASE_URL and use `cargo test -- --ignored`.
    #[tokio::test]
    #[ignore]
    async fn test_generate_feedback_live() {
        dotenvy::dotenv_override().ok();
        let base_url = std::env::var("FEEDBACK_BASE_URL").expect("FEEDBACK_BASE_URL not set");
        let client = FeedbackClient::new(base_url);

        let request = FeedbackRequest {
            interview_id: "smoke-test".to_string(),
            user_id: "smoke-test".to_string(),
            transcript: vec![
                TranscriptMessage {
                    role: Speaker::Assistant,
                    content: "What is ownership in Rust?".to_string(),
                },
                TranscriptMessage {
                    role: Speaker::User,
                    content: "Each value has a single owner and is dropped when the owner goes out of scope.".to_string(),
                },
            ],
        };

        let response = client.generate_feedback(request).await.unwrap();
        println!("feedback response: {:?}", response);
        if response.success {
            assert!(response.feedback_id.is_some(), "success should carry an id");
        }
    }
}
