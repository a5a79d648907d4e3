use anyhow::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::Client;
use serde::Deserialize;

/// The signed-in participant as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
}

// Identity management itself (sign-up, sign-in, cookie issuance) lives in
// an external service. The controller only needs to know who, if anyone,
// is currently signed in, so that is the entire trait surface.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait IdentityService: Send + Sync {
    /// Returns the currently signed-in user, or `None` for an anonymous
    /// visitor (a first-time "generate" session has no participant yet).
    async fn current_user(&self) -> Result<Option<UserProfile>>;
}

/// HTTP client for the identity provider's session endpoint.
pub struct IdentityClient {
    client: Client,
    session_url: String,
}

impl IdentityClient {
    pub fn new(session_url: String) -> Self {
        Self {
            client: Client::new(),
            session_url,
        }
    }
}

#[async_trait]
impl IdentityService for IdentityClient {
    async fn current_user(&self) -> Result<Option<UserProfile>> {
        let response = self.client.get(&self.session_url).send().await?;

        // An expired or missing session cookie is an anonymous visitor,
        // not an error.
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(None);
        }

        let user = response
            .error_for_status()?
            .json::<Option<UserProfile>>()
            .await?;
        Ok(user)
    }
}
