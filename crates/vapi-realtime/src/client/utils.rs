use anyhow::Result;
use secrecy::ExposeSecret;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;

use crate::client::config::Config;
use crate::client::consts::{AUTHORIZATION_HEADER, CALL_PATH};

pub fn build_request(config: &Config) -> Result<Request> {
    let mut request = format!("{}{}", config.base_url(), CALL_PATH).into_client_request()?;
    request.headers_mut().insert(
        AUTHORIZATION_HEADER,
        format!("Bearer {}", config.api_key().expose_secret())
            .as_str()
            .parse()?,
    );
    Ok(request)
}
