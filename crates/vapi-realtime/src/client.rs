use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

use crate::types;

mod config;
mod consts;
mod utils;

pub use config::{Config, ConfigBuilder};

pub type ClientTx = tokio::sync::mpsc::Sender<types::ClientEvent>;
type ServerTx = tokio::sync::broadcast::Sender<types::ServerEvent>;
pub type ServerRx = tokio::sync::broadcast::Receiver<types::ServerEvent>;

/// Handles for the two pump tasks owned by an open connection.
pub struct Connection {
    pub(crate) send_handle: tokio::task::JoinHandle<()>,
    pub(crate) recv_handle: tokio::task::JoinHandle<()>,
}

// The control-channel surface the application depends on. `Client` is the
// live implementation; tests mock this trait instead of opening a socket.
#[async_trait]
pub trait VapiClient: Send {
    /// Asks the provider to begin a call against the agent script selected
    /// by the descriptor.
    async fn start_call(
        &mut self,
        descriptor: String,
        overrides: types::AssistantOverrides,
    ) -> Result<()>;

    /// Asks the provider to terminate the running call. The confirmation
    /// arrives later as a `call-end` server event.
    async fn stop_call(&mut self) -> Result<()>;

    /// Subscribes to the stream of server events. Each call returns an
    /// independent receiver over the same broadcast channel.
    async fn server_events(&mut self) -> Result<ServerRx>;
}

pub struct Client {
    capacity: usize,
    config: Config,
    c_tx: Option<ClientTx>,
    s_tx: Option<ServerTx>,
}

impl Client {
    fn new(capacity: usize, config: Config) -> Self {
        Self {
            capacity,
            config,
            c_tx: None,
            s_tx: None,
        }
    }

    async fn connect(&mut self) -> Result<Connection> {
        if self.c_tx.is_some() {
            bail!("already connected");
        }

        let request = utils::build_request(&self.config)?;
        let (ws_stream, _) = tokio_tungstenite::connect_async(request)
            .await
            .context("websocket handshake with the voice provider failed")?;

        let (mut write, mut read) = ws_stream.split();

        let (c_tx, mut c_rx) = tokio::sync::mpsc::channel(self.capacity);
        let (s_tx, _) = tokio::sync::broadcast::channel(self.capacity);

        self.c_tx = Some(c_tx.clone());
        self.s_tx = Some(s_tx.clone());

        // Outbound pump: serialize client events onto the socket.
        let send_handle = tokio::spawn(async move {
            while let Some(event) = c_rx.recv().await {
                match serde_json::to_string(&event) {
                    Ok(text) => {
                        if let Err(e) = write.send(Message::Text(text)).await {
                            tracing::error!("failed to send client event: {}", e);
                        }
                    }
                    Err(e) => {
                        tracing::error!("failed to serialize client event: {}", e);
                    }
                }
            }
        });

        // Inbound pump: parse provider frames and fan them out to every
        // subscriber. A frame we cannot parse is logged and skipped; it
        // must not tear the connection down.
        let recv_handle = tokio::spawn(async move {
            while let Some(message) = read.next().await {
                let message = match message {
                    Ok(message) => message,
                    Err(e) => {
                        tracing::error!("failed to read from voice provider: {}", e);
                        break;
                    }
                };
                match message {
                    Message::Text(text) => match serde_json::from_str::<types::ServerEvent>(&text) {
                        Ok(event) => {
                            tracing::debug!(?event, "received server event");
                            if let Err(e) = s_tx.send(event) {
                                tracing::error!("failed to broadcast server event: {}", e);
                            }
                        }
                        Err(e) => {
                            tracing::error!("unrecognized server frame: {}, raw=> {:?}", e, text);
                        }
                    },
                    Message::Close(reason) => {
                        tracing::info!("voice provider closed the connection: {:?}", reason);
                        break;
                    }
                    Message::Ping(_) | Message::Pong(_) => {}
                    other => {
                        tracing::warn!("unexpected frame from voice provider: {:?}", other);
                    }
                }
            }
        });

        Ok(Connection {
            send_handle,
            recv_handle,
        })
    }

    async fn send_client_event(&mut self, event: types::ClientEvent) -> Result<()> {
        match self.c_tx {
            Some(ref tx) => {
                tx.send(event).await?;
                Ok(())
            }
            None => bail!("not connected yet"),
        }
    }
}

#[async_trait]
impl VapiClient for Client {
    async fn start_call(
        &mut self,
        descriptor: String,
        overrides: types::AssistantOverrides,
    ) -> Result<()> {
        let event = types::ClientEvent::Start {
            descriptor,
            overrides,
        };
        self.send_client_event(event).await
    }

    async fn stop_call(&mut self) -> Result<()> {
        self.send_client_event(types::ClientEvent::Stop).await
    }

    async fn server_events(&mut self) -> Result<ServerRx> {
        match self.s_tx {
            Some(ref tx) => Ok(tx.subscribe()),
            None => bail!("not connected yet"),
        }
    }
}

pub async fn connect_with_config(capacity: usize, config: Config) -> Result<Client> {
    let mut client = Client::new(capacity, config);
    client.connect().await?;
    Ok(client)
}

pub async fn connect() -> Result<Client> {
    let config = Config::new();
    connect_with_config(1024, config).await
}
