//! Live channel client
//!
//! One [`LiveChannel`] instance owns one WebSocket connection and the
//! single read loop that decodes frames and fans them out through a
//! [`SubscriberRegistry`]. Each frame is fully dispatched before the next
//! is read, so subscribers observe arrival order with no coalescing.
//! Reconnection is deliberately not built in here; the policy layer in
//! [`crate::reconnect`] owns that decision per instance.

use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::message::LiveMessage;
use crate::registry::SubscriberRegistry;

#[derive(Error, Debug)]
pub enum LiveError {
    #[error("Failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },
}

/// Connection lifecycle of a live channel instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    Closed(CloseReason),
}

/// Why a channel reached [`ChannelState::Closed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The owner called [`LiveChannel::close`] or dropped the channel.
    Requested,
    /// The server closed the connection or the stream ended.
    ServerClosed,
    /// A transport-level error. Reported once through the state watch;
    /// the channel does not retry.
    Transport(String),
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Handle to one push-channel connection.
pub struct LiveChannel {
    state_tx: watch::Sender<ChannelState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl LiveChannel {
    /// Open a connection and start the read loop.
    ///
    /// The state watch reports `Connecting` and then `Open`; a connection
    /// failure is returned here and no read loop starts. Subscribers on
    /// `registry` receive every subsequent frame in arrival order.
    pub async fn connect(
        url: &str,
        registry: Arc<SubscriberRegistry>,
    ) -> Result<Self, LiveError> {
        let (state_tx, _) = watch::channel(ChannelState::Connecting);

        info!(url, "Connecting to live channel");
        let (stream, _) = connect_async(url)
            .await
            .map_err(|source| LiveError::Connect {
                url: url.to_string(),
                source,
            })?;
        state_tx.send_replace(ChannelState::Open);
        info!(url, "Live channel open");

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(read_loop(stream, registry, state_tx.clone(), shutdown_rx));

        Ok(Self {
            state_tx,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }

    /// Current state.
    pub fn state(&self) -> ChannelState {
        self.state_tx.borrow().clone()
    }

    /// Watch state transitions.
    pub fn watch_state(&self) -> watch::Receiver<ChannelState> {
        self.state_tx.subscribe()
    }

    /// Tear the connection down.
    ///
    /// Once this returns, no further dispatch occurs. A frame that
    /// arrived concurrently with the close request is dropped: the read
    /// loop checks the shutdown signal before every frame, so close
    /// wins the race. A dispatch already in progress finishes first.
    pub async fn close(mut self) {
        if let Some(shutdown) = self.shutdown_tx.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

async fn read_loop(
    mut stream: WsStream,
    registry: Arc<SubscriberRegistry>,
    state_tx: watch::Sender<ChannelState>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            // Biased so a close request beats a frame that raced it.
            biased;

            _ = &mut shutdown_rx => {
                let _ = stream.close(None).await;
                state_tx.send_replace(ChannelState::Closed(CloseReason::Requested));
                debug!("Live channel closed on request");
                return;
            }

            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        let message = LiveMessage::parse(text.as_str());
                        registry.dispatch(&message);
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        if let Err(e) = stream.send(Message::Pong(payload)).await {
                            warn!(error = %e, "Live channel pong failed");
                            state_tx.send_replace(ChannelState::Closed(CloseReason::Transport(
                                e.to_string(),
                            )));
                            return;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Live channel closed by server");
                        state_tx.send_replace(ChannelState::Closed(CloseReason::ServerClosed));
                        return;
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "Live channel transport error");
                        state_tx.send_replace(ChannelState::Closed(CloseReason::Transport(
                            e.to_string(),
                        )));
                        return;
                    }
                    // Binary and pong frames carry nothing for us
                    _ => {}
                }
            }
        }
    }
}
