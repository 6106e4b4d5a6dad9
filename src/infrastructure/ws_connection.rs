// WebSocket connection manager - Owns the streaming transport and its lifecycle
use crate::domain::command::Command;
use crate::domain::connection::{ConnectionEvent, ConnectionState};
use crate::domain::sample::Sample;
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

const OUTBOUND_BUFFER: usize = 64;
// Transport bound, far above any telemetry frame. A larger inbound message is
// a protocol violation and fails the connection rather than being skipped.
const MAX_MESSAGE_SIZE: usize = 1 << 20;

/// Failures inside a connection. They are turned into state transitions and
/// events, never returned to callers.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error(transparent)]
    Transport(#[from] tungstenite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected binary frame ({0} bytes)")]
    Binary(usize),
}

pub fn decode_sample(text: &str) -> Result<Sample, ConnectionError> {
    Ok(serde_json::from_str(text)?)
}

pub fn encode_command(command: &Command) -> Result<String, ConnectionError> {
    Ok(serde_json::to_string(command)?)
}

/// Opens streaming connections to one fixed endpoint.
#[derive(Debug, Clone)]
pub struct ConnectionManager {
    endpoint: String,
    max_message_size: usize,
}

impl ConnectionManager {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            max_message_size: MAX_MESSAGE_SIZE,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Start connecting and return the handle immediately in `Connecting`.
    ///
    /// Every lifecycle change and every decoded sample is delivered on
    /// `events`, in arrival order. Must be called inside a tokio runtime.
    pub fn open(&self, events: mpsc::Sender<ConnectionEvent>) -> ConnectionHandle {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        let state = Arc::new(state);
        let (write_tx, write_rx) = mpsc::channel(OUTBOUND_BUFFER);
        let cancel = CancellationToken::new();

        transition(&state, ConnectionState::Connecting);
        debug!(endpoint = %self.endpoint, "connecting");

        let task = tokio::spawn(run_connection(
            self.endpoint.clone(),
            self.max_message_size,
            state.clone(),
            events,
            write_rx,
            cancel.clone(),
        ));

        ConnectionHandle {
            state,
            write_tx,
            cancel,
            task,
        }
    }
}

/// One streaming connection. A closed or failed handle is never reused.
pub struct ConnectionHandle {
    state: Arc<watch::Sender<ConnectionState>>,
    write_tx: mpsc::Sender<Message>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ConnectionHandle {
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Queue a command for transmission if the connection is open.
    ///
    /// Anything else drops the command with a warning. There is no retry and
    /// no delivery report.
    pub fn send_command(&self, command: &Command) {
        let state = self.state();
        if state != ConnectionState::Open {
            warn!(%state, ?command, "stream not open, cannot send command");
            return;
        }

        let json = match encode_command(command) {
            Ok(json) => json,
            Err(e) => {
                warn!(?command, "failed to encode command: {e}");
                return;
            }
        };

        if let Err(e) = self.write_tx.try_send(Message::Text(json.into())) {
            warn!(?command, "dropping command: {e}");
        }
    }

    /// Close the connection. Calling it again, or after a failure, is a no-op.
    pub fn close(&self) {
        if transition(&self.state, ConnectionState::Closed) {
            debug!("connection closed by client");
        }
        self.cancel.cancel();
    }

    /// Wait until the connection task has finished its teardown.
    pub async fn closed(&mut self) {
        let _ = (&mut self.task).await;
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        self.close();
    }
}

fn transition(state: &watch::Sender<ConnectionState>, next: ConnectionState) -> bool {
    state.send_if_modified(|current| {
        if current.can_transition_to(next) {
            *current = next;
            true
        } else {
            false
        }
    })
}

async fn run_connection(
    endpoint: String,
    max_message_size: usize,
    state: Arc<watch::Sender<ConnectionState>>,
    events: mpsc::Sender<ConnectionEvent>,
    write_rx: mpsc::Receiver<Message>,
    cancel: CancellationToken,
) {
    let mut ws_config = tungstenite::protocol::WebSocketConfig::default();
    ws_config.max_message_size = Some(max_message_size);
    ws_config.max_frame_size = Some(max_message_size);

    let connect =
        tokio_tungstenite::connect_async_with_config(endpoint.as_str(), Some(ws_config), false);
    let ws_stream = tokio::select! {
        _ = cancel.cancelled() => return,
        result = connect => match result {
            Ok((ws_stream, _)) => ws_stream,
            Err(e) => {
                fail(&state, &events, e.into()).await;
                return;
            }
        },
    };

    // close() may have won the race against the handshake.
    if !transition(&state, ConnectionState::Open) {
        return;
    }
    let _ = events.send(ConnectionEvent::Opened).await;

    let (write, read) = ws_stream.split();
    let writer = tokio::spawn(write_pump(write, write_rx, cancel.clone()));
    let outcome = read_pump(read, &events, &cancel).await;
    cancel.cancel();
    let _ = writer.await;

    match outcome {
        ReadOutcome::Cancelled => {}
        ReadOutcome::Closed { code, reason } => {
            if transition(&state, ConnectionState::Closed) {
                debug!(?code, %reason, "server closed the stream");
                let _ = events.send(ConnectionEvent::Closed { code, reason }).await;
            }
        }
        ReadOutcome::Failed(e) => fail(&state, &events, e).await,
    }
}

async fn fail(
    state: &watch::Sender<ConnectionState>,
    events: &mpsc::Sender<ConnectionEvent>,
    error: ConnectionError,
) {
    if transition(state, ConnectionState::Errored) {
        debug!("stream failed: {error}");
        let _ = events.send(ConnectionEvent::Errored(error.to_string())).await;
    }
}

#[derive(Debug)]
pub(crate) enum ReadOutcome {
    Cancelled,
    Closed { code: Option<u16>, reason: String },
    Failed(ConnectionError),
}

/// Reads frames and forwards decoded samples in arrival order.
///
/// Malformed payloads are logged and skipped; they never end the stream.
pub(crate) async fn read_pump<S>(
    mut read: S,
    events: &mpsc::Sender<ConnectionEvent>,
    cancel: &CancellationToken,
) -> ReadOutcome
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    loop {
        let msg = tokio::select! {
            _ = cancel.cancelled() => return ReadOutcome::Cancelled,
            msg = read.next() => msg,
        };

        match msg {
            Some(Ok(Message::Text(text))) => match decode_sample(&text) {
                Ok(sample) => {
                    if events.send(ConnectionEvent::Sample(sample)).await.is_err() {
                        debug!("event receiver dropped, stopping read pump");
                        return ReadOutcome::Cancelled;
                    }
                }
                Err(e) => {
                    warn!(payload = %text.as_str(), "failed to parse stream message: {e}");
                }
            },
            Some(Ok(Message::Binary(data))) => {
                warn!("{}, dropping", ConnectionError::Binary(data.len()));
            }
            Some(Ok(Message::Close(frame))) => {
                let (code, reason) = match frame {
                    Some(f) => (Some(u16::from(f.code)), f.reason.as_str().to_owned()),
                    None => (None, String::new()),
                };
                return ReadOutcome::Closed { code, reason };
            }
            Some(Ok(_)) => {} // ping / pong
            Some(Err(e)) => return ReadOutcome::Failed(e.into()),
            None => {
                return ReadOutcome::Closed {
                    code: None,
                    reason: String::new(),
                };
            }
        }
    }
}

/// Sends queued commands until cancelled or the queue closes.
///
/// Commands accepted before the close are flushed ahead of the close frame.
/// After a write failure the rest of the queue is discarded and reported.
pub(crate) async fn write_pump<S>(
    mut write: S,
    mut write_rx: mpsc::Receiver<Message>,
    cancel: CancellationToken,
) where
    S: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    loop {
        let frame = tokio::select! {
            _ = cancel.cancelled() => break,
            frame = write_rx.recv() => frame,
        };
        let Some(frame) = frame else { break };

        if let Err(e) = write.send(frame).await {
            error!("WebSocket write error: {e}");
            discard_queued(&mut write_rx);
            return;
        }
    }

    write_rx.close();
    while let Ok(frame) = write_rx.try_recv() {
        if let Err(e) = write.send(frame).await {
            debug!("failed to flush queued command: {e}");
            discard_queued(&mut write_rx);
            return;
        }
    }

    let _ = write.send(Message::Close(None)).await;
}

fn discard_queued(write_rx: &mut mpsc::Receiver<Message>) {
    write_rx.close();
    let mut dropped = 0;
    while write_rx.try_recv().is_ok() {
        dropped += 1;
    }
    if dropped > 0 {
        warn!("dropping {dropped} queued command(s), connection is gone");
    }
}
