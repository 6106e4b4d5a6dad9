// Telemetry session - Drives one connection and the history fetch into the window
use crate::application::history_source::HistorySource;
use crate::application::window_buffer::WindowBuffer;
use crate::domain::command::Command;
use crate::domain::connection::{ConnectionEvent, ConnectionState};
use crate::domain::sample::Sample;
use crate::infrastructure::ws_connection::ConnectionManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

const EVENT_BUFFER: usize = 256;
const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// Owns the window and the active connection handle for one session.
///
/// Every window mutation happens inside `run`, one event at a time, so the
/// buffer needs no locking. Readers get detached snapshots through `subscribe`.
pub struct TelemetrySession {
    manager: ConnectionManager,
    history: Arc<dyn HistorySource>,
    window: WindowBuffer,
    snapshots: watch::Sender<Vec<Sample>>,
}

impl TelemetrySession {
    pub fn new(
        manager: ConnectionManager,
        history: Arc<dyn HistorySource>,
        history_limit: usize,
    ) -> Self {
        let (snapshots, _) = watch::channel(Vec::new());
        Self {
            manager,
            history,
            window: WindowBuffer::new(history_limit),
            snapshots,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Sample>> {
        self.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> Vec<Sample> {
        self.window.snapshot()
    }

    /// Run until `shutdown` fires, then close the connection.
    ///
    /// The history fetch and the connection start together; whichever
    /// finishes first lands in the window first.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>, shutdown: CancellationToken) {
        let (events_tx, mut events_rx) = mpsc::channel(EVENT_BUFFER);
        tracing::info!("Connecting to {}", self.manager.endpoint());
        let mut handle = self.manager.open(events_tx);
        let mut states = handle.subscribe();
        let mut stream_ended = false;

        let history = self.history.clone();
        let fetch = async move { history.fetch_history().await };
        tokio::pin!(fetch);
        let mut history_done = false;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                result = &mut fetch, if !history_done => {
                    history_done = true;
                    self.apply_history(result);
                }
                Ok(()) = states.changed(), if !stream_ended => {
                    let state = *states.borrow_and_update();
                    stream_ended = self.apply_state(state);
                }
                Some(event) = events_rx.recv() => self.apply_event(event),
                Some(command) = commands.recv() => handle.send_command(&command),
            }
        }

        handle.close();
        if tokio::time::timeout(CLOSE_GRACE, handle.closed()).await.is_err() {
            tracing::warn!("Connection did not shut down within {:?}", CLOSE_GRACE);
        }
        tracing::info!("Telemetry session stopped");
    }

    /// Seed the window from a completed history fetch. Failures leave the
    /// window as it is; the live stream still fills it.
    pub fn apply_history(&mut self, result: anyhow::Result<Vec<Sample>>) {
        match result {
            Ok(batch) => {
                tracing::debug!("Seeding window with {} history samples", batch.len());
                self.window.seed(batch);
                self.publish();
            }
            Err(e) => tracing::error!("Failed to fetch history: {:#}", e),
        }
    }

    /// Log a connection state change. Returns `true` once the stream has
    /// ended for good; there is no automatic reconnect.
    pub fn apply_state(&self, state: ConnectionState) -> bool {
        tracing::debug!("Connection state: {}", state);
        if state.is_terminal() {
            tracing::warn!("Telemetry stream {}; restart to reconnect", state);
        }
        state.is_terminal()
    }

    pub fn apply_event(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Opened => tracing::info!("WebSocket connection established"),
            ConnectionEvent::Sample(sample) => {
                self.window.push(sample);
                self.publish();
            }
            ConnectionEvent::Errored(e) => tracing::error!("WebSocket error: {}", e),
            ConnectionEvent::Closed { code, reason } => {
                let code = code.map_or_else(|| "none".to_string(), |c| c.to_string());
                tracing::info!("WebSocket closed (code: {}, reason: {})", code, reason);
            }
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.window.snapshot());
    }
}
