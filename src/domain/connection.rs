// Connection domain model - Lifecycle state and typed transport events
use std::fmt;

use super::sample::Sample;

/// Lifecycle of a single streaming connection.
///
/// `Disconnected -> Connecting -> Open -> {Closed, Errored}`. The last two are
/// terminal; recovering requires opening a new handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Open,
    Closed,
    Errored,
}

impl ConnectionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Errored)
    }

    /// Whether the lifecycle may move from `self` to `next`.
    pub fn can_transition_to(self, next: ConnectionState) -> bool {
        use ConnectionState::*;
        match (self, next) {
            (Disconnected, Connecting) => true,
            (Connecting, Open) => true,
            (Connecting | Open, Closed | Errored) => true,
            (Disconnected, Closed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Errored => "errored",
        };
        f.write_str(name)
    }
}

/// Events a connection reports to whoever drives the session.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    Opened,
    Sample(Sample),
    Errored(String),
    Closed { code: Option<u16>, reason: String },
}
