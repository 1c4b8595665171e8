//! Connectivity state machine of the generated client proxies.
//!
//! ```text
//!   Unknown ──probe ok──▶ Connected ◀──probe ok── Disconnected
//!                            │                         ▲
//!                            └─probe failed / stream───┘
//!                                  terminated
//! ```
//!
//! Entering `Connected` from any other state requires a full state resync.
//! Every other (state, event) pair leaves the state unchanged.

use serde::Serialize;

/// Connectivity state of a client proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConnectionState {
    Unknown,
    Connected,
    Disconnected,
}

impl ConnectionState {
    /// Every state, in wire order.
    pub const ALL: [ConnectionState; 3] = [
        ConnectionState::Unknown,
        ConnectionState::Connected,
        ConnectionState::Disconnected,
    ];

    /// Numeric value of the `ConnectionStatus` schema enum.
    pub fn wire_value(&self) -> i32 {
        match self {
            ConnectionState::Unknown => 0,
            ConnectionState::Connected => 1,
            ConnectionState::Disconnected => 2,
        }
    }

    /// Enum value name in the schema (`CONNECTED`).
    pub fn wire_name(&self) -> &'static str {
        match self {
            ConnectionState::Unknown => "UNKNOWN",
            ConnectionState::Connected => "CONNECTED",
            ConnectionState::Disconnected => "DISCONNECTED",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Unknown => "Unknown",
            ConnectionState::Connected => "Connected",
            ConnectionState::Disconnected => "Disconnected",
        }
    }

    /// The transition taken from this state on `event`, if any.
    pub fn on(self, event: ConnectionEvent) -> Option<&'static Transition> {
        TRANSITIONS
            .iter()
            .find(|t| t.from == self && t.event == event)
    }

    /// The state after `event`.
    pub fn next(self, event: ConnectionEvent) -> ConnectionState {
        self.on(event).map_or(self, |t| t.to)
    }
}

/// Inputs to the connectivity state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConnectionEvent {
    /// A liveness probe returned `CONNECTED`.
    ProbeSucceeded,
    /// A liveness probe failed or returned anything else.
    ProbeFailed,
    /// The notification stream ended or errored.
    StreamTerminated,
}

impl ConnectionEvent {
    pub const ALL: [ConnectionEvent; 3] = [
        ConnectionEvent::ProbeSucceeded,
        ConnectionEvent::ProbeFailed,
        ConnectionEvent::StreamTerminated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionEvent::ProbeSucceeded => "ProbeSucceeded",
            ConnectionEvent::ProbeFailed => "ProbeFailed",
            ConnectionEvent::StreamTerminated => "StreamTerminated",
        }
    }
}

/// A single edge of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: ConnectionState,
    pub event: ConnectionEvent,
    pub to: ConnectionState,
    /// Whether entering `to` triggers a full state resync.
    pub resync: bool,
}

/// The complete transition table.
pub const TRANSITIONS: &[Transition] = &[
    Transition {
        from: ConnectionState::Unknown,
        event: ConnectionEvent::ProbeSucceeded,
        to: ConnectionState::Connected,
        resync: true,
    },
    Transition {
        from: ConnectionState::Disconnected,
        event: ConnectionEvent::ProbeSucceeded,
        to: ConnectionState::Connected,
        resync: true,
    },
    Transition {
        from: ConnectionState::Connected,
        event: ConnectionEvent::ProbeFailed,
        to: ConnectionState::Disconnected,
        resync: false,
    },
    Transition {
        from: ConnectionState::Connected,
        event: ConnectionEvent::StreamTerminated,
        to: ConnectionState::Disconnected,
        resync: false,
    },
];
