//! Outbound event dispatch
//!
//! Sends webhook notifications for confirmed zone transitions and for
//! signal-derived alerts (e.g. a sustained sad expression). Dispatch is
//! fire-and-forget: the hot detection loop enqueues onto a bounded channel
//! and a dedicated sender task performs the HTTP POST, so a slow or
//! unreachable endpoint can never stall detection. Send failures are logged
//! and swallowed, never retried.

pub mod cooldown;
pub mod webhook;

pub use cooldown::CooldownGate;
pub use webhook::{DispatcherConfig, EventDispatcher, WebhookPayload};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Dispatch error types
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("HTTP client construction failed: {0}")]
    Client(String),
}

/// Kind of outbound notification, the second half of the cooldown key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Confirmed zone present/absent transition. Not cooled down: the
    /// presence state machine already guarantees at-most-once-per-transition.
    ZoneStatus,
    /// Sustained sad expression above the confidence cutoff
    SadExpression,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ZoneStatus => "zone_status",
            EventKind::SadExpression => "sad_expression",
        }
    }
}
