//! Webhook sender task and dispatcher front-end

use crate::{CooldownGate, DispatchError, EventKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use zone_presence::{ZoneEvent, ZoneStatus};

/// Outbound webhook payload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub event_id: Uuid,
    pub zone_id: String,
    pub status: String,
    pub occupancy_count: u32,
    pub timestamp: DateTime<Utc>,
}

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Webhook endpoint URL; `None` disables outbound dispatch entirely
    pub endpoint: Option<String>,
    /// Cooldown window for signal-derived events
    pub signal_cooldown: Duration,
    /// Sender channel capacity; a full channel drops the notification
    pub queue_capacity: usize,
    /// HTTP request timeout
    pub request_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            signal_cooldown: Duration::from_secs(10),
            queue_capacity: 32,
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// Cooldown-gated, fire-and-forget webhook dispatcher.
///
/// Owned by the detection worker. `spawn` starts the sender task on the
/// current tokio runtime; the worker side only ever performs a non-blocking
/// `try_send`, so dispatch can never stall a tick.
pub struct EventDispatcher {
    tx: Option<mpsc::Sender<WebhookPayload>>,
    gate: CooldownGate,
}

impl EventDispatcher {
    /// Create the dispatcher and spawn its sender task.
    ///
    /// Must be called from within a tokio runtime when an endpoint is
    /// configured.
    pub fn spawn(config: DispatcherConfig) -> Result<Self, DispatchError> {
        let gate = CooldownGate::new(config.signal_cooldown);

        let Some(endpoint) = config.endpoint.clone() else {
            debug!("no webhook endpoint configured, dispatch disabled");
            return Ok(Self { tx: None, gate });
        };

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DispatchError::Client(e.to_string()))?;

        let (tx, mut rx) = mpsc::channel::<WebhookPayload>(config.queue_capacity);

        tokio::spawn(async move {
            info!(endpoint = %endpoint, "webhook sender started");
            while let Some(payload) = rx.recv().await {
                match client.post(&endpoint).json(&payload).send().await {
                    Ok(resp) if resp.status().is_success() => {
                        debug!(zone = %payload.zone_id, status = %payload.status, "webhook delivered");
                    }
                    Ok(resp) => {
                        warn!(
                            zone = %payload.zone_id,
                            http_status = %resp.status(),
                            "webhook rejected by endpoint"
                        );
                    }
                    Err(e) => {
                        warn!(zone = %payload.zone_id, error = %e, "webhook dispatch failed");
                    }
                }
            }
            info!("webhook sender stopped");
        });

        Ok(Self { tx: Some(tx), gate })
    }

    /// Dispatcher that drops everything (no endpoint configured)
    pub fn disabled() -> Self {
        Self {
            tx: None,
            gate: CooldownGate::new(Duration::from_secs(10)),
        }
    }

    /// Dispatch a confirmed zone transition. Never cooled down.
    pub fn dispatch_zone_event(&mut self, event: &ZoneEvent, now: Instant) {
        let status = match event.status {
            ZoneStatus::Present => "present",
            ZoneStatus::Absent => "absent",
        };
        self.dispatch(
            &event.zone_id,
            EventKind::ZoneStatus,
            status,
            event.occupancy_count,
            now,
        );
    }

    /// Dispatch a signal-derived notification, subject to its cooldown.
    pub fn dispatch_signal_event(
        &mut self,
        zone_id: &str,
        kind: EventKind,
        status: &str,
        occupancy_count: u32,
        now: Instant,
    ) {
        self.dispatch(zone_id, kind, status, occupancy_count, now);
    }

    fn dispatch(
        &mut self,
        zone_id: &str,
        kind: EventKind,
        status: &str,
        occupancy_count: u32,
        now: Instant,
    ) {
        let Some(tx) = &self.tx else {
            return;
        };
        if !self.gate.should_send(zone_id, kind, now) {
            return;
        }

        let payload = WebhookPayload {
            event_id: Uuid::new_v4(),
            zone_id: zone_id.to_string(),
            status: status.to_string(),
            occupancy_count,
            timestamp: Utc::now(),
        };

        match tx.try_send(payload) {
            Ok(()) => self.gate.record_send(zone_id, kind, now),
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(zone = zone_id, kind = kind.as_str(), "dispatch queue full, notification dropped");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("webhook sender gone, notification dropped");
            }
        }
    }
}
