//! Debounced per-zone presence state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Confirmed zone occupancy status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneStatus {
    Present,
    Absent,
}

/// Emitted at most once per confirmed state transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneEvent {
    pub zone_id: String,
    pub status: ZoneStatus,
    pub occupancy_count: u32,
    pub timestamp: DateTime<Utc>,
}

/// Snapshot of a zone's tracked state, pushed to the stats queue each tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneSnapshot {
    pub zone_id: String,
    /// Last confirmed status, `None` before the first confirmed transition
    pub status: Option<ZoneStatus>,
    pub occupancy_count: u32,
    /// Raw (un-debounced) occupancy as of the last tick
    pub occupied: bool,
}

/// One presence tracker per zone.
///
/// Fed a boolean "occupied this tick" once per inference tick. Thresholds
/// are measured in wall-clock time between ticks, not tick counts, so the
/// effective debounce granularity is the configured detection interval.
#[derive(Debug)]
pub struct PresenceTracker {
    zone_id: String,
    presence_threshold: Duration,
    absence_threshold: Duration,
    occupied: bool,
    occupied_since: Option<Instant>,
    vacant_since: Option<Instant>,
    last_emitted: Option<ZoneStatus>,
    occupancy_count: u32,
}

impl PresenceTracker {
    pub fn new(
        zone_id: impl Into<String>,
        presence_threshold: Duration,
        absence_threshold: Duration,
    ) -> Self {
        Self {
            zone_id: zone_id.into(),
            presence_threshold,
            absence_threshold,
            occupied: false,
            occupied_since: None,
            vacant_since: None,
            last_emitted: None,
            occupancy_count: 0,
        }
    }

    /// Advance the state machine by one inference tick.
    ///
    /// Returns a `ZoneEvent` when a debounce threshold is crossed for the
    /// first time in the current occupancy span; flapping faster than the
    /// threshold produces no events.
    pub fn observe(&mut self, occupied_this_tick: bool, now: Instant) -> Option<ZoneEvent> {
        if occupied_this_tick {
            if !self.occupied {
                // Vacant -> Occupying: restart the presence timer
                self.occupied = true;
                self.occupied_since = Some(now);
                self.vacant_since = None;
                debug!(zone = %self.zone_id, "occupancy span started");
            } else if let Some(since) = self.occupied_since {
                if now.duration_since(since) >= self.presence_threshold
                    && self.last_emitted != Some(ZoneStatus::Present)
                {
                    self.last_emitted = Some(ZoneStatus::Present);
                    self.occupancy_count += 1;
                    return Some(self.event(ZoneStatus::Present));
                }
            }
        } else if self.occupied {
            // Occupying -> Vacating: restart the absence timer
            self.occupied = false;
            self.vacant_since = Some(now);
            self.occupied_since = None;
            debug!(zone = %self.zone_id, "occupancy span ended");
        } else if let Some(since) = self.vacant_since {
            if now.duration_since(since) >= self.absence_threshold
                && self.last_emitted == Some(ZoneStatus::Present)
            {
                self.last_emitted = Some(ZoneStatus::Absent);
                return Some(self.event(ZoneStatus::Absent));
            }
        }
        None
    }

    fn event(&self, status: ZoneStatus) -> ZoneEvent {
        ZoneEvent {
            zone_id: self.zone_id.clone(),
            status,
            occupancy_count: self.occupancy_count,
            timestamp: Utc::now(),
        }
    }

    /// Current state snapshot for the stats queue
    pub fn snapshot(&self) -> ZoneSnapshot {
        ZoneSnapshot {
            zone_id: self.zone_id.clone(),
            status: self.last_emitted,
            occupancy_count: self.occupancy_count,
            occupied: self.occupied,
        }
    }

    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    pub fn occupancy_count(&self) -> u32 {
        self.occupancy_count
    }

    /// Clear all tracked state, including the occupancy counter.
    pub fn reset(&mut self) {
        self.occupied = false;
        self.occupied_since = None;
        self.vacant_since = None;
        self.last_emitted = None;
        self.occupancy_count = 0;
    }
}
