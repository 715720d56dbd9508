//! Per-(zone, event-kind) cooldown windows

use crate::EventKind;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Suppresses duplicate outbound notifications.
///
/// Every dispatch is keyed by `(zone_id, event_kind)`. Signal-derived events
/// are suppressed while a prior dispatch for the same key sits inside the
/// cooldown window; zone transition events always pass.
#[derive(Debug)]
pub struct CooldownGate {
    signal_cooldown: Duration,
    last_sent: HashMap<(String, EventKind), Instant>,
}

impl CooldownGate {
    pub fn new(signal_cooldown: Duration) -> Self {
        Self {
            signal_cooldown,
            last_sent: HashMap::new(),
        }
    }

    fn window(&self, kind: EventKind) -> Option<Duration> {
        match kind {
            EventKind::ZoneStatus => None,
            EventKind::SadExpression => Some(self.signal_cooldown),
        }
    }

    /// Check whether a dispatch for this key may go out now
    pub fn should_send(&self, zone_id: &str, kind: EventKind, now: Instant) -> bool {
        let Some(window) = self.window(kind) else {
            return true;
        };
        match self.last_sent.get(&(zone_id.to_string(), kind)) {
            Some(&last) if now.duration_since(last) < window => {
                debug!(zone = zone_id, kind = kind.as_str(), "dispatch suppressed by cooldown");
                false
            }
            _ => true,
        }
    }

    /// Record that a dispatch for this key was sent
    pub fn record_send(&mut self, zone_id: &str, kind: EventKind, now: Instant) {
        self.last_sent.insert((zone_id.to_string(), kind), now);
    }

    /// Drop all cooldown history (zone-set replacement, session restart)
    pub fn clear(&mut self) {
        self.last_sent.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(base: Instant, secs: u64) -> Instant {
        base + Duration::from_secs(secs)
    }

    #[test]
    fn test_signal_cooldown_window() {
        // Dispatch at t=0, retry at t=5 suppressed, t=11 allowed (10s window)
        let base = Instant::now();
        let mut gate = CooldownGate::new(Duration::from_secs(10));

        assert!(gate.should_send("Z1", EventKind::SadExpression, at(base, 0)));
        gate.record_send("Z1", EventKind::SadExpression, at(base, 0));

        assert!(!gate.should_send("Z1", EventKind::SadExpression, at(base, 5)));
        assert!(gate.should_send("Z1", EventKind::SadExpression, at(base, 11)));
    }

    #[test]
    fn test_zone_status_never_cooled() {
        let base = Instant::now();
        let mut gate = CooldownGate::new(Duration::from_secs(10));
        for s in 0..5 {
            assert!(gate.should_send("Z1", EventKind::ZoneStatus, at(base, s)));
            gate.record_send("Z1", EventKind::ZoneStatus, at(base, s));
        }
    }

    #[test]
    fn test_cooldowns_keyed_per_zone() {
        let base = Instant::now();
        let mut gate = CooldownGate::new(Duration::from_secs(10));
        gate.record_send("Z1", EventKind::SadExpression, at(base, 0));
        // A different zone is unaffected by Z1's window
        assert!(gate.should_send("Z2", EventKind::SadExpression, at(base, 1)));
    }

    #[test]
    fn test_clear_resets_windows() {
        let base = Instant::now();
        let mut gate = CooldownGate::new(Duration::from_secs(10));
        gate.record_send("Z1", EventKind::SadExpression, at(base, 0));
        gate.clear();
        assert!(gate.should_send("Z1", EventKind::SadExpression, at(base, 1)));
    }
}
