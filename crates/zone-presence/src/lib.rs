//! Zone geometry and presence tracking
//!
//! A zone is a user-defined polygon region of interest within the frame.
//! Each zone carries one `PresenceTracker`, a small state machine that turns
//! noisy per-tick "someone is in this zone" booleans into debounced
//! present/absent events using wall-clock thresholds.

pub mod presence;
pub mod zone;

pub use presence::{PresenceTracker, ZoneEvent, ZoneSnapshot, ZoneStatus};
pub use zone::{create_grid_zones, create_quadrant_zones, validate_zone_set, ZoneDef, ZoneKind};

use thiserror::Error;

/// Zone registration error types
#[derive(Error, Debug)]
pub enum ZoneError {
    #[error("Zone '{id}' has {count} points, a polygon needs at least 3")]
    TooFewPoints { id: String, count: usize },

    #[error("Duplicate zone id '{0}'")]
    DuplicateId(String),

    #[error("Zone set is empty")]
    EmptyZoneSet,

    #[error("Zone definition parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
