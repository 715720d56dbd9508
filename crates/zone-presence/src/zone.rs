//! Zone definitions, validation, and point-in-polygon geometry

use crate::ZoneError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Zone shape kind. Only polygons are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    Polygon,
}

/// A user-defined detection zone.
///
/// Immutable once detection starts for a run; editing happens by replacing
/// the whole zone set, which re-initializes all per-zone state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneDef {
    /// Unique caller-assigned identifier
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ZoneKind,
    /// Ordered polygon vertices (x, y) in frame pixel coordinates
    pub points: Vec<[i32; 2]>,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl ZoneDef {
    /// Create a polygon zone
    pub fn polygon(id: impl Into<String>, points: Vec<[i32; 2]>) -> Self {
        Self {
            id: id.into(),
            kind: ZoneKind::Polygon,
            points,
            description: String::new(),
            enabled: true,
        }
    }

    /// Validate this zone. Malformed polygons are rejected here, at
    /// registration time, never inside the containment test.
    pub fn validate(&self) -> Result<(), ZoneError> {
        if self.points.len() < 3 {
            return Err(ZoneError::TooFewPoints {
                id: self.id.clone(),
                count: self.points.len(),
            });
        }
        Ok(())
    }

    /// Test whether a point lies inside the zone polygon.
    ///
    /// Ray-casting with an explicit on-edge check first: points exactly on a
    /// boundary edge count as inside (non-strict test).
    pub fn contains(&self, x: f32, y: f32) -> bool {
        polygon_contains(&self.points, x as f64, y as f64)
    }
}

/// Parse a zone set from its JSON definition format
pub fn parse_zone_set(json: &str) -> Result<Vec<ZoneDef>, ZoneError> {
    let zones: Vec<ZoneDef> = serde_json::from_str(json)?;
    validate_zone_set(&zones)?;
    Ok(zones)
}

/// Validate a whole zone set: every polygon well-formed, ids unique.
pub fn validate_zone_set(zones: &[ZoneDef]) -> Result<(), ZoneError> {
    if zones.is_empty() {
        return Err(ZoneError::EmptyZoneSet);
    }
    let mut seen = HashSet::new();
    for zone in zones {
        zone.validate()?;
        if !seen.insert(zone.id.as_str()) {
            return Err(ZoneError::DuplicateId(zone.id.clone()));
        }
    }
    Ok(())
}

/// Boundary-inclusive point-in-polygon test
fn polygon_contains(points: &[[i32; 2]], px: f64, py: f64) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (points[i][0] as f64, points[i][1] as f64);
        let (xj, yj) = (points[j][0] as f64, points[j][1] as f64);

        if on_segment(px, py, xi, yi, xj, yj) {
            return true;
        }

        if (yi > py) != (yj > py) {
            let x_cross = (xj - xi) * (py - yi) / (yj - yi) + xi;
            if px < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

const EDGE_EPS: f64 = 1e-9;

fn on_segment(px: f64, py: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> bool {
    let cross = (x2 - x1) * (py - y1) - (y2 - y1) * (px - x1);
    if cross.abs() > EDGE_EPS * ((x2 - x1).abs() + (y2 - y1).abs()).max(1.0) {
        return false;
    }
    px >= x1.min(x2) - EDGE_EPS
        && px <= x1.max(x2) + EDGE_EPS
        && py >= y1.min(y2) - EDGE_EPS
        && py <= y1.max(y2) + EDGE_EPS
}

/// Create four quadrant zones covering the frame with a margin
pub fn create_quadrant_zones(frame_width: i32, frame_height: i32, margin: i32) -> Vec<ZoneDef> {
    create_grid_zones(frame_width, frame_height, 2, 2, margin)
}

/// Create a rows x cols grid of rectangular polygon zones with a margin
pub fn create_grid_zones(
    frame_width: i32,
    frame_height: i32,
    rows: u32,
    cols: u32,
    margin: i32,
) -> Vec<ZoneDef> {
    let usable_w = frame_width - 2 * margin;
    let usable_h = frame_height - 2 * margin;
    let cell_w = usable_w / cols as i32;
    let cell_h = usable_h / rows as i32;

    let mut zones = Vec::with_capacity((rows * cols) as usize);
    for row in 0..rows as i32 {
        for col in 0..cols as i32 {
            let x1 = margin + col * cell_w;
            let y1 = margin + row * cell_h;
            let x2 = x1 + cell_w;
            let y2 = y1 + cell_h;
            let index = row * cols as i32 + col + 1;
            let mut zone = ZoneDef::polygon(
                format!("zone_{index}"),
                vec![[x1, y1], [x2, y1], [x2, y2], [x1, y2]],
            );
            zone.description = format!("Grid cell {index} (row {}, col {})", row + 1, col + 1);
            zones.push(zone);
        }
    }
    zones
}
