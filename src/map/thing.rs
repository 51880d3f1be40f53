// src/map/thing.rs

use serde::{Deserialize, Serialize};

/// A placed instance of a sprite/object template at a map position.
///
/// `kind` keys into an external template registry; the data layer only
/// stores the placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thing {
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_offset: Option<f64>,
}

impl Thing {
    pub fn new(kind: impl Into<String>, x: f64, y: f64) -> Self {
        Thing {
            kind: kind.into(),
            x,
            y,
            y_offset: None,
        }
    }
}

/// Where the player spawns, and which way they face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerStart {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub angle: f64,
}
