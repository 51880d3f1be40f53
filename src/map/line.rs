// src/map/line.rs

use serde::{Deserialize, Serialize};

use crate::map::{LineId, SectorId, VertexId};

/// One side of a line: the sector it faces plus optional texture assignments
/// and texture offsets for that face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Side {
    pub sector: SectorId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tex_mid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tex_bot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tex_top: Option<String>,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub x_offset: f64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub y_offset: f64,
}

fn is_zero(v: &f64) -> bool {
    *v == 0.0
}

impl Side {
    pub fn new(sector: SectorId) -> Self {
        Side {
            sector,
            tex_mid: None,
            tex_bot: None,
            tex_top: None,
            x_offset: 0.0,
            y_offset: 0.0,
        }
    }
}

/// A directed boundary edge between two vertices.
///
/// A line carrying only a `front` side is a solid wall; one carrying both
/// sides is a portal between two sectors. The canonical direction
/// (`start` → `end`) is what lets the polygon builder hand each side a
/// consistently wound loop: the front sector reads the edge forward, the
/// back sector reads it reversed.
///
/// Invariant: `start != end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub id: LineId,
    pub start: VertexId,
    pub end: VertexId,
    pub front: Side,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<Side>,
}

impl Line {
    /// True for a two-sided line connecting two sectors.
    pub fn is_portal(&self) -> bool {
        self.back.is_some()
    }

    /// True when the given sector sits on either side of this line.
    pub fn touches_sector(&self, sector: SectorId) -> bool {
        self.front.sector == sector || self.back.as_ref().map_or(false, |b| b.sector == sector)
    }

    pub fn touches_vertex(&self, vertex: VertexId) -> bool {
        self.start == vertex || self.end == vertex
    }

    /// True when this line runs between the two vertices, in either direction.
    pub fn connects(&self, a: VertexId, b: VertexId) -> bool {
        (self.start == a && self.end == b) || (self.start == b && self.end == a)
    }
}
