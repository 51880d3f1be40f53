// src/map/sector.rs

use serde::{Deserialize, Serialize};

use crate::map::{LineId, SectorId};

/// Derived flat boundary polygon for a sector: alternating x,y coordinates
/// for the closed outer loop, followed by any interior hole rings.
///
/// `holes` contains the point index (not the float offset) at which each
/// hole ring starts, matching the ear-clipping triangulator's contract.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectorPolygon {
    pub points: Vec<f64>,
    pub holes: Vec<usize>,
}

impl SectorPolygon {
    /// Number of 2D points across all rings.
    pub fn point_count(&self) -> usize {
        self.points.len() / 2
    }

    /// End offset of the outer ring within `points`. Clamped to the point
    /// array, since a hole index from a persisted document may be out of
    /// range.
    pub fn outer_end(&self) -> usize {
        self.holes
            .first()
            .map_or(self.points.len(), |h| (h * 2).min(self.points.len()))
    }
}

/// A horizontally bounded region of the map with its own floor and ceiling
/// height — a room, in effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sector {
    pub id: SectorId,

    /// Floor height in map units. Expected below `ceiling`.
    pub floor: f64,
    pub ceiling: f64,

    /// Boundary line ids in loop order (drawing order). The polygon builder
    /// depends on this ordering; it is an authoring invariant maintained by
    /// the sector drawing tool, not re-derived from edge adjacency.
    pub lines: Vec<LineId>,

    /// Point indices marking hole ring starts in the derived polygon.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub holes: Vec<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tex_floor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tex_ceil: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,

    /// Cached derived polygon. Cleared whenever a boundary vertex or line is
    /// edited, rebuilt on demand; never persisted.
    #[serde(skip)]
    pub poly: Option<SectorPolygon>,
}

impl Sector {
    pub fn new(id: SectorId, floor: f64, ceiling: f64) -> Self {
        Sector {
            id,
            floor,
            ceiling,
            lines: Vec::new(),
            holes: Vec::new(),
            tex_floor: None,
            tex_ceil: None,
            brightness: None,
            poly: None,
        }
    }

    /// Difference between ceiling and floor height.
    pub fn headroom(&self) -> f64 {
        self.ceiling - self.floor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outer_end_without_holes() {
        let poly = SectorPolygon {
            points: vec![0.0, 0.0, 10.0, 0.0, 10.0, 10.0],
            holes: vec![],
        };
        assert_eq!(poly.point_count(), 3);
        assert_eq!(poly.outer_end(), 6);
    }

    #[test]
    fn test_outer_end_with_hole() {
        let poly = SectorPolygon {
            points: vec![0.0; 16],
            holes: vec![5],
        };
        assert_eq!(poly.outer_end(), 10);
    }

    #[test]
    fn test_outer_end_clamps_out_of_range_hole() {
        let poly = SectorPolygon {
            points: vec![0.0; 8],
            holes: vec![10],
        };
        assert_eq!(poly.outer_end(), 8);
    }

    #[test]
    fn test_poly_cache_not_serialized() {
        let mut sector = Sector::new(0, 0.0, 10.0);
        sector.poly = Some(SectorPolygon {
            points: vec![0.0, 0.0],
            holes: vec![],
        });
        let json = serde_json::to_string(&sector).unwrap();
        assert!(!json.contains("poly"));
        let back: Sector = serde_json::from_str(&json).unwrap();
        assert!(back.poly.is_none());
        assert_eq!(back.headroom(), 10.0);
    }
}
