// src/geometry/walls.rs

use log::warn;

use crate::document::MapDocument;
use crate::geometry::triangulate::TEX_SCALE;
use crate::map::{LineId, Point2, Sector};

/// Which vertical slice of a wall surface a band covers.
///
/// Explicit classification from sector heights, replacing the old habit of
/// inferring bands from which texture fields happened to be assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandKind {
    /// Full floor-to-ceiling span of a one-sided (solid) line.
    Middle,
    /// Kick plate between two differing floor heights on a portal line.
    Bottom,
    /// Lintel between two differing ceiling heights on a portal line.
    Top,
}

/// A vertical band of wall surface, bounded below and above.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallBand {
    pub kind: BandKind,
    pub floor: f64,
    pub ceiling: f64,
}

/// A wall band with its endpoint coordinates resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct WallSegment {
    pub line: LineId,
    pub p1: Point2,
    pub p2: Point2,
    pub band: WallBand,
}

/// A wall rectangle ready for a renderer: four corners, two triangles.
#[derive(Debug, Clone, PartialEq)]
pub struct WallQuad {
    pub positions: [[f64; 3]; 4],
    pub texcoords: [[f64; 2]; 4],
    pub normal: [f64; 3],
    pub indices: [u32; 6],
}

/// Decides which wall bands a line needs, purely from the sector heights on
/// its two sides: a solid line gets one full middle span; a portal gets a
/// bottom band where the floors differ and a top band where the ceilings
/// differ, each bounded by the two heights.
pub fn wall_bands(front: &Sector, back: Option<&Sector>) -> Vec<WallBand> {
    let back = match back {
        Some(back) => back,
        None => {
            return vec![WallBand {
                kind: BandKind::Middle,
                floor: front.floor,
                ceiling: front.ceiling,
            }]
        }
    };

    let mut bands = Vec::with_capacity(2);
    if front.floor != back.floor {
        bands.push(WallBand {
            kind: BandKind::Bottom,
            floor: front.floor.min(back.floor),
            ceiling: front.floor.max(back.floor),
        });
    }
    if front.ceiling != back.ceiling {
        bands.push(WallBand {
            kind: BandKind::Top,
            floor: front.ceiling.min(back.ceiling),
            ceiling: front.ceiling.max(back.ceiling),
        });
    }
    bands
}

/// Resolves a line's endpoints and bands against the live document.
/// Dangling vertex or sector references make the line contribute nothing.
pub fn wall_segments(doc: &MapDocument, line_id: LineId) -> Vec<WallSegment> {
    let line = match doc.lines.get(&line_id) {
        Some(line) => line,
        None => return Vec::new(),
    };

    let (p1, p2) = match (
        doc.vertices.get(&line.start).copied(),
        doc.vertices.get(&line.end).copied(),
    ) {
        (Some(p1), Some(p2)) => (p1, p2),
        _ => {
            warn!("line {}: missing endpoint vertex, skipped", line_id);
            return Vec::new();
        }
    };

    let front = match doc.sectors.get(&line.front.sector) {
        Some(front) => front,
        None => {
            warn!(
                "line {}: missing front sector {}, skipped",
                line_id, line.front.sector
            );
            return Vec::new();
        }
    };
    let back = line.back.as_ref().and_then(|b| doc.sectors.get(&b.sector));

    wall_bands(front, back)
        .into_iter()
        .map(|band| WallSegment {
            line: line_id,
            p1,
            p2,
            band,
        })
        .collect()
}

/// Builds the wall rectangle between two endpoints and two heights.
///
/// `width_ratio` is the source texture's width/height aspect, used only to
/// scale the horizontal texture coordinate. `flip` turns the quad around to
/// face the back sector: winding and normal reverse, and the vertical
/// texture coordinates swap.
pub fn build_wall(
    p1: Point2,
    p2: Point2,
    floor: f64,
    ceiling: f64,
    width_ratio: f64,
    flip: bool,
) -> WallQuad {
    let positions = [
        [p1.x, ceiling, p1.y],
        [p2.x, ceiling, p2.y],
        [p1.x, floor, p1.y],
        [p2.x, floor, p2.y],
    ];

    // Normal from the classic cross product of two quad edges.
    let v1 = sub(positions[0], positions[1]);
    let v2 = sub(positions[0], positions[2]);
    let mut normal = normalize(cross(v2, v1));
    if flip {
        normal = [-normal[0], -normal[1], -normal[2]];
    }

    let u = length(v1) / (TEX_SCALE * width_ratio);
    let v = length(v2) / TEX_SCALE;
    let texcoords = if flip {
        [[0.0, v], [u, v], [0.0, 0.0], [u, 0.0]]
    } else {
        [[0.0, 0.0], [u, 0.0], [0.0, v], [u, v]]
    };

    let indices = if flip {
        [3, 2, 1, 1, 2, 0]
    } else {
        [0, 2, 1, 1, 2, 3]
    };

    WallQuad {
        positions,
        texcoords,
        normal,
        indices,
    }
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn length(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

fn normalize(v: [f64; 3]) -> [f64; 3] {
    let len = length(v);
    if len == 0.0 {
        return v;
    }
    [v[0] / len, v[1] / len, v[2] / len]
}
