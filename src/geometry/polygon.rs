// src/geometry/polygon.rs

use log::warn;

use crate::document::MapDocument;
use crate::map::{SectorId, SectorPolygon};

/// Derives the closed boundary polygon for one sector.
///
/// Walks `sector.lines` in stored order and takes one endpoint per line: the
/// `start` vertex when the line's back side faces this sector, otherwise the
/// `end` vertex (the default, covering one-sided lines too). A shared portal
/// edge is thereby read forward by its front sector and reversed by its back
/// sector, so both loops come out consistently wound without any adjacency
/// sort — provided `lines` is already in loop order, which the sector
/// drawing tool guarantees.
///
/// Missing line or vertex references are skipped with a warning; a sector
/// that resolves to fewer than 3 points still yields a polygon, which later
/// triangulates to nothing. Hole ring indices pass through, except entries
/// pointing past the resolved point list, which are dropped.
pub fn build_sector_polygon(doc: &MapDocument, sector_id: SectorId) -> Option<SectorPolygon> {
    let sector = doc.sectors.get(&sector_id)?;

    let mut points = Vec::with_capacity(sector.lines.len() * 2);
    for line_id in &sector.lines {
        let line = match doc.lines.get(line_id) {
            Some(line) => line,
            None => {
                warn!("sector {}: missing line {}, skipped", sector_id, line_id);
                continue;
            }
        };

        let vertex_id = if line.back.as_ref().map_or(false, |b| b.sector == sector_id) {
            line.start
        } else {
            line.end
        };

        match doc.vertices.get(&vertex_id) {
            Some(v) => {
                points.push(v.x);
                points.push(v.y);
            }
            None => warn!(
                "sector {}: line {} references missing vertex {}, skipped",
                sector_id, line_id, vertex_id
            ),
        }
    }

    let point_count = points.len() / 2;
    let holes = sector
        .holes
        .iter()
        .copied()
        .filter(|h| {
            let ok = *h < point_count;
            if !ok {
                warn!(
                    "sector {}: hole ring index {} exceeds {} points, dropped",
                    sector_id, h, point_count
                );
            }
            ok
        })
        .collect();

    Some(SectorPolygon { points, holes })
}
