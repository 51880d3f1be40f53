// src/document/document.rs

use std::collections::BTreeMap;
use std::io::{Read, Write};

use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::polygon;
use crate::map::{
    Line, LineId, PlayerStart, Point2, Sector, SectorId, SectorPolygon, Side, Thing, VertexId,
};

/// Default heights for sectors created by the drawing tool.
pub const DEFAULT_FLOOR: f64 = 0.0;
pub const DEFAULT_CEILING: f64 = 10.0;

/// Errors raised while loading or saving a map document.
///
/// Structural problems *inside* a loaded document (a line referencing a
/// missing vertex, a side referencing a missing sector) are deliberately not
/// errors here: editing passes through invalid intermediate states, so the
/// derivation pipeline skips bad references instead of failing the map.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed map document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything `delete_sector` removed, so the editor can restore it on undo.
#[derive(Debug, Clone)]
pub struct DeletedSector {
    pub sector: Sector,
    pub lines: Vec<Line>,
    pub vertices: Vec<(VertexId, Point2)>,
}

/// The in-memory map document: vertices, lines, sectors and things, plus the
/// monotonic id counters used for identity allocation.
///
/// `BTreeMap` keeps iteration in ascending id order, which is the storage
/// order the sector locator's first-match rule is defined over.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDocument {
    pub name: String,
    pub player_start: PlayerStart,

    #[serde(default)]
    pub things: Vec<Thing>,
    #[serde(default)]
    pub vertices: BTreeMap<VertexId, Point2>,
    #[serde(default)]
    pub lines: BTreeMap<LineId, Line>,
    #[serde(default)]
    pub sectors: BTreeMap<SectorId, Sector>,

    #[serde(default)]
    pub vertex_inc: VertexId,
    #[serde(default)]
    pub line_inc: LineId,
    #[serde(default)]
    pub sector_inc: SectorId,
}

impl Default for MapDocument {
    /// A fresh, empty map, matching what the editor's "new map" action makes.
    fn default() -> Self {
        MapDocument {
            name: "New Map".to_string(),
            player_start: PlayerStart {
                x: 150.0,
                y: 60.0,
                angle: 0.0,
            },
            things: Vec::new(),
            vertices: BTreeMap::new(),
            lines: BTreeMap::new(),
            sectors: BTreeMap::new(),
            vertex_inc: 0,
            line_inc: 0,
            sector_inc: 0,
        }
    }
}

impl MapDocument {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Geometry mutation methods ---

    /// Adds a vertex, reusing an existing one at the exact same coordinates.
    /// Within one sector-drawing pass this guarantees shared corners resolve
    /// to a single vertex id.
    pub fn add_vertex(&mut self, x: f64, y: f64) -> VertexId {
        if let Some(id) = self.find_vertex_id(x, y) {
            return id;
        }
        let id = self.vertex_inc;
        self.vertex_inc += 1;
        self.vertices.insert(id, Point2::new(x, y));
        id
    }

    /// Exact-match vertex lookup. O(n), fine at editor map sizes.
    pub fn find_vertex_id(&self, x: f64, y: f64) -> Option<VertexId> {
        self.vertices
            .iter()
            .find(|(_, p)| p.matches(x, y))
            .map(|(id, _)| *id)
    }

    /// Moves a vertex and drops the cached polygon of every sector whose
    /// boundary touches it. Returns false for a missing id.
    pub fn move_vertex(&mut self, id: VertexId, x: f64, y: f64) -> bool {
        match self.vertices.get_mut(&id) {
            Some(p) => {
                p.x = x;
                p.y = y;
                self.invalidate_polygons_at(id);
                true
            }
            None => {
                warn!("move_vertex: no vertex {}", id);
                false
            }
        }
    }

    /// Removes a vertex. Lines still referencing it become dangling and are
    /// skipped by the derivation pipeline rather than treated as fatal.
    pub fn delete_vertex(&mut self, id: VertexId) -> Option<Point2> {
        let removed = self.vertices.remove(&id);
        if removed.is_some() {
            self.invalidate_polygons_at(id);
        }
        removed
    }

    /// Adds a one-sided line fronting the given sector. A second sector may
    /// later claim the same edge as its back side, making it a portal.
    ///
    /// A line with `start == end` is stored as given rather than rejected,
    /// matching the tolerance for dangling references elsewhere; it derives
    /// no usable wall and `is_zero_length` flags it. The sector drawing tool
    /// never produces one.
    pub fn add_line(&mut self, start: VertexId, end: VertexId, front_sector: SectorId) -> LineId {
        if start == end {
            warn!("add_line: degenerate line on vertex {}", start);
        }
        let id = self.line_inc;
        self.line_inc += 1;
        self.lines.insert(
            id,
            Line {
                id,
                start,
                end,
                front: Side::new(front_sector),
                back: None,
            },
        );
        id
    }

    /// Removes a line and unhooks it from any sector boundary listing it.
    pub fn delete_line(&mut self, id: LineId) -> Option<Line> {
        let removed = self.lines.remove(&id)?;
        for sector in self.sectors.values_mut() {
            if sector.lines.contains(&id) {
                sector.lines.retain(|l| *l != id);
                sector.poly = None;
            }
        }
        Some(removed)
    }

    /// Adds an empty sector with the given heights.
    pub fn add_sector(&mut self, floor: f64, ceiling: f64) -> SectorId {
        let id = self.sector_inc;
        self.sector_inc += 1;
        self.sectors.insert(id, Sector::new(id, floor, ceiling));
        id
    }

    /// Creates a sector from a closed loop of boundary points, the way the
    /// sector drawing tool commits an outline.
    ///
    /// Corner vertices are deduplicated through `add_vertex`. When an edge
    /// already exists between two corners (in either direction) the existing
    /// line is reused: a one-sided line fronting another sector gains this
    /// sector as its back side and becomes a portal. `sector.lines` ends up
    /// in loop order, which is the ordering contract the polygon builder
    /// relies on.
    ///
    /// Returns `None` for a degenerate outline (< 3 points).
    pub fn add_sector_with_boundary(
        &mut self,
        points: &[Point2],
        floor: f64,
        ceiling: f64,
    ) -> Option<SectorId> {
        if points.len() < 3 {
            warn!("sector outline has {} points, need at least 3", points.len());
            return None;
        }

        let sid = self.add_sector(floor, ceiling);
        let mut boundary = Vec::with_capacity(points.len());

        for i in 0..points.len() {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            if a == b {
                // Zero-length edge, contributes nothing.
                continue;
            }
            let v1 = self.add_vertex(a.x, a.y);
            let v2 = self.add_vertex(b.x, b.y);

            let existing = self.lines.values_mut().find(|l| l.connects(v1, v2));
            let lid = match existing {
                Some(line) if line.back.is_none() && line.front.sector != sid => {
                    debug!("line {} becomes a portal to sector {}", line.id, sid);
                    line.back = Some(Side::new(sid));
                    line.id
                }
                Some(line) => {
                    warn!("edge {}-{} already claimed by two sectors", v1, v2);
                    line.id
                }
                None => self.add_line(v1, v2, sid),
            };
            boundary.push(lid);
        }

        if let Some(sector) = self.sectors.get_mut(&sid) {
            sector.lines = boundary;
        }
        Some(sid)
    }

    /// Removes a sector together with every line that fronts or backs it,
    /// and those lines' endpoint vertices.
    ///
    /// Vertices are removed unconditionally, even when a surviving sector's
    /// boundary still references them. Historic editor behavior, kept on
    /// purpose; the removed pieces are returned so the caller can undo.
    pub fn delete_sector(&mut self, id: SectorId) -> Option<DeletedSector> {
        let sector = self.sectors.remove(&id)?;

        let line_ids: Vec<LineId> = self
            .lines
            .values()
            .filter(|l| l.touches_sector(id))
            .map(|l| l.id)
            .collect();

        let mut lines = Vec::with_capacity(line_ids.len());
        let mut vertices = Vec::new();
        for lid in line_ids {
            if let Some(line) = self.lines.remove(&lid) {
                for vid in [line.start, line.end] {
                    if let Some(p) = self.vertices.remove(&vid) {
                        vertices.push((vid, p));
                    }
                }
                lines.push(line);
            }
        }

        // Surviving sectors may have lost boundary pieces.
        self.invalidate_all_polygons();

        Some(DeletedSector {
            sector,
            lines,
            vertices,
        })
    }

    /// Puts back everything a `delete_sector` removed.
    pub fn restore_sector(&mut self, removed: DeletedSector) {
        for (vid, p) in removed.vertices {
            self.vertices.insert(vid, p);
        }
        for line in removed.lines {
            self.lines.insert(line.id, line);
        }
        self.sectors.insert(removed.sector.id, removed.sector);
        self.invalidate_all_polygons();
    }

    /// Adds a thing, returning its index in placement order.
    pub fn add_thing(&mut self, thing: Thing) -> usize {
        self.things.push(thing);
        self.things.len() - 1
    }

    pub fn delete_thing(&mut self, index: usize) -> Option<Thing> {
        if index < self.things.len() {
            Some(self.things.remove(index))
        } else {
            None
        }
    }

    /// Clears all geometry and placements, keeping name and player start.
    pub fn clear(&mut self) {
        self.things.clear();
        self.vertices.clear();
        self.lines.clear();
        self.sectors.clear();
        self.vertex_inc = 0;
        self.line_inc = 0;
        self.sector_inc = 0;
    }

    // --- Derived polygon cache ---

    /// The sector's derived boundary polygon, built on first access after
    /// any boundary edit. `None` for a missing sector id.
    pub fn sector_polygon(&mut self, id: SectorId) -> Option<&SectorPolygon> {
        if self.sectors.get(&id)?.poly.is_none() {
            let poly = polygon::build_sector_polygon(self, id)?;
            self.sectors.get_mut(&id)?.poly = Some(poly);
        }
        self.sectors.get(&id)?.poly.as_ref()
    }

    /// Drops every cached polygon. Cheap; they rebuild on demand.
    pub fn invalidate_all_polygons(&mut self) {
        for sector in self.sectors.values_mut() {
            sector.poly = None;
        }
    }

    /// Drops cached polygons of sectors whose boundary touches the vertex.
    fn invalidate_polygons_at(&mut self, vertex: VertexId) {
        let touched: Vec<SectorId> = self
            .sectors
            .values()
            .filter(|s| {
                s.lines.iter().any(|lid| {
                    self.lines
                        .get(lid)
                        .map_or(false, |l| l.touches_vertex(vertex))
                })
            })
            .map(|s| s.id)
            .collect();
        for id in touched {
            if let Some(sector) = self.sectors.get_mut(&id) {
                sector.poly = None;
            }
        }
    }

    // --- Checksum ---

    /// Checksum over all geometry, for cheap change detection (e.g. the 3D
    /// viewer deciding whether to rebuild its world geometry).
    pub fn checksum(&self) -> u32 {
        let vertices = self
            .vertices
            .par_iter()
            .map(|(id, p)| {
                let mut crc = 0u32;
                add_crc(&mut crc, *id);
                add_crc_f64(&mut crc, p.x);
                add_crc_f64(&mut crc, p.y);
                crc
            })
            .reduce(|| 0u32, u32::wrapping_add);

        let lines = self
            .lines
            .par_iter()
            .map(|(_, line)| {
                let mut crc = 0u32;
                checksum_line(&mut crc, line);
                crc
            })
            .reduce(|| 0u32, u32::wrapping_add);

        let sectors = self
            .sectors
            .par_iter()
            .map(|(_, sector)| {
                let mut crc = 0u32;
                checksum_sector(&mut crc, sector);
                crc
            })
            .reduce(|| 0u32, u32::wrapping_add);

        let things = self
            .things
            .par_iter()
            .map(|thing| {
                let mut crc = 0u32;
                add_crc_f64(&mut crc, thing.x);
                add_crc_f64(&mut crc, thing.y);
                for byte in thing.kind.as_bytes() {
                    add_crc(&mut crc, *byte as u32);
                }
                crc
            })
            .reduce(|| 0u32, u32::wrapping_add);

        vertices
            .wrapping_add(lines)
            .wrapping_add(sectors)
            .wrapping_add(things)
    }

    // --- Line/geometry helpers ---

    /// Length of a line, or `None` when an endpoint is missing.
    pub fn line_length(&self, line: &Line) -> Option<f64> {
        let start = self.vertices.get(&line.start)?;
        let end = self.vertices.get(&line.end)?;
        Some(start.distance_to(end))
    }

    /// True when both endpoints exist and coincide.
    pub fn is_zero_length(&self, line: &Line) -> bool {
        matches!(
            (self.vertices.get(&line.start), self.vertices.get(&line.end)),
            (Some(a), Some(b)) if a == b
        )
    }

    // --- Persistence ---

    pub fn from_json_str(text: &str) -> Result<Self, DocumentError> {
        let mut doc: MapDocument = serde_json::from_str(text)?;
        doc.sync_counters();
        debug!(
            "loaded map '{}': {} vertices, {} lines, {} sectors, {} things",
            doc.name,
            doc.vertices.len(),
            doc.lines.len(),
            doc.sectors.len(),
            doc.things.len()
        );
        Ok(doc)
    }

    pub fn to_json_string(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load<R: Read>(mut reader: R) -> Result<Self, DocumentError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::from_json_str(&text)
    }

    pub fn save<W: Write>(&self, writer: W) -> Result<(), DocumentError> {
        Ok(serde_json::to_writer_pretty(writer, self)?)
    }

    /// Documents written by older editor revisions may lack the id counters;
    /// push them past the highest id actually present.
    fn sync_counters(&mut self) {
        fn next(max: Option<u32>) -> u32 {
            max.map_or(0, |m| m + 1)
        }
        self.vertex_inc = self
            .vertex_inc
            .max(next(self.vertices.keys().next_back().copied()));
        self.line_inc = self
            .line_inc
            .max(next(self.lines.keys().next_back().copied()));
        self.sector_inc = self
            .sector_inc
            .max(next(self.sectors.keys().next_back().copied()));
    }
}

// --- Checksum helper functions ---

fn add_crc(crc: &mut u32, value: u32) {
    *crc = crc.wrapping_add(value);
}

fn add_crc_f64(crc: &mut u32, value: f64) {
    let bits = value.to_bits();
    *crc = crc
        .wrapping_add(bits as u32)
        .wrapping_add((bits >> 32) as u32);
}

fn checksum_line(crc: &mut u32, line: &Line) {
    add_crc(crc, line.id);
    add_crc(crc, line.start);
    add_crc(crc, line.end);
    add_crc(crc, line.front.sector);
    if let Some(back) = &line.back {
        add_crc(crc, back.sector);
    }
}

fn checksum_sector(crc: &mut u32, sector: &Sector) {
    add_crc(crc, sector.id);
    add_crc_f64(crc, sector.floor);
    add_crc_f64(crc, sector.ceiling);
    for lid in &sector.lines {
        add_crc(crc, *lid);
    }
    for h in &sector.holes {
        add_crc(crc, *h as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> Vec<Point2> {
        vec![
            Point2::new(x0, y0),
            Point2::new(x0 + size, y0),
            Point2::new(x0 + size, y0 + size),
            Point2::new(x0, y0 + size),
        ]
    }

    #[test]
    fn test_empty_document() {
        let doc = MapDocument::new();
        assert!(doc.vertices.is_empty());
        assert!(doc.lines.is_empty());
        assert!(doc.sectors.is_empty());
        assert!(doc.things.is_empty());
    }

    #[test]
    fn test_add_vertex_dedups_exact_coordinates() {
        let mut doc = MapDocument::new();
        let a = doc.add_vertex(10.0, 20.0);
        let b = doc.add_vertex(10.0, 20.0);
        let c = doc.add_vertex(10.0, 21.0);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(doc.vertices.len(), 2);
    }

    #[test]
    fn test_find_vertex_id() {
        let mut doc = MapDocument::new();
        let id = doc.add_vertex(5.0, 5.0);
        assert_eq!(doc.find_vertex_id(5.0, 5.0), Some(id));
        assert_eq!(doc.find_vertex_id(5.0, 6.0), None);
    }

    #[test]
    fn test_add_line_is_one_sided() {
        let mut doc = MapDocument::new();
        let v1 = doc.add_vertex(0.0, 0.0);
        let v2 = doc.add_vertex(10.0, 0.0);
        let sid = doc.add_sector(0.0, 10.0);
        let lid = doc.add_line(v1, v2, sid);
        let line = &doc.lines[&lid];
        assert_eq!(line.front.sector, sid);
        assert!(line.back.is_none());
    }

    #[test]
    fn test_degenerate_line_is_kept_but_flagged() {
        let mut doc = MapDocument::new();
        let v = doc.add_vertex(0.0, 0.0);
        let sid = doc.add_sector(0.0, 10.0);
        let lid = doc.add_line(v, v, sid);
        assert!(doc.lines.contains_key(&lid));
        assert!(doc.is_zero_length(&doc.lines[&lid]));
    }

    #[test]
    fn test_sector_boundary_in_loop_order() {
        let mut doc = MapDocument::new();
        let sid = doc
            .add_sector_with_boundary(&square(0.0, 0.0, 10.0), 0.0, 10.0)
            .unwrap();
        let sector = &doc.sectors[&sid];
        assert_eq!(sector.lines.len(), 4);
        assert_eq!(doc.vertices.len(), 4);
        // Consecutive boundary lines chain end-to-start.
        for pair in sector.lines.windows(2) {
            let a = &doc.lines[&pair[0]];
            let b = &doc.lines[&pair[1]];
            assert_eq!(a.end, b.start);
        }
    }

    #[test]
    fn test_degenerate_outline_rejected() {
        let mut doc = MapDocument::new();
        let points = vec![Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)];
        assert!(doc.add_sector_with_boundary(&points, 0.0, 10.0).is_none());
    }

    #[test]
    fn test_shared_edge_becomes_portal() {
        let mut doc = MapDocument::new();
        let a = doc
            .add_sector_with_boundary(&square(0.0, 0.0, 10.0), 0.0, 10.0)
            .unwrap();
        let b = doc
            .add_sector_with_boundary(&square(10.0, 0.0, 10.0), 0.0, 10.0)
            .unwrap();

        let portals: Vec<&Line> = doc.lines.values().filter(|l| l.is_portal()).collect();
        assert_eq!(portals.len(), 1);
        let portal = portals[0];
        assert_eq!(portal.front.sector, a);
        assert_eq!(portal.back.as_ref().unwrap().sector, b);
        // 7 lines, not 8: the shared edge was reused.
        assert_eq!(doc.lines.len(), 7);
        // 6 vertices, not 8: the shared corners were deduplicated.
        assert_eq!(doc.vertices.len(), 6);
    }

    #[test]
    fn test_delete_sector_removes_lines_and_vertices() {
        let mut doc = MapDocument::new();
        let sid = doc
            .add_sector_with_boundary(&square(0.0, 0.0, 10.0), 0.0, 10.0)
            .unwrap();
        let removed = doc.delete_sector(sid).unwrap();
        assert!(doc.sectors.is_empty());
        assert!(doc.lines.is_empty());
        assert!(doc.vertices.is_empty());
        assert_eq!(removed.lines.len(), 4);
        assert_eq!(removed.vertices.len(), 4);
    }

    #[test]
    fn test_delete_missing_sector_is_noop() {
        let mut doc = MapDocument::new();
        assert!(doc.delete_sector(42).is_none());
    }

    #[test]
    fn test_restore_sector_roundtrip() {
        let mut doc = MapDocument::new();
        let sid = doc
            .add_sector_with_boundary(&square(0.0, 0.0, 10.0), 0.0, 10.0)
            .unwrap();
        let before = doc.checksum();
        let removed = doc.delete_sector(sid).unwrap();
        doc.restore_sector(removed);
        assert_eq!(doc.checksum(), before);
    }

    #[test]
    fn test_move_vertex_invalidates_polygon() {
        let mut doc = MapDocument::new();
        let sid = doc
            .add_sector_with_boundary(&square(0.0, 0.0, 10.0), 0.0, 10.0)
            .unwrap();
        assert!(doc.sector_polygon(sid).is_some());
        assert!(doc.sectors[&sid].poly.is_some());

        let vid = doc.find_vertex_id(10.0, 10.0).unwrap();
        assert!(doc.move_vertex(vid, 12.0, 12.0));
        assert!(doc.sectors[&sid].poly.is_none());

        let poly = doc.sector_polygon(sid).unwrap();
        assert!(poly.points.contains(&12.0));
    }

    #[test]
    fn test_checksum_tracks_edits() {
        let mut doc = MapDocument::new();
        let before = doc.checksum();
        doc.add_vertex(1.0, 2.0);
        assert_ne!(doc.checksum(), before);

        // Hole rings change the derived polygon, so they must show up too.
        let sid = doc
            .add_sector_with_boundary(&square(0.0, 0.0, 10.0), 0.0, 10.0)
            .unwrap();
        let with_sector = doc.checksum();
        doc.sectors.get_mut(&sid).unwrap().holes = vec![4];
        assert_ne!(doc.checksum(), with_sector);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut doc = MapDocument::new();
        doc.name = "Test Map".into();
        doc.add_sector_with_boundary(&square(0.0, 0.0, 10.0), 0.0, 10.0)
            .unwrap();
        doc.add_thing(Thing::new("barrel", 5.0, 5.0));

        let json = doc.to_json_string().unwrap();
        let mut back = MapDocument::from_json_str(&json).unwrap();
        assert_eq!(back.name, doc.name);
        assert_eq!(back.vertices, doc.vertices);
        assert_eq!(back.lines, doc.lines);
        assert_eq!(back.things, doc.things);
        // Counters survive so future ids never collide.
        assert_eq!(back.vertex_inc, doc.vertex_inc);
        // Derived geometry rebuilds identically.
        let poly = back.sector_polygon(0).unwrap().clone();
        assert_eq!(doc.sector_polygon(0), Some(&poly));
    }

    #[test]
    fn test_loads_legacy_array_vertices() {
        let json = r#"{
            "name": "Legacy",
            "playerStart": { "x": 5, "y": 5, "angle": 0 },
            "vertices": { "0": [0, 0], "1": [10, 0], "2": {"x": 10, "y": 10} },
            "lines": {},
            "sectors": {},
            "things": []
        }"#;
        let doc = MapDocument::from_json_str(json).unwrap();
        assert_eq!(doc.vertices[&0], Point2::new(0.0, 0.0));
        assert_eq!(doc.vertices[&2], Point2::new(10.0, 10.0));
        // Counters were missing; they must clear the highest loaded id.
        assert_eq!(doc.vertex_inc, 3);
    }

    #[test]
    fn test_delete_line_unhooks_sector_boundary() {
        let mut doc = MapDocument::new();
        let sid = doc
            .add_sector_with_boundary(&square(0.0, 0.0, 10.0), 0.0, 10.0)
            .unwrap();
        let lid = doc.sectors[&sid].lines[0];
        assert!(doc.delete_line(lid).is_some());
        assert_eq!(doc.sectors[&sid].lines.len(), 3);
        assert!(doc.sectors[&sid].poly.is_none());
    }
}
