// src/geometry/locate.rs

use crate::document::MapDocument;
use crate::map::SectorId;

/// Ray-crossing parity test over a flat `[x0,y0, x1,y1, ...]` coordinate
/// slice, between the `start` and `end` float offsets.
pub fn point_in_polygon(x: f64, y: f64, points: &[f64], start: usize, end: usize) -> bool {
    let len = (end - start) / 2;
    if len == 0 {
        return false;
    }
    let mut inside = false;
    let mut j = len - 1;
    for i in 0..len {
        let xi = points[start + i * 2];
        let yi = points[start + i * 2 + 1];
        let xj = points[start + j * 2];
        let yj = points[start + j * 2 + 1];
        if ((yi > y) != (yj > y)) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Tracks which sector a continuously updated 2D position is in, typically
/// the player/camera projected onto the horizontal plane, queried once per
/// simulation step.
///
/// Sectors are scanned in document storage order and the first containing
/// polygon wins; maps are authored non-overlapping so no tie-break exists.
/// When the point is outside every polygon the previous assignment is kept,
/// so downstream floor-height reads degrade gracefully instead of snapping
/// to nothing.
///
/// Brute force over all sectors, linear in total edge count.
/// TODO: a uniform grid over sector bounding boxes would cut this down if
/// maps ever grow past a few hundred sectors.
#[derive(Debug, Clone, Default)]
pub struct SectorLocator {
    pub sector: Option<SectorId>,
}

impl SectorLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-locates the point, returning the current sector assignment.
    /// Needs `&mut` on the document to (re)build cached polygons on demand.
    pub fn update(&mut self, doc: &mut MapDocument, x: f64, y: f64) -> Option<SectorId> {
        let ids: Vec<SectorId> = doc.sectors.keys().copied().collect();
        for id in ids {
            if let Some(poly) = doc.sector_polygon(id) {
                let outer = poly.outer_end();
                if point_in_polygon(x, y, &poly.points, 0, outer) {
                    self.sector = Some(id);
                    break;
                }
            }
        }
        self.sector
    }

    /// Floor height of the current sector, for vertical placement.
    pub fn floor_height(&self, doc: &MapDocument) -> Option<f64> {
        doc.sectors.get(&self.sector?).map(|s| s.floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Point2;

    fn square(x0: f64, y0: f64, size: f64) -> Vec<Point2> {
        vec![
            Point2::new(x0, y0),
            Point2::new(x0 + size, y0),
            Point2::new(x0 + size, y0 + size),
            Point2::new(x0, y0 + size),
        ]
    }

    fn two_room_map() -> (MapDocument, SectorId, SectorId) {
        let mut doc = MapDocument::new();
        let a = doc
            .add_sector_with_boundary(&square(0.0, 0.0, 10.0), 0.0, 10.0)
            .unwrap();
        let b = doc
            .add_sector_with_boundary(&square(10.0, 0.0, 10.0), 2.0, 12.0)
            .unwrap();
        (doc, a, b)
    }

    #[test]
    fn test_point_in_square() {
        let points = vec![0.0, 0.0, 10.0, 0.0, 10.0, 10.0, 0.0, 10.0];
        assert!(point_in_polygon(5.0, 5.0, &points, 0, points.len()));
        assert!(!point_in_polygon(50.0, 50.0, &points, 0, points.len()));
        assert!(!point_in_polygon(-1.0, 5.0, &points, 0, points.len()));
    }

    #[test]
    fn test_empty_polygon_contains_nothing() {
        assert!(!point_in_polygon(0.0, 0.0, &[], 0, 0));
    }

    #[test]
    fn test_locates_adjacent_sectors() {
        let (mut doc, a, b) = two_room_map();
        let mut locator = SectorLocator::new();
        assert_eq!(locator.update(&mut doc, 5.0, 5.0), Some(a));
        assert_eq!(locator.update(&mut doc, 15.0, 5.0), Some(b));
    }

    #[test]
    fn test_outside_retains_previous_sector() {
        let (mut doc, a, _) = two_room_map();
        let mut locator = SectorLocator::new();
        assert_eq!(locator.update(&mut doc, 5.0, 5.0), Some(a));
        // Through a gap and outside every polygon: assignment sticks.
        assert_eq!(locator.update(&mut doc, 50.0, 50.0), Some(a));
        assert_eq!(locator.floor_height(&doc), Some(0.0));
    }

    #[test]
    fn test_boundary_point_claimed_by_at_most_one() {
        let (mut doc, a, b) = two_room_map();
        // On the shared edge x=10 the parity rule accepts at most one side,
        // and repeated queries agree.
        let in_a = {
            let poly = doc.sector_polygon(a).unwrap();
            point_in_polygon(10.0, 5.0, &poly.points, 0, poly.outer_end())
        };
        let in_b = {
            let poly = doc.sector_polygon(b).unwrap();
            point_in_polygon(10.0, 5.0, &poly.points, 0, poly.outer_end())
        };
        assert!(!(in_a && in_b));
        let mut locator = SectorLocator::new();
        let first = locator.update(&mut doc, 10.0, 5.0);
        let second = locator.update(&mut doc, 10.0, 5.0);
        assert_eq!(first, second);
    }

    #[test]
    fn test_locates_despite_bad_hole_index() {
        // A persisted document may carry a hole ring index past the end of
        // the boundary; locating a point in that sector must still work.
        let (mut doc, a, _) = two_room_map();
        doc.sectors.get_mut(&a).unwrap().holes = vec![10];
        let json = doc.to_json_string().unwrap();
        let mut doc = MapDocument::from_json_str(&json).unwrap();

        let mut locator = SectorLocator::new();
        assert_eq!(locator.update(&mut doc, 5.0, 5.0), Some(a));
    }

    #[test]
    fn test_floor_height_follows_sector() {
        let (mut doc, _, _) = two_room_map();
        let mut locator = SectorLocator::new();
        locator.update(&mut doc, 15.0, 5.0);
        assert_eq!(locator.floor_height(&doc), Some(2.0));
    }

    #[test]
    fn test_no_sector_yet() {
        let mut doc = MapDocument::new();
        let mut locator = SectorLocator::new();
        assert_eq!(locator.update(&mut doc, 0.0, 0.0), None);
        assert_eq!(locator.floor_height(&doc), None);
    }
}
