// src/map/point.rs

use serde::{Deserialize, Serialize};

/// Canonical 2D point, in map/world units.
///
/// Older map documents stored vertices as `[x, y]` pairs, newer ones as
/// `{x, y}` objects. Both decode here; only the named form is written back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PointRepr")]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Exact coordinate match. Editor coordinates are grid-snapped, so exact
    /// equality is the intended comparison for vertex identity.
    pub fn matches(&self, tx: f64, ty: f64) -> bool {
        self.x == tx && self.y == ty
    }

    pub fn distance_to(&self, other: &Point2) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// The two vertex encodings found in existing documents.
#[derive(Deserialize)]
#[serde(untagged)]
enum PointRepr {
    Pair([f64; 2]),
    Named { x: f64, y: f64 },
}

impl From<PointRepr> for Point2 {
    fn from(repr: PointRepr) -> Self {
        match repr {
            PointRepr::Pair([x, y]) => Point2 { x, y },
            PointRepr::Named { x, y } => Point2 { x, y },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_pair_form() {
        let p: Point2 = serde_json::from_str("[3.0, 4.5]").unwrap();
        assert_eq!(p, Point2::new(3.0, 4.5));
    }

    #[test]
    fn test_decodes_named_form() {
        let p: Point2 = serde_json::from_str(r#"{"x": 3.0, "y": 4.5}"#).unwrap();
        assert_eq!(p, Point2::new(3.0, 4.5));
    }

    #[test]
    fn test_encodes_named_form_only() {
        let json = serde_json::to_string(&Point2::new(1.0, 2.0)).unwrap();
        assert_eq!(json, r#"{"x":1.0,"y":2.0}"#);
    }

    #[test]
    fn test_distance() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(3.0, 4.0);
        assert_eq!(a.distance_to(&b), 5.0);
    }
}
