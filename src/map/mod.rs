// src/map/mod.rs

pub mod line;
pub mod point;
pub mod sector;
pub mod thing;

pub use line::{Line, Side};
pub use point::Point2;
pub use sector::{Sector, SectorPolygon};
pub use thing::{PlayerStart, Thing};

/// Integer ids, unique per object kind within one map document.
pub type VertexId = u32;
pub type LineId = u32;
pub type SectorId = u32;
