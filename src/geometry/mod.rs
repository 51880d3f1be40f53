// src/geometry/mod.rs

pub mod locate;
pub mod polygon;
pub mod triangulate;
pub mod walls;

pub use locate::{point_in_polygon, SectorLocator};
pub use polygon::build_sector_polygon;
pub use triangulate::{build_flat, triangulate, triangulate_facing, Facing, FlatMesh, TEX_SCALE};
pub use walls::{build_wall, wall_bands, wall_segments, BandKind, WallBand, WallQuad, WallSegment};
