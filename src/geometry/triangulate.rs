// src/geometry/triangulate.rs

use log::warn;

use crate::map::SectorPolygon;

/// Texture coordinates repeat every this many map units on flats and walls.
pub const TEX_SCALE: f64 = 10.0;

/// Vertical orientation of a flat surface. Floors face up, ceilings down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Up,
    Down,
}

/// A triangulated horizontal surface, ready for a renderer to upload.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatMesh {
    pub positions: Vec<[f64; 3]>,
    pub texcoords: Vec<[f64; 2]>,
    pub normal: [f64; 3],
    pub indices: Vec<usize>,
}

/// Ear-clipping triangulation of a sector polygon (outer ring plus hole
/// rings). Returns vertex-index triples into the polygon's point list.
///
/// Degenerate polygons (< 3 points) and triangulation failures yield an
/// empty index list rather than an error; a broken sector simply renders
/// nothing.
pub fn triangulate(poly: &SectorPolygon) -> Vec<usize> {
    if poly.point_count() < 3 {
        return Vec::new();
    }
    match earcutr::earcut(&poly.points, &poly.holes, 2) {
        Ok(indices) => indices,
        Err(err) => {
            warn!("triangulation failed: {:?}", err);
            Vec::new()
        }
    }
}

/// Triangulation with winding fixed up for the surface orientation: upward
/// faces (floors) reverse the triangle order so their normals point up,
/// downward faces (ceilings) use the ear-clipper's output as-is.
pub fn triangulate_facing(poly: &SectorPolygon, facing: Facing) -> Vec<usize> {
    let mut indices = triangulate(poly);
    if facing == Facing::Up {
        indices.reverse();
    }
    indices
}

/// Builds the mesh for a sector's floor or ceiling at the given height.
/// Texture coordinates are planar, anchored at the polygon's minimum corner
/// and scaled by `TEX_SCALE`.
pub fn build_flat(poly: &SectorPolygon, height: f64, facing: Facing) -> FlatMesh {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    for chunk in poly.points.chunks(2) {
        min_x = min_x.min(chunk[0]);
        min_y = min_y.min(chunk[1]);
    }

    let mut positions = Vec::with_capacity(poly.point_count());
    let mut texcoords = Vec::with_capacity(poly.point_count());
    for chunk in poly.points.chunks(2) {
        positions.push([chunk[0], height, chunk[1]]);
        texcoords.push([(chunk[0] - min_x) / TEX_SCALE, (chunk[1] - min_y) / TEX_SCALE]);
    }

    let normal_y = if facing == Facing::Up { 1.0 } else { -1.0 };

    FlatMesh {
        positions,
        texcoords,
        normal: [0.0, normal_y, 0.0],
        indices: triangulate_facing(poly, facing),
    }
}
