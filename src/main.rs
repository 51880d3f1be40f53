//! # Maproom Map Check
//!
//! Headless front end for the map pipeline: loads a serialized map document,
//! derives every sector's boundary polygon, triangulates floors, classifies
//! wall bands and locates the player start. Useful for validating maps
//! outside the editor and for smoke-testing the derivation pipeline.
//!
//! ## License
//! Licensed under the MIT License.

use std::error::Error;
use std::fs::File;

use log::info;

use maproom::document::MapDocument;
use maproom::geometry::locate::SectorLocator;
use maproom::geometry::{triangulate, walls};

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging.
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: maproom <map.json>")?;
    info!("loading map document {}", path);
    let mut doc = MapDocument::load(File::open(&path)?)?;

    println!(
        "Map '{}': {} vertices, {} lines, {} sectors, {} things",
        doc.name,
        doc.vertices.len(),
        doc.lines.len(),
        doc.sectors.len(),
        doc.things.len()
    );

    let sector_ids: Vec<_> = doc.sectors.keys().copied().collect();
    for id in sector_ids {
        match doc.sector_polygon(id) {
            Some(poly) => {
                let triangles = triangulate::triangulate(poly).len() / 3;
                println!(
                    "  sector {}: {} boundary points, {} hole(s), {} triangles",
                    id,
                    poly.point_count(),
                    poly.holes.len(),
                    triangles
                );
            }
            None => println!("  sector {}: no polygon", id),
        }
    }

    let line_ids: Vec<_> = doc.lines.keys().copied().collect();
    let bands: usize = line_ids
        .iter()
        .map(|lid| walls::wall_segments(&doc, *lid).len())
        .sum();
    println!("  {} wall bands across {} lines", bands, line_ids.len());

    let start = doc.player_start;
    let mut locator = SectorLocator::new();
    match locator.update(&mut doc, start.x, start.y) {
        Some(sector) => println!(
            "  player start ({}, {}) is in sector {}",
            start.x, start.y, sector
        ),
        None => println!(
            "  player start ({}, {}) is outside every sector",
            start.x, start.y
        ),
    }

    println!("  geometry checksum {:08x}", doc.checksum());
    Ok(())
}
