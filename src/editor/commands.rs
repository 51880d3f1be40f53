// src/editor/commands.rs

use crate::document::{DeletedSector, MapDocument};
use crate::map::{PlayerStart, Point2, SectorId, Thing, VertexId};

/// An undoable edit against the map document.
pub trait Command {
    fn execute(&mut self, doc: &mut MapDocument) -> Result<(), String>;
    fn unexecute(&mut self, doc: &mut MapDocument) -> Result<(), String>;
}

/// The editor's mutation vocabulary. Variants carry both their inputs and
/// whatever state `execute` captured for a later `unexecute`.
#[derive(Clone, Debug)]
pub enum CommandType {
    AddVertex {
        x: f64,
        y: f64,
        vertex_id: Option<VertexId>,
        created: bool,
    },
    MoveVertex {
        vertex_id: VertexId,
        x: f64,
        y: f64,
        prev: Option<Point2>,
    },
    DrawSector {
        points: Vec<Point2>,
        floor: f64,
        ceiling: f64,
        sector_id: Option<SectorId>,
    },
    DeleteSector {
        sector_id: SectorId,
        removed: Option<DeletedSector>,
    },
    AddThing {
        thing: Thing,
        index: Option<usize>,
    },
    DeleteThing {
        index: usize,
        thing: Option<Thing>,
    },
    SetPlayerStart {
        start: PlayerStart,
        prev: Option<PlayerStart>,
    },
    Batch {
        commands: Vec<CommandType>,
    },
}

impl Command for CommandType {
    fn execute(&mut self, doc: &mut MapDocument) -> Result<(), String> {
        match self {
            CommandType::Batch { commands } => {
                for command in commands.iter_mut() {
                    command.execute(doc)?;
                }
                Ok(())
            }
            CommandType::AddVertex {
                x,
                y,
                vertex_id,
                created,
            } => {
                // Deduplication may hand back an existing vertex; only a
                // genuinely new one is removed again on undo.
                *created = doc.find_vertex_id(*x, *y).is_none();
                *vertex_id = Some(doc.add_vertex(*x, *y));
                Ok(())
            }
            CommandType::MoveVertex {
                vertex_id,
                x,
                y,
                prev,
            } => {
                *prev = doc.vertices.get(vertex_id).copied();
                if doc.move_vertex(*vertex_id, *x, *y) {
                    Ok(())
                } else {
                    Err(format!("Vertex {} not found", vertex_id))
                }
            }
            CommandType::DrawSector {
                points,
                floor,
                ceiling,
                sector_id,
            } => {
                match doc.add_sector_with_boundary(points, *floor, *ceiling) {
                    Some(id) => {
                        *sector_id = Some(id);
                        Ok(())
                    }
                    None => Err("Sector outline is degenerate".to_string()),
                }
            }
            CommandType::DeleteSector { sector_id, removed } => {
                match doc.delete_sector(*sector_id) {
                    Some(pieces) => {
                        *removed = Some(pieces);
                        Ok(())
                    }
                    None => Err(format!("Sector {} not found", sector_id)),
                }
            }
            CommandType::AddThing { thing, index } => {
                *index = Some(doc.add_thing(thing.clone()));
                Ok(())
            }
            CommandType::DeleteThing { index, thing } => match doc.delete_thing(*index) {
                Some(removed) => {
                    *thing = Some(removed);
                    Ok(())
                }
                None => Err(format!("Thing {} not found", index)),
            },
            CommandType::SetPlayerStart { start, prev } => {
                *prev = Some(doc.player_start);
                doc.player_start = *start;
                Ok(())
            }
        }
    }

    fn unexecute(&mut self, doc: &mut MapDocument) -> Result<(), String> {
        match self {
            CommandType::Batch { commands } => {
                for command in commands.iter_mut().rev() {
                    command.unexecute(doc)?;
                }
                Ok(())
            }
            CommandType::AddVertex {
                vertex_id, created, ..
            } => {
                if *created {
                    let id = vertex_id.ok_or("AddVertex was never executed")?;
                    doc.delete_vertex(id);
                }
                Ok(())
            }
            CommandType::MoveVertex {
                vertex_id, prev, ..
            } => {
                let p = prev.ok_or("MoveVertex was never executed")?;
                if doc.move_vertex(*vertex_id, p.x, p.y) {
                    Ok(())
                } else {
                    Err(format!("Vertex {} not found", vertex_id))
                }
            }
            CommandType::DrawSector { sector_id, .. } => {
                let id = sector_id.ok_or("DrawSector was never executed")?;
                doc.delete_sector(id)
                    .map(|_| ())
                    .ok_or(format!("Sector {} not found", id))
            }
            CommandType::DeleteSector { removed, .. } => {
                let pieces = removed.take().ok_or("DeleteSector was never executed")?;
                doc.restore_sector(pieces);
                Ok(())
            }
            CommandType::AddThing { index, .. } => {
                let i = index.ok_or("AddThing was never executed")?;
                doc.delete_thing(i)
                    .map(|_| ())
                    .ok_or(format!("Thing {} not found", i))
            }
            CommandType::DeleteThing { index, thing } => {
                let removed = thing.take().ok_or("DeleteThing was never executed")?;
                doc.things.insert((*index).min(doc.things.len()), removed);
                Ok(())
            }
            CommandType::SetPlayerStart { prev, .. } => {
                doc.player_start = prev.ok_or("SetPlayerStart was never executed")?;
                Ok(())
            }
        }
    }
}
