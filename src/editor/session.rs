// src/editor/session.rs

use log::info;

use crate::document::{MapDocument, DEFAULT_CEILING, DEFAULT_FLOOR};
use crate::editor::commands::{Command, CommandType};
use crate::map::Point2;

const MIN_GRID: f64 = 4.0;
const MAX_GRID: f64 = 128.0;

/// Editing modes, mirroring the tools of the 2D map view.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Mode {
    DrawSector,
    Move,
    Delete,
    PlaceThing,
    PlayerStart,
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::DrawSector => "Draw Sector",
            Mode::Move => "Move",
            Mode::Delete => "Delete",
            Mode::PlaceThing => "Place Thing",
            Mode::PlayerStart => "Player Start",
        }
    }
}

/// The single editing context: owns the document, the active tool mode, the
/// grid, the in-progress sector outline and the undo/redo stacks. One
/// session per open map; there is no shared or global editor state.
pub struct EditSession {
    doc: MapDocument,
    mode: Mode,
    grid_size: f64,
    outline: Vec<Point2>,
    history: Vec<CommandType>,
    redo_stack: Vec<CommandType>,

    /// Messages or status for the UI layer.
    pub status_message: String,
    pub error_message: Option<String>,
}

impl EditSession {
    pub fn new(doc: MapDocument) -> Self {
        Self {
            doc,
            mode: Mode::DrawSector,
            grid_size: 8.0,
            outline: Vec::new(),
            history: Vec::new(),
            redo_stack: Vec::new(),
            status_message: String::new(),
            error_message: None,
        }
    }

    pub fn document(&self) -> &MapDocument {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut MapDocument {
        &mut self.doc
    }

    /// Replace the document with a fresh map, discarding history.
    pub fn new_document(&mut self) {
        self.doc = MapDocument::new();
        self.history.clear();
        self.redo_stack.clear();
        self.outline.clear();
        self.status_message = "Created new map.".to_string();
        self.error_message = None;
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.status_message = format!("Selected tool: {}", mode.name());
    }

    // --- Grid ---

    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    pub fn grow_grid(&mut self) {
        self.grid_size = (self.grid_size * 2.0).min(MAX_GRID);
    }

    pub fn shrink_grid(&mut self) {
        self.grid_size = (self.grid_size / 2.0).max(MIN_GRID);
    }

    /// Snap a cursor position down onto the grid.
    pub fn snap(&self, x: f64, y: f64) -> Point2 {
        Point2::new(
            (x / self.grid_size).floor() * self.grid_size,
            (y / self.grid_size).floor() * self.grid_size,
        )
    }

    // --- Command execution ---

    /// Execute a command, record it for undo, and surface any error.
    pub fn execute(&mut self, mut command: CommandType) {
        match command.execute(&mut self.doc) {
            Ok(_) => {
                self.history.push(command);
                self.redo_stack.clear();
                self.error_message = None;
            }
            Err(err) => {
                self.error_message = Some(format!("Error executing command: {}", err));
            }
        }
    }

    pub fn undo(&mut self) {
        if let Some(mut command) = self.history.pop() {
            if let Err(err) = command.unexecute(&mut self.doc) {
                self.error_message = Some(format!("Error undoing command: {}", err));
            } else {
                self.redo_stack.push(command);
            }
        }
    }

    pub fn redo(&mut self) {
        if let Some(mut command) = self.redo_stack.pop() {
            if let Err(err) = command.execute(&mut self.doc) {
                self.error_message = Some(format!("Error redoing command: {}", err));
            } else {
                self.history.push(command);
            }
        }
    }

    // --- Sector drawing tool ---

    /// Add a clicked point to the in-progress sector outline. Clicking the
    /// first point again closes the loop and commits the sector with default
    /// heights. Returns true when a sector was committed.
    pub fn outline_point(&mut self, x: f64, y: f64) -> bool {
        let p = self.snap(x, y);

        if self.outline.len() >= 3 && self.outline.first() == Some(&p) {
            let points = std::mem::take(&mut self.outline);
            self.execute(CommandType::DrawSector {
                points,
                floor: DEFAULT_FLOOR,
                ceiling: DEFAULT_CEILING,
                sector_id: None,
            });
            info!("committed sector outline");
            return true;
        }

        self.outline.push(p);
        false
    }

    /// The outline drawn so far, for preview rendering.
    pub fn outline(&self) -> &[Point2] {
        &self.outline
    }

    /// Abandon the in-progress outline, e.g. on right click or Escape.
    pub fn cancel_outline(&mut self) {
        self.outline.clear();
        info!("Canceled sector outline.");
    }
}
