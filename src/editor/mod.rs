// src/editor/mod.rs

pub mod commands;
pub mod session;

pub use commands::{Command, CommandType};
pub use session::{EditSession, Mode};
