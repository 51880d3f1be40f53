// src/document/mod.rs

pub mod document;

pub use document::{DeletedSector, DocumentError, MapDocument, DEFAULT_CEILING, DEFAULT_FLOOR};
