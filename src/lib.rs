// src/lib.rs

pub mod document;
pub mod editor;
pub mod geometry;
pub mod map;
