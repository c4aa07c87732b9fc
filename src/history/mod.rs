// src/history/mod.rs

pub mod cursor;

pub use cursor::{CursorStore, FileCursorStore, Progress};
