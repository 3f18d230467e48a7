//! # Widgets Module
//!
//! Canvas widgets for the voicing finder.

pub mod dyad_list;
pub mod fretboard;
