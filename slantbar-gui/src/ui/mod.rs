//! # UI Module
//!
//! This module contains the layout components for the Slantbar voicing finder.

pub mod main_display;
