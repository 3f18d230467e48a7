// slantbar-core/src/lib.rs

//! The core logic for the bar-voicing finder.
//! This crate handles pitch-class arithmetic, fretboard geometry and
//! position resolution, harmonic scoring/selection, and chord substitution.
//! It is completely headless and contains no GUI code.

pub mod audio;
pub mod chords;
pub mod dyads;
pub mod fretboard;
pub mod guide_tones;
pub mod instrument;
pub mod pitch;
pub mod substitutions;

/// Everything a single voicing query produces for display.
#[derive(Debug, Clone)]
pub struct VoicingResult {
    /// The chord as parsed, with canonical spellings.
    pub chord: chords::Chord,
    /// Dyads in display order, already through selection when the caller
    /// asked for it.
    pub dyads: Vec<dyads::Dyad>,
}
