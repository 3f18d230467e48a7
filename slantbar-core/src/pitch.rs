//! # Pitch Model
//!
//! Pitch-class arithmetic for the voicing finder. Everything past the parse
//! boundary works in terms of the twelve equal-tempered pitch classes;
//! octaves are deliberately absent from this layer and get reattached only by
//! consumers that need them (display, tone playback).
//!
//! ## Features
//! - Canonical sharp spellings ("C#", never "Db"), with flat and enharmonic
//!   aliases accepted on input
//! - Semitone arithmetic that stays correct for negative offsets
//! - Directional intervals, always measured from the first note upward mod 12
//! - Short interval labels ("m3", "P5", "TT") for display

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a note name cannot be normalized to a pitch class.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid pitch name: {input:?}")]
pub struct InvalidPitchError {
    /// The rejected input, exactly as given.
    pub input: String,
}

/// One of the twelve equal-tempered pitch classes.
///
/// Variants are declared chromatically from C, so the discriminant matches
/// the usual semitone numbering (C = 0 through B = 11). Display names use
/// sharps; flat spellings exist only as input aliases and normalize away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PitchClass {
    C,
    Cs,
    D,
    Ds,
    E,
    F,
    Fs,
    G,
    Gs,
    A,
    As,
    B,
}

impl PitchClass {
    /// All twelve pitch classes in chromatic order.
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::Cs,
        PitchClass::D,
        PitchClass::Ds,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Fs,
        PitchClass::G,
        PitchClass::Gs,
        PitchClass::A,
        PitchClass::As,
        PitchClass::B,
    ];

    /// Canonical, sharp-spelled name of this pitch class.
    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::Cs => "C#",
            PitchClass::D => "D",
            PitchClass::Ds => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Fs => "F#",
            PitchClass::G => "G",
            PitchClass::Gs => "G#",
            PitchClass::A => "A",
            PitchClass::As => "A#",
            PitchClass::B => "B",
        }
    }

    /// Semitone index of this pitch class (C = 0 through B = 11).
    pub fn semitone(self) -> u8 {
        self as u8
    }

    /// Pitch class at a semitone index.
    ///
    /// The index is reduced into the octave first, so negative and
    /// out-of-range values are fine: `from_semitone(-1)` is B,
    /// `from_semitone(12)` is C.
    ///
    /// # Arguments
    /// * `semitone` - Any semitone offset, signed
    pub fn from_semitone(semitone: i32) -> PitchClass {
        PitchClass::ALL[semitone.rem_euclid(12) as usize]
    }

    /// This pitch class moved by `semitones`, which may be negative.
    pub fn transpose(self, semitones: i32) -> PitchClass {
        PitchClass::from_semitone(self.semitone() as i32 + semitones)
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PitchClass {
    type Err = InvalidPitchError;

    /// Normalizes a note name to its pitch class.
    ///
    /// The letter is case-insensitive; the accidental, if any, must be a
    /// literal `#` or `b`. Flat spellings map to their sharp equivalents
    /// (Db -> C#, Bb -> A#), and the enharmonic edge cases resolve the same
    /// way: Cb -> B, Fb -> E, E# -> F, B# -> C.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || InvalidPitchError { input: s.to_string() };

        let mut chars = s.chars();
        let letter = chars.next().ok_or_else(err)?.to_ascii_uppercase();
        let base = match letter {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return Err(err()),
        };
        let accidental = match chars.as_str() {
            "" => 0,
            "#" => 1,
            "b" => -1,
            _ => return Err(err()),
        };

        Ok(PitchClass::from_semitone(base + accidental))
    }
}

// Bridge impls so profiles serialize pitch classes as their display names
// ("F#") instead of variant identifiers.
impl TryFrom<String> for PitchClass {
    type Error = InvalidPitchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PitchClass> for String {
    fn from(pc: PitchClass) -> String {
        pc.name().to_string()
    }
}

/// Directional interval from `low` to `high` in semitones, reduced mod 12.
///
/// The measurement is ordered: unless the notes are the same,
/// `interval(a, b)` and `interval(b, a)` sum to 12.
pub fn interval(low: PitchClass, high: PitchClass) -> u8 {
    (high.semitone() as i32 - low.semitone() as i32).rem_euclid(12) as u8
}

/// Short label for an interval size in semitones.
///
/// Compound inputs reduce mod 12 first, so a 14-semitone spread names
/// itself "M2".
pub fn interval_name(semitones: u8) -> &'static str {
    match semitones % 12 {
        0 => "unison",
        1 => "m2",
        2 => "M2",
        3 => "m3",
        4 => "M3",
        5 => "P4",
        6 => "TT",
        7 => "P5",
        8 => "m6",
        9 => "M6",
        10 => "m7",
        11 => "M7",
        _ => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_round_trip() {
        for pc in PitchClass::ALL {
            assert_eq!(pc.name().parse::<PitchClass>(), Ok(pc));
        }
    }

    #[test]
    fn flat_aliases_normalize_to_sharps() {
        let cases = [
            ("Db", PitchClass::Cs),
            ("Eb", PitchClass::Ds),
            ("Gb", PitchClass::Fs),
            ("Ab", PitchClass::Gs),
            ("Bb", PitchClass::As),
            ("Cb", PitchClass::B),
            ("Fb", PitchClass::E),
            ("E#", PitchClass::F),
            ("B#", PitchClass::C),
        ];
        for (input, expected) in cases {
            assert_eq!(input.parse::<PitchClass>(), Ok(expected), "input {input}");
        }
    }

    #[test]
    fn letter_case_is_forgiven() {
        assert_eq!("f#".parse::<PitchClass>(), Ok(PitchClass::Fs));
        assert_eq!("bb".parse::<PitchClass>(), Ok(PitchClass::As));
    }

    #[test]
    fn malformed_names_are_rejected() {
        for input in ["", "H", "C##", "Cx", "C 4", "#"] {
            assert!(input.parse::<PitchClass>().is_err(), "input {input:?}");
        }
    }

    #[test]
    fn from_semitone_reduces_into_octave() {
        assert_eq!(PitchClass::from_semitone(-1), PitchClass::B);
        assert_eq!(PitchClass::from_semitone(12), PitchClass::C);
        assert_eq!(PitchClass::from_semitone(-13), PitchClass::B);
    }

    #[test]
    fn transpose_wraps_both_directions() {
        assert_eq!(PitchClass::G.transpose(6), PitchClass::Cs);
        assert_eq!(PitchClass::C.transpose(-2), PitchClass::As);
    }

    #[test]
    fn intervals_are_directional() {
        assert_eq!(interval(PitchClass::C, PitchClass::E), 4);
        assert_eq!(interval(PitchClass::E, PitchClass::C), 8);
        for a in PitchClass::ALL {
            for b in PitchClass::ALL {
                if a != b {
                    assert_eq!(interval(a, b) + interval(b, a), 12);
                }
            }
        }
        assert_eq!(interval(PitchClass::A, PitchClass::A), 0);
    }

    #[test]
    fn interval_labels() {
        assert_eq!(interval_name(0), "unison");
        assert_eq!(interval_name(3), "m3");
        assert_eq!(interval_name(6), "TT");
        assert_eq!(interval_name(11), "M7");
        assert_eq!(interval_name(14), "M2");
    }
}
