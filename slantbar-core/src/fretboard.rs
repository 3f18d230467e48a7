//! Fretboard model: tunings, pitch-altering mechanisms, and the position
//! resolver that maps a pitch class to every reachable (string, fret)
//! coordinate.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pitch::{InvalidPitchError, PitchClass};

/// Highest fret considered by searches.
pub const MAX_FRET: u8 = 24;

/// Error returned when a tuning description cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTuningError {
    /// Playable instruments carry 2 to 12 strings.
    #[error("tuning must have 2 to 12 strings, got {0}")]
    StringCount(usize),
    #[error(transparent)]
    BadNote(#[from] InvalidPitchError),
}

/// Open-string pitches of an instrument, index 0 = lowest-pitched string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tuning(Vec<PitchClass>);

impl Tuning {
    pub const MIN_STRINGS: usize = 2;
    pub const MAX_STRINGS: usize = 12;

    /// Builds a tuning from explicit open-string pitches.
    pub fn new(open_strings: Vec<PitchClass>) -> Result<Tuning, InvalidTuningError> {
        if !(Self::MIN_STRINGS..=Self::MAX_STRINGS).contains(&open_strings.len()) {
            return Err(InvalidTuningError::StringCount(open_strings.len()));
        }
        Ok(Tuning(open_strings))
    }

    /// Parses a space- or comma-delimited tuning string ("G B D F# A D").
    ///
    /// Empty tokens (doubled separators, trailing commas) are ignored; every
    /// remaining token must normalize to a pitch class, and the result must
    /// land in the 2..=12 string range.
    pub fn parse(text: &str) -> Result<Tuning, InvalidTuningError> {
        let mut open_strings = Vec::new();
        for token in text.split([' ', ',']).filter(|t| !t.is_empty()) {
            open_strings.push(token.parse::<PitchClass>()?);
        }
        Tuning::new(open_strings)
    }

    pub fn string_count(&self) -> usize {
        self.0.len()
    }

    /// Nominal open pitch of a string.
    pub fn open_pitch(&self, string: usize) -> PitchClass {
        self.0[string]
    }

    pub fn strings(&self) -> &[PitchClass] {
        &self.0
    }
}

impl fmt::Display for Tuning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, pc) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{pc}")?;
        }
        Ok(())
    }
}

/// A pitch-altering control (pedal or knee lever) bound to one string.
///
/// Engagement is not persistent state: a mechanism engages for the duration
/// of one query exactly when its altered pitch is a tone of the chord being
/// searched. At most one mechanism may be configured per string; profile
/// validation enforces this at the load boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mechanism {
    /// Index of the string the control acts on.
    pub string: usize,
    /// Pitch class the open string produces while the control is held.
    pub engaged: PitchClass,
    /// Display name ("A pedal", "LKL").
    pub label: String,
}

/// One reachable coordinate for a pitch class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FretPosition {
    pub string: usize,
    pub fret: u8,
    pub pitch: PitchClass,
    /// True when the pitch comes from an engaged mechanism instead of the
    /// string's nominal open pitch.
    pub engaged: bool,
}

/// Resolves every reachable coordinate for `target` within `max_fret`.
///
/// The base scan walks string x fret and keeps coordinates whose sounding
/// pitch equals the target. Mechanisms layer on top, decided per query: a
/// mechanism engages when its altered pitch belongs to `chord_tones` (the
/// whole chord under search, not just this target). An engaged string loses
/// its fret-0 position for every target in the query (the player is holding
/// the control down for the whole passage), and contributes a fret-0
/// engaged-variant position when the target is the altered pitch itself.
///
/// Pass empty slices for `chord_tones` and `mechanisms` to search the plain
/// instrument.
pub fn positions_for(
    target: PitchClass,
    tuning: &Tuning,
    max_fret: u8,
    chord_tones: &[PitchClass],
    mechanisms: &[Mechanism],
) -> Vec<FretPosition> {
    let mut engaged_strings = vec![false; tuning.string_count()];
    let mut positions = Vec::new();

    for mech in mechanisms {
        if mech.string >= tuning.string_count() || !chord_tones.contains(&mech.engaged) {
            continue;
        }
        engaged_strings[mech.string] = true;
        if mech.engaged == target {
            positions.push(FretPosition {
                string: mech.string,
                fret: 0,
                pitch: target,
                engaged: true,
            });
        }
    }

    for (string, &open) in tuning.strings().iter().enumerate() {
        for fret in 0..=max_fret {
            if fret == 0 && engaged_strings[string] {
                continue;
            }
            if open.transpose(fret as i32) == target {
                positions.push(FretPosition {
                    string,
                    fret,
                    pitch: target,
                    engaged: false,
                });
            }
        }
    }

    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::PitchClass::*;

    fn six_string() -> Tuning {
        Tuning::parse("G B D F# A D").unwrap()
    }

    #[test]
    fn parse_space_delimited() {
        let tuning = six_string();
        assert_eq!(tuning.strings(), &[G, B, D, Fs, A, D]);
        assert_eq!(tuning.string_count(), 6);
    }

    #[test]
    fn parse_comma_delimited_and_mixed() {
        assert_eq!(Tuning::parse("C,E,G").unwrap().strings(), &[C, E, G]);
        assert_eq!(Tuning::parse("C, E, G").unwrap().strings(), &[C, E, G]);
    }

    #[test]
    fn parse_rejects_bad_string_counts() {
        assert_eq!(
            Tuning::parse("G"),
            Err(InvalidTuningError::StringCount(1))
        );
        assert_eq!(
            Tuning::parse("C C C C C C C C C C C C C"),
            Err(InvalidTuningError::StringCount(13))
        );
        assert_eq!(Tuning::parse(""), Err(InvalidTuningError::StringCount(0)));
    }

    #[test]
    fn parse_rejects_bad_tokens() {
        assert!(matches!(
            Tuning::parse("G H D"),
            Err(InvalidTuningError::BadNote(_))
        ));
    }

    #[test]
    fn tuning_displays_canonically() {
        assert_eq!(Tuning::parse("g, bb, d").unwrap().to_string(), "G A# D");
    }

    #[test]
    fn every_pitch_class_reachable_on_every_string() {
        let tuning = six_string();
        for target in PitchClass::ALL {
            let positions = positions_for(target, &tuning, MAX_FRET, &[], &[]);
            for string in 0..tuning.string_count() {
                assert!(
                    positions.iter().any(|p| p.string == string),
                    "{target} unreachable on string {string}"
                );
            }
        }
    }

    #[test]
    fn open_strings_resolve_at_fret_zero() {
        let tuning = six_string();
        let positions = positions_for(G, &tuning, 12, &[], &[]);
        assert!(positions.contains(&FretPosition {
            string: 0,
            fret: 0,
            pitch: G,
            engaged: false
        }));
    }

    #[test]
    fn scan_respects_max_fret() {
        let tuning = six_string();
        for target in PitchClass::ALL {
            for p in positions_for(target, &tuning, 5, &[], &[]) {
                assert!(p.fret <= 5);
            }
        }
    }

    #[test]
    fn mechanism_engages_when_altered_pitch_is_a_chord_tone() {
        let tuning = Tuning::parse("E B").unwrap();
        let mech = Mechanism {
            string: 1,
            engaged: Cs,
            label: "A pedal".into(),
        };
        // A-major query: C# is a chord tone, so the pedal is down.
        let positions = positions_for(Cs, &tuning, 12, &[A, Cs, E], &[mech.clone()]);
        assert!(positions.contains(&FretPosition {
            string: 1,
            fret: 0,
            pitch: Cs,
            engaged: true
        }));
        // The barred C# two frets up is still available.
        assert!(positions.contains(&FretPosition {
            string: 1,
            fret: 2,
            pitch: Cs,
            engaged: false
        }));
    }

    #[test]
    fn engaged_string_loses_its_open_position_for_all_targets() {
        let tuning = Tuning::parse("E B").unwrap();
        let mech = Mechanism {
            string: 1,
            engaged: Cs,
            label: "A pedal".into(),
        };
        // Searching for B while the pedal is held: the open B is gone, the
        // fret-12 B (and the ones on the other string) remain.
        let positions = positions_for(B, &tuning, 12, &[B, Cs, E], &[mech]);
        assert!(!positions.iter().any(|p| p.string == 1 && p.fret == 0));
        assert!(positions.contains(&FretPosition {
            string: 1,
            fret: 12,
            pitch: B,
            engaged: false
        }));
    }

    #[test]
    fn mechanism_stays_idle_when_altered_pitch_is_not_in_the_chord() {
        let tuning = Tuning::parse("E B").unwrap();
        let mech = Mechanism {
            string: 1,
            engaged: Cs,
            label: "A pedal".into(),
        };
        let positions = positions_for(B, &tuning, 12, &[E, Gs, B], &[mech]);
        assert!(positions.contains(&FretPosition {
            string: 1,
            fret: 0,
            pitch: B,
            engaged: false
        }));
    }

    #[test]
    fn mechanism_on_out_of_range_string_is_ignored() {
        let tuning = Tuning::parse("E B").unwrap();
        let mech = Mechanism {
            string: 7,
            engaged: Cs,
            label: "stray".into(),
        };
        let positions = positions_for(Cs, &tuning, 12, &[A, Cs, E], &[mech]);
        assert!(positions.iter().all(|p| p.string < 2));
    }
}
