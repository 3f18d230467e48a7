//! Instrument profiles: a named tuning plus its pitch-altering controls.
//!
//! Profiles are what the GUI saves and loads; a handful of built-in presets
//! cover the common steel-family setups.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::fretboard::{InvalidTuningError, Mechanism, Tuning};
use crate::pitch::PitchClass;

/// A complete instrument configuration. This is the top-level object saved
/// to and loaded from a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentProfile {
    pub name: String,
    pub tuning: Tuning,
    pub mechanisms: Vec<Mechanism>,
}

/// Error returned when a profile is internally inconsistent.
///
/// Deserialization bypasses the [`Tuning`] constructor, so loaded profiles
/// must pass through [`InstrumentProfile::validate`] before use.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error(transparent)]
    Tuning(#[from] InvalidTuningError),
    #[error("mechanism {label:?} points at string {string}, but the tuning has {strings} strings")]
    MechanismOutOfRange {
        label: String,
        string: usize,
        strings: usize,
    },
    #[error("a string carries at most one mechanism; string {string} has several")]
    DuplicateMechanism { string: usize },
}

impl InstrumentProfile {
    pub fn new(name: &str, tuning: Tuning, mechanisms: Vec<Mechanism>) -> InstrumentProfile {
        InstrumentProfile {
            name: name.to_string(),
            tuning,
            mechanisms,
        }
    }

    /// Checks the cross-field invariants the position resolver relies on:
    /// a sane string count, every mechanism bound to a real string, and no
    /// string carrying two mechanisms.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let strings = self.tuning.string_count();
        if !(Tuning::MIN_STRINGS..=Tuning::MAX_STRINGS).contains(&strings) {
            return Err(InvalidTuningError::StringCount(strings).into());
        }

        let mut bound = BTreeSet::new();
        for mech in &self.mechanisms {
            if mech.string >= strings {
                return Err(ProfileError::MechanismOutOfRange {
                    label: mech.label.clone(),
                    string: mech.string,
                    strings,
                });
            }
            if !bound.insert(mech.string) {
                return Err(ProfileError::DuplicateMechanism {
                    string: mech.string,
                });
            }
        }
        Ok(())
    }
}

fn mech(string: usize, engaged: PitchClass, label: &str) -> Mechanism {
    Mechanism {
        string,
        engaged,
        label: label.to_string(),
    }
}

/// Built-in presets. The E9 copedent models the A and B pedals as one
/// mechanism per raised string.
static BUILTINS: Lazy<Vec<InstrumentProfile>> = Lazy::new(|| {
    use PitchClass::*;

    let tuning = |text: &str| Tuning::parse(text).expect("preset tunings are well formed");

    vec![
        InstrumentProfile::new("6-string (Gmaj9)", tuning("G B D F# A D"), Vec::new()),
        InstrumentProfile::new("Dobro (open G)", tuning("G B D G B D"), Vec::new()),
        InstrumentProfile::new("Lap steel (C6)", tuning("C E G A C E"), Vec::new()),
        InstrumentProfile::new(
            "Pedal steel (E9)",
            tuning("B D E F# G# B E G# D# F#"),
            vec![
                mech(0, Cs, "A pedal"),
                mech(5, Cs, "A pedal"),
                mech(4, A, "B pedal"),
                mech(7, A, "B pedal"),
            ],
        ),
    ]
});

/// The compiled-in instrument presets, in display order.
pub fn builtin_profiles() -> &'static [InstrumentProfile] {
    &BUILTINS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fretboard::positions_for;
    use crate::pitch::PitchClass::*;

    #[test]
    fn builtins_are_internally_consistent() {
        let profiles = builtin_profiles();
        assert!(!profiles.is_empty());
        for profile in profiles {
            profile.validate().unwrap();
        }
    }

    #[test]
    fn e9_pedals_raise_both_their_strings() {
        let e9 = builtin_profiles()
            .iter()
            .find(|p| p.name.contains("E9"))
            .unwrap();

        // A-major query: the A pedal (B -> C#) engages on strings 0 and 5.
        let positions = positions_for(Cs, &e9.tuning, 12, &[A, Cs, E], &e9.mechanisms);
        for string in [0usize, 5] {
            assert!(
                positions
                    .iter()
                    .any(|p| p.string == string && p.fret == 0 && p.engaged),
                "expected an engaged C# on string {string}"
            );
        }
    }

    #[test]
    fn validate_rejects_a_doubly_bound_string() {
        let profile = InstrumentProfile::new(
            "broken",
            Tuning::parse("E B").unwrap(),
            vec![mech(1, Cs, "first"), mech(1, D, "second")],
        );
        assert_eq!(
            profile.validate(),
            Err(ProfileError::DuplicateMechanism { string: 1 })
        );
    }

    #[test]
    fn validate_rejects_an_out_of_range_mechanism() {
        let profile = InstrumentProfile::new(
            "broken",
            Tuning::parse("E B").unwrap(),
            vec![mech(5, Cs, "stray")],
        );
        assert!(matches!(
            profile.validate(),
            Err(ProfileError::MechanismOutOfRange { string: 5, .. })
        ));
    }

    #[test]
    fn profiles_round_trip_through_json() {
        let original = builtin_profiles()
            .iter()
            .find(|p| p.name.contains("E9"))
            .unwrap();
        let json = serde_json::to_string_pretty(original).unwrap();
        // Pitch classes persist as display names, not variant identifiers.
        assert!(json.contains("\"F#\""));

        let restored: InstrumentProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(&restored, original);
        restored.validate().unwrap();
    }
}
