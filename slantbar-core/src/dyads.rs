//! Dyad geometry search.
//!
//! Takes the pitch-class set of a chord, resolves every reachable coordinate
//! through the fretboard module, and pairs coordinates a single bar can stop
//! at once: same fret (straight) or one fret apart on different strings
//! (slant). The output ordering is a contract surface for display code, so
//! the search is fully deterministic.

use std::collections::BTreeSet;

use crate::fretboard::{FretPosition, Mechanism, Tuning, positions_for};
use crate::pitch::{PitchClass, interval, interval_name};
use crate::substitutions::SubstitutionKind;

/// Largest fret difference a slanted bar can cover. Straight is 0; no wider
/// slants are modeled.
pub const DEFAULT_MAX_SLANT: u8 = 1;

/// Bar geometry of a dyad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarKind {
    /// Both notes at the same fret.
    Straight,
    /// Frets one apart on different strings.
    Slant,
}

impl BarKind {
    pub fn label(self) -> &'static str {
        match self {
            BarKind::Straight => "straight",
            BarKind::Slant => "slant",
        }
    }
}

/// Provenance of a dyad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DyadSource {
    /// Found in the queried chord itself.
    Direct,
    /// At least one note comes from an engaged altering mechanism.
    Altered,
    /// Found by re-running the search against a substitute chord.
    Substitute {
        kind: SubstitutionKind,
        /// Symbol of the substitute chord ("Em", "C#7").
        symbol: String,
        /// Degree label of the substitute ("iii", "bII").
        degree: String,
    },
}

/// A two-note voicing a single bar can play.
///
/// The pair is stored canonically with the lower string index first; the
/// interval is measured upward from the lower-string note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dyad {
    pub low: FretPosition,
    pub high: FretPosition,
    /// Semitone interval from `low` to `high`, reduced mod 12.
    pub interval: u8,
    pub kind: BarKind,
    /// Rank from the fixed interval table; used by the score-free selection
    /// path.
    pub priority: u8,
    pub source: DyadSource,
}

impl Dyad {
    /// Lower of the two frets; the search output is ordered by this.
    pub fn min_fret(&self) -> u8 {
        self.low.fret.min(self.high.fret)
    }

    /// Short label for the dyad's interval ("m3", "TT").
    pub fn interval_label(&self) -> &'static str {
        interval_name(self.interval)
    }

    /// Annotates a base dyad as coming from a substitute chord's search.
    ///
    /// Dyads are never mutated in place; this consumes the direct value and
    /// returns the substitute-tagged one.
    pub fn with_substitution(self, kind: SubstitutionKind, symbol: &str, degree: &str) -> Dyad {
        Dyad {
            source: DyadSource::Substitute {
                kind,
                symbol: symbol.to_string(),
                degree: degree.to_string(),
            },
            ..self
        }
    }
}

/// Rank of an interval for the score-free selection path. Thirds and
/// sevenths dominate, the open fifth sits low, unisons rank nothing.
fn interval_priority(interval: u8) -> u8 {
    match interval % 12 {
        3 | 4 => 10,
        10 | 11 => 9,
        6 => 8,
        7 => 5,
        8 | 9 => 4,
        5 => 3,
        2 => 2,
        1 => 1,
        _ => 0,
    }
}

/// Finds every dyad of `tones` playable with one bar.
///
/// Positions for each tone come from [`positions_for`], with the whole tone
/// set driving mechanism engagement. Pairs sharing a string are discarded (a
/// flat bar cannot stop two frets on one string), as are pairs spread wider
/// than `max_slant`. Coordinate duplicates collapse: two pairs reached via
/// different tone iterations but landing on identical
/// (string, fret, engaged) pairs are one dyad.
///
/// Output is sorted ascending by minimum fret, ties by lower string index,
/// and is identical across calls with identical arguments.
pub fn find_dyads(
    tones: &[PitchClass],
    max_slant: u8,
    tuning: &Tuning,
    max_fret: u8,
    mechanisms: &[Mechanism],
) -> Vec<Dyad> {
    let mut positions = Vec::new();
    for &tone in tones {
        positions.extend(positions_for(tone, tuning, max_fret, tones, mechanisms));
    }

    let mut seen = BTreeSet::new();
    let mut dyads = Vec::new();

    for (i, a) in positions.iter().enumerate() {
        for b in &positions[i + 1..] {
            if a.string == b.string {
                continue;
            }
            let fret_diff = a.fret.abs_diff(b.fret);
            if fret_diff > max_slant {
                continue;
            }

            let (low, high) = if a.string < b.string { (*a, *b) } else { (*b, *a) };
            let key = (
                low.string,
                low.fret,
                high.string,
                high.fret,
                low.engaged,
                high.engaged,
            );
            if !seen.insert(key) {
                continue;
            }

            let semitones = interval(low.pitch, high.pitch);
            dyads.push(Dyad {
                low,
                high,
                interval: semitones,
                kind: if fret_diff == 0 {
                    BarKind::Straight
                } else {
                    BarKind::Slant
                },
                priority: interval_priority(semitones),
                source: if low.engaged || high.engaged {
                    DyadSource::Altered
                } else {
                    DyadSource::Direct
                },
            });
        }
    }

    dyads.sort_by_key(|d| (d.min_fret(), d.low.string));
    dyads
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::PitchClass::*;

    fn six_string() -> Tuning {
        Tuning::parse("G B D F# A D").unwrap()
    }

    #[test]
    fn no_dyad_uses_one_string_twice() {
        let dyads = find_dyads(&[C, E, G], 1, &six_string(), 24, &[]);
        assert!(!dyads.is_empty());
        for d in &dyads {
            assert_ne!(d.low.string, d.high.string);
        }
    }

    #[test]
    fn slant_never_exceeds_bound() {
        let dyads = find_dyads(&[C, E, G], 1, &six_string(), 24, &[]);
        for d in &dyads {
            let diff = d.low.fret.abs_diff(d.high.fret);
            assert!(diff <= 1);
            match d.kind {
                BarKind::Straight => assert_eq!(diff, 0),
                BarKind::Slant => assert_eq!(diff, 1),
            }
        }
    }

    #[test]
    fn straight_bars_only_when_slant_disabled() {
        let dyads = find_dyads(&[C, E, G], 0, &six_string(), 24, &[]);
        assert!(!dyads.is_empty());
        assert!(dyads.iter().all(|d| d.kind == BarKind::Straight));
    }

    #[test]
    fn every_note_belongs_to_the_queried_set() {
        let tones = [C, E, G];
        let dyads = find_dyads(&tones, 1, &six_string(), 24, &[]);
        for d in &dyads {
            assert!(tones.contains(&d.low.pitch), "{:?}", d.low);
            assert!(tones.contains(&d.high.pitch), "{:?}", d.high);
        }
    }

    #[test]
    fn canonical_ordering_and_determinism() {
        let first = find_dyads(&[C, E, G], 1, &six_string(), 24, &[]);
        let second = find_dyads(&[C, E, G], 1, &six_string(), 24, &[]);
        assert_eq!(first, second);

        for d in &first {
            assert!(d.low.string < d.high.string);
        }
        for pair in first.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                a.min_fret() < b.min_fret()
                    || (a.min_fret() == b.min_fret() && a.low.string <= b.low.string)
            );
        }
    }

    #[test]
    fn coordinate_duplicates_collapse() {
        let dyads = find_dyads(&[C, E, G], 1, &six_string(), 24, &[]);
        let mut keys = BTreeSet::new();
        for d in &dyads {
            assert!(keys.insert((
                d.low.string,
                d.low.fret,
                d.high.string,
                d.high.fret,
                d.low.engaged,
                d.high.engaged
            )));
        }
    }

    #[test]
    fn interval_is_measured_from_the_lower_string() {
        // Strings 1 (B) and 2 (D) at fret 5: E and G, a minor third up.
        let dyads = find_dyads(&[E, G], 1, &six_string(), 24, &[]);
        let d = dyads
            .iter()
            .find(|d| d.low.string == 1 && d.high.string == 2 && d.low.fret == 5)
            .expect("expected the fret-5 straight dyad");
        assert_eq!(d.low.pitch, E);
        assert_eq!(d.high.pitch, G);
        assert_eq!(d.interval, 3);
        assert_eq!(d.interval_label(), "m3");
        assert_eq!(d.priority, 10);
    }

    #[test]
    fn engaged_positions_mark_the_dyad_altered() {
        let tuning = Tuning::parse("E B").unwrap();
        let mech = Mechanism {
            string: 1,
            engaged: Cs,
            label: "A pedal".into(),
        };
        let dyads = find_dyads(&[A, Cs, E], 1, &tuning, 12, &[mech]);
        let altered: Vec<_> = dyads
            .iter()
            .filter(|d| d.source == DyadSource::Altered)
            .collect();
        assert!(!altered.is_empty());
        for d in &altered {
            assert!(d.low.engaged || d.high.engaged);
        }
        // Open E against the pedaled C# is a straight bar at the nut.
        assert!(altered.iter().any(|d| {
            d.low.string == 0 && d.low.fret == 0 && d.high.fret == 0 && d.high.engaged
        }));
    }

    #[test]
    fn substitution_stamp_produces_a_new_value() {
        let dyads = find_dyads(&[C, E, G], 1, &six_string(), 24, &[]);
        let base = dyads[0].clone();
        let stamped = base
            .clone()
            .with_substitution(SubstitutionKind::Diatonic, "Em", "iii");
        assert_eq!(base.source, DyadSource::Direct);
        match &stamped.source {
            DyadSource::Substitute {
                kind,
                symbol,
                degree,
            } => {
                assert_eq!(*kind, SubstitutionKind::Diatonic);
                assert_eq!(symbol, "Em");
                assert_eq!(degree, "iii");
            }
            other => panic!("expected substitute source, got {other:?}"),
        }
        assert_eq!(stamped.low, base.low);
        assert_eq!(stamped.interval, base.interval);
    }
}
