//! Harmonic scoring and selection.
//!
//! A raw dyad search returns far more voicings than a player can read at
//! once. This module cuts the list down two ways: a harmonic filter keyed to
//! a reference root (two competing policies, see [`GuideTonePolicy`]), then
//! an overlap-aware greedy pass that spreads the survivors across the neck
//! so no two picks crowd the same strings in the same region.

use std::fmt;

use crate::dyads::Dyad;
use crate::pitch::{PitchClass, interval};

/// Which harmonic filter runs before selection.
///
/// `RolePair` keeps only strict guide-tone dyads (a third paired with a
/// seventh). `WeightedScore` admits the superset of harmonically weighty
/// pairs and is the default. The two come from different revisions of the
/// selection logic and make a real precision/recall tradeoff, so both stay
/// available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuideTonePolicy {
    RolePair,
    #[default]
    WeightedScore,
}

impl GuideTonePolicy {
    /// Overlap window used when the caller does not supply one.
    pub fn default_proximity(self) -> u8 {
        match self {
            GuideTonePolicy::RolePair => 2,
            GuideTonePolicy::WeightedScore => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GuideTonePolicy::RolePair => "3rds + 7ths",
            GuideTonePolicy::WeightedScore => "weighted",
        }
    }
}

impl fmt::Display for GuideTonePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Functional role of a note relative to the reference root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Third,
    Seventh,
    Other,
}

fn role(interval_from_root: u8) -> Role {
    match interval_from_root % 12 {
        3 | 4 => Role::Third,
        10 | 11 => Role::Seventh,
        _ => Role::Other,
    }
}

/// Harmonic weight of a note by its interval from the root. Thirds and
/// sevenths define the chord quality and dominate; the fifth is nearly
/// redundant.
fn importance(interval_from_root: u8) -> u8 {
    match interval_from_root % 12 {
        3 | 4 => 10,
        10 | 11 => 9,
        0 => 6,
        1 | 2 => 4,
        8 | 9 => 3,
        5 | 6 => 3,
        7 => 2,
        _ => 0,
    }
}

/// Minimum combined importance a dyad needs under `WeightedScore`.
const SCORE_FLOOR: u8 = 8;

/// True when two dyads fight for the same spot on the neck: any identical
/// (string, fret) coordinate, or a shared string within `fret_proximity`
/// frets. The relation is not transitive.
fn overlaps(a: &Dyad, b: &Dyad, fret_proximity: u8) -> bool {
    let a_coords = [(a.low.string, a.low.fret), (a.high.string, a.high.fret)];
    let b_coords = [(b.low.string, b.low.fret), (b.high.string, b.high.fret)];
    for ca in a_coords {
        for cb in b_coords {
            if ca == cb {
                return true;
            }
        }
    }

    let near = a.min_fret().abs_diff(b.min_fret()) <= fret_proximity;
    let shared_string = a_coords
        .iter()
        .any(|(s, _)| *s == b.low.string || *s == b.high.string);
    near && shared_string
}

/// Greedy maximal non-overlapping pick.
///
/// Candidates are taken in descending score order, ties toward the nut; a
/// candidate survives only if it overlaps nothing already selected. The
/// greedy order is part of the contract: a different tie-break yields a
/// different, equally plausible-looking set, so this must not change.
fn select_spread(mut scored: Vec<(u8, Dyad)>, fret_proximity: u8) -> Vec<Dyad> {
    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_b
            .cmp(score_a)
            .then(a.min_fret().cmp(&b.min_fret()))
    });

    let mut selected: Vec<Dyad> = Vec::new();
    for (_, candidate) in scored {
        if selected
            .iter()
            .all(|kept| !overlaps(&candidate, kept, fret_proximity))
        {
            selected.push(candidate);
        }
    }

    selected.sort_by_key(Dyad::min_fret);
    selected
}

/// Filters dyads down to the harmonically essential subset for `root`.
///
/// Returns empty when no root is supplied: both policies measure notes
/// against a root, so without one there is nothing to keep. `fret_proximity`
/// falls back to the policy's default window.
pub fn filter_guide_tones(
    dyads: &[Dyad],
    root: Option<PitchClass>,
    policy: GuideTonePolicy,
    fret_proximity: Option<u8>,
) -> Vec<Dyad> {
    let Some(root) = root else {
        return Vec::new();
    };
    let proximity = fret_proximity.unwrap_or_else(|| policy.default_proximity());

    let scored: Vec<(u8, Dyad)> = dyads
        .iter()
        .filter_map(|d| {
            let low_iv = interval(root, d.low.pitch);
            let high_iv = interval(root, d.high.pitch);
            let keep = match policy {
                GuideTonePolicy::RolePair => matches!(
                    (role(low_iv), role(high_iv)),
                    (Role::Third, Role::Seventh) | (Role::Seventh, Role::Third)
                ),
                // A pair sitting on one scale position says nothing new, no
                // matter how weighty that position is.
                GuideTonePolicy::WeightedScore => {
                    low_iv != high_iv && importance(low_iv) + importance(high_iv) >= SCORE_FLOOR
                }
            };
            keep.then(|| (importance(low_iv) + importance(high_iv), d.clone()))
        })
        .collect();

    select_spread(scored, proximity)
}

/// Score-free selection over the whole dyad list.
///
/// Skips the harmonic filter entirely and spreads by the fixed
/// interval-priority rank each dyad already carries. Useful when no root is
/// known but the display still wants a readable subset.
pub fn spread_by_priority(dyads: &[Dyad], fret_proximity: u8) -> Vec<Dyad> {
    let scored = dyads.iter().map(|d| (d.priority, d.clone())).collect();
    select_spread(scored, fret_proximity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dyads::{BarKind, DyadSource, find_dyads};
    use crate::fretboard::{FretPosition, Tuning};
    use crate::pitch::PitchClass::*;

    fn six_string() -> Tuning {
        Tuning::parse("G B D F# A D").unwrap()
    }

    fn dyad(s1: usize, f1: u8, p1: PitchClass, s2: usize, f2: u8, p2: PitchClass) -> Dyad {
        Dyad {
            low: FretPosition {
                string: s1,
                fret: f1,
                pitch: p1,
                engaged: false,
            },
            high: FretPosition {
                string: s2,
                fret: f2,
                pitch: p2,
                engaged: false,
            },
            interval: interval(p1, p2),
            kind: if f1 == f2 {
                BarKind::Straight
            } else {
                BarKind::Slant
            },
            priority: 0,
            source: DyadSource::Direct,
        }
    }

    #[test]
    fn missing_root_yields_nothing() {
        let dyads = find_dyads(&[C, E, G], 1, &six_string(), 24, &[]);
        assert!(
            filter_guide_tones(&dyads, None, GuideTonePolicy::WeightedScore, None).is_empty()
        );
    }

    #[test]
    fn weighted_policy_on_cmaj7() {
        let dyads = find_dyads(&[C, E, G, B], 1, &six_string(), 24, &[]);
        let kept = filter_guide_tones(&dyads, Some(C), GuideTonePolicy::WeightedScore, None);
        assert!(!kept.is_empty());

        // No survivor pairs two notes on the same scale position.
        for d in &kept {
            assert_ne!(interval(C, d.low.pitch), interval(C, d.high.pitch), "{d:?}");
        }
        // The third-plus-seventh pairing (score 19) must make the cut.
        assert!(kept.iter().any(|d| {
            let ivs = [interval(C, d.low.pitch), interval(C, d.high.pitch)];
            ivs.contains(&4) && ivs.contains(&11)
        }));
    }

    #[test]
    fn weighted_policy_applies_the_score_floor() {
        // In Csus4 the 4th (3) plus the 5th (2) totals 5, under the floor.
        let dyads = find_dyads(&[C, F, G], 1, &six_string(), 24, &[]);
        let kept = filter_guide_tones(&dyads, Some(C), GuideTonePolicy::WeightedScore, None);
        assert!(!kept.is_empty());
        for d in &kept {
            let pitches = [d.low.pitch, d.high.pitch];
            assert!(
                !(pitches.contains(&F) && pitches.contains(&G)),
                "4th/5th pair should score under the floor: {d:?}"
            );
        }
    }

    #[test]
    fn role_pair_policy_keeps_only_thirds_with_sevenths() {
        let dyads = find_dyads(&[C, E, G, B], 1, &six_string(), 24, &[]);
        let kept = filter_guide_tones(&dyads, Some(C), GuideTonePolicy::RolePair, None);
        assert!(!kept.is_empty());
        for d in &kept {
            let mut pitches = [d.low.pitch, d.high.pitch];
            pitches.sort();
            assert_eq!(pitches, [E, B], "{d:?}");
        }
    }

    #[test]
    fn selection_output_is_spread_and_ordered() {
        let dyads = find_dyads(&[C, E, G, B], 1, &six_string(), 24, &[]);
        let kept = filter_guide_tones(&dyads, Some(C), GuideTonePolicy::WeightedScore, None);

        for pair in kept.windows(2) {
            assert!(pair[0].min_fret() <= pair[1].min_fret());
        }
        for (i, a) in kept.iter().enumerate() {
            for b in &kept[i + 1..] {
                assert!(!overlaps(a, b, 3), "selected dyads collide: {a:?} / {b:?}");
            }
        }
    }

    #[test]
    fn greedy_pick_follows_score_then_fret_order() {
        let d_far = dyad(1, 7, E, 2, 7, B); // score 19, away from the nut
        let d_near = dyad(0, 5, E, 1, 5, B); // score 19, closer in
        let d_side = dyad(2, 3, C, 3, 3, E); // score 16, disjoint strings

        // Input order deliberately reversed; the sort decides, not the input.
        let kept = filter_guide_tones(
            &[d_far.clone(), d_side.clone(), d_near.clone()],
            Some(C),
            GuideTonePolicy::WeightedScore,
            Some(3),
        );

        // d_near wins the tie at score 19 and knocks out d_far (shared
        // string 1, two frets apart); d_side survives on disjoint strings.
        assert_eq!(kept, vec![d_side, d_near]);
    }

    #[test]
    fn exact_coordinate_collision_is_an_overlap_at_any_distance() {
        let a = dyad(0, 5, E, 1, 5, B);
        let b = dyad(1, 5, B, 2, 4, C);
        assert!(overlaps(&a, &b, 0));
    }

    #[test]
    fn policy_default_proximities() {
        assert_eq!(GuideTonePolicy::RolePair.default_proximity(), 2);
        assert_eq!(GuideTonePolicy::WeightedScore.default_proximity(), 3);
        assert_eq!(GuideTonePolicy::default(), GuideTonePolicy::WeightedScore);
    }

    #[test]
    fn priority_spread_needs_no_root() {
        let dyads = find_dyads(&[C, E, G], 1, &six_string(), 24, &[]);
        let kept = spread_by_priority(&dyads, 3);
        assert!(!kept.is_empty());
        for pair in kept.windows(2) {
            assert!(pair[0].min_fret() <= pair[1].min_fret());
        }
        for (i, a) in kept.iter().enumerate() {
            for b in &kept[i + 1..] {
                assert!(!overlaps(a, b, 3));
            }
        }
    }
}
