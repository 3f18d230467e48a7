//! Chord substitution: diatonic-function swaps and the tritone substitute.
//!
//! Given a chord root and the scale degree it occupies, the resolver
//! recovers the implied tonic, looks up which degrees share the chord's
//! harmonic function, and produces ready-to-search substitute chords. The V
//! degree additionally yields the classic tritone substitute.

use std::fmt;

use crate::chords::{Chord, expand_quality};
use crate::dyads::{Dyad, find_dyads};
use crate::fretboard::Tuning;
use crate::pitch::PitchClass;

/// The seven diatonic scale degrees of a major key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degree {
    I,
    II,
    III,
    IV,
    V,
    VI,
    VII,
}

impl Degree {
    pub const ALL: [Degree; 7] = [
        Degree::I,
        Degree::II,
        Degree::III,
        Degree::IV,
        Degree::V,
        Degree::VI,
        Degree::VII,
    ];

    /// Roman-numeral label, cased by the degree's diatonic quality.
    pub fn numeral(self) -> &'static str {
        match self {
            Degree::I => "I",
            Degree::II => "ii",
            Degree::III => "iii",
            Degree::IV => "IV",
            Degree::V => "V",
            Degree::VI => "vi",
            Degree::VII => "vii°",
        }
    }

    /// Semitone offset of this degree above the tonic in a major scale.
    pub fn offset(self) -> u8 {
        match self {
            Degree::I => 0,
            Degree::II => 2,
            Degree::III => 4,
            Degree::IV => 5,
            Degree::V => 7,
            Degree::VI => 9,
            Degree::VII => 11,
        }
    }

    /// Quality suffix a chord built on this degree takes diatonically.
    pub fn quality_suffix(self) -> &'static str {
        match self {
            Degree::I | Degree::IV => "",
            Degree::II | Degree::III | Degree::VI => "m",
            Degree::V => "7",
            Degree::VII => "m7b5",
        }
    }

    /// Degrees sharing this degree's harmonic function.
    ///
    /// Tonic function binds I, iii and vi to each other; subdominant binds
    /// ii and IV (each of which can also lean on vi); dominant binds V and
    /// vii°.
    pub fn substitutes(self) -> &'static [Degree] {
        match self {
            Degree::I => &[Degree::III, Degree::VI],
            Degree::II => &[Degree::IV, Degree::VI],
            Degree::III => &[Degree::I, Degree::VI],
            Degree::IV => &[Degree::II, Degree::VI],
            Degree::V => &[Degree::VII],
            Degree::VI => &[Degree::I, Degree::III],
            Degree::VII => &[Degree::V],
        }
    }
}

impl fmt::Display for Degree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.numeral())
    }
}

/// How a substitute relates to the original chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubstitutionKind {
    Diatonic,
    Tritone,
}

impl SubstitutionKind {
    pub fn label(self) -> &'static str {
        match self {
            SubstitutionKind::Diatonic => "diatonic",
            SubstitutionKind::Tritone => "tritone",
        }
    }
}

/// One substitute chord, expanded and ready for the dyad search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionCandidate {
    /// Degree label for display ("vi", "bII").
    pub degree_label: String,
    /// Chord symbol ("Am", "C#7").
    pub symbol: String,
    pub chord: Chord,
    pub kind: SubstitutionKind,
}

fn chord_on(root: PitchClass, suffix: &str) -> Chord {
    // Suffixes here come from the fixed degree table, so the lookup cannot
    // miss.
    let offsets = expand_quality(suffix).expect("degree suffixes are in the quality table");
    let tones = offsets.iter().map(|&o| root.transpose(o as i32)).collect();
    Chord {
        root,
        symbol: format!("{}{}", root.name(), suffix),
        offsets: offsets.to_vec(),
        tones,
    }
}

/// Derives the substitute chords for a chord sitting on `degree`.
///
/// The implied tonic is recovered by walking `chord_root` down by the
/// degree's own scale offset; each substitute degree then walks back up from
/// that tonic and takes its diatonic quality. Only the V degree also gets a
/// tritone substitute: a dominant 7 rooted six semitones away, labeled with
/// the flat-second marker rather than a diatonic numeral.
pub fn substitutes_for(chord_root: PitchClass, degree: Degree) -> Vec<SubstitutionCandidate> {
    let tonic = chord_root.transpose(-(degree.offset() as i32));
    let mut candidates = Vec::new();

    for &sub in degree.substitutes() {
        let chord = chord_on(tonic.transpose(sub.offset() as i32), sub.quality_suffix());
        candidates.push(SubstitutionCandidate {
            degree_label: sub.numeral().to_string(),
            symbol: chord.symbol.clone(),
            chord,
            kind: SubstitutionKind::Diatonic,
        });
    }

    if degree == Degree::V {
        let chord = chord_on(chord_root.transpose(6), "7");
        candidates.push(SubstitutionCandidate {
            degree_label: "bII".to_string(),
            symbol: chord.symbol.clone(),
            chord,
            kind: SubstitutionKind::Tritone,
        });
    }

    candidates
}

/// Runs the dyad search for every substitute and stamps provenance.
///
/// Substitute searches read the plain instrument: mechanisms are engaged
/// for the primary chord, not for hypothetical swaps, so none are passed
/// through here.
pub fn substitute_dyads(
    chord_root: PitchClass,
    degree: Degree,
    max_slant: u8,
    tuning: &Tuning,
    max_fret: u8,
) -> Vec<Dyad> {
    let mut out = Vec::new();
    for candidate in substitutes_for(chord_root, degree) {
        for dyad in find_dyads(&candidate.chord.tones, max_slant, tuning, max_fret, &[]) {
            out.push(dyad.with_substitution(
                candidate.kind,
                &candidate.symbol,
                &candidate.degree_label,
            ));
        }
    }
    out
}
