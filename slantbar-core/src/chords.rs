//! Chord symbol parsing and expansion.
//!
//! A chord symbol splits into a root token and a quality suffix drawn from a
//! closed table; the table maps each suffix to semitone offsets above the
//! root. Extensions keep their unreduced offsets (a ninth stays 14) so
//! symbols survive display round trips; geometry code reduces mod 12 itself.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use thiserror::Error;

use crate::pitch::{InvalidPitchError, PitchClass};

/// Error returned when a quality suffix is not in the table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown chord quality: {quality:?}")]
pub struct UnknownChordQualityError {
    /// The unrecognized suffix, exactly as split off the symbol.
    pub quality: String,
}

/// Error returned by [`expand_chord`] for an unparseable symbol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChordSymbolError {
    #[error(transparent)]
    Pitch(#[from] InvalidPitchError),
    #[error(transparent)]
    Quality(#[from] UnknownChordQualityError),
}

/// Static map from quality suffix to semitone offsets above the root.
///
/// Alias spellings share one offset slice ("maj", "M" and the empty suffix
/// all mean a major triad). The set is closed; anything else is an
/// [`UnknownChordQualityError`].
static QUALITIES: Lazy<BTreeMap<&'static str, &'static [u8]>> = Lazy::new(|| {
    const TABLE: &[(&[&str], &[u8])] = &[
        (&["", "maj", "M"], &[0, 4, 7]),
        (&["m", "min"], &[0, 3, 7]),
        (&["7"], &[0, 4, 7, 10]),
        (&["maj7", "M7"], &[0, 4, 7, 11]),
        (&["m7", "min7"], &[0, 3, 7, 10]),
        (&["dim"], &[0, 3, 6]),
        (&["dim7"], &[0, 3, 6, 9]),
        (&["m7b5", "ø"], &[0, 3, 6, 10]),
        (&["aug"], &[0, 4, 8]),
        (&["6"], &[0, 4, 7, 9]),
        (&["m6"], &[0, 3, 7, 9]),
        (&["9"], &[0, 4, 7, 10, 14]),
        (&["maj9"], &[0, 4, 7, 11, 14]),
        (&["m9"], &[0, 3, 7, 10, 14]),
        (&["add9"], &[0, 4, 7, 14]),
        (&["sus2"], &[0, 2, 7]),
        (&["sus4"], &[0, 5, 7]),
    ];

    let mut map = BTreeMap::new();
    for (names, offsets) in TABLE {
        for name in *names {
            map.insert(*name, *offsets);
        }
    }
    map
});

/// A parsed chord symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    /// Root pitch class.
    pub root: PitchClass,
    /// The symbol with its root respelled canonically ("Bbmaj7" -> "A#maj7").
    pub symbol: String,
    /// Semitone offsets above the root, unreduced (a ninth is 14).
    pub offsets: Vec<u8>,
    /// The offsets realized as pitch classes, in table order.
    pub tones: Vec<PitchClass>,
}

/// Looks up a quality suffix in the table.
pub fn expand_quality(quality: &str) -> Result<&'static [u8], UnknownChordQualityError> {
    QUALITIES
        .get(quality)
        .copied()
        .ok_or_else(|| UnknownChordQualityError {
            quality: quality.to_string(),
        })
}

/// Parses a chord symbol ("Am7", "F#dim", "Bbmaj7") into its tones.
///
/// The root token is the leading letter plus an optional `#` or `b`, taken
/// greedily, so "Cb" is a B-major chord rather than a C chord with suffix
/// "b". Whatever remains after the root must appear in the quality table.
pub fn expand_chord(symbol: &str) -> Result<Chord, ChordSymbolError> {
    let symbol = symbol.trim();

    let mut chars = symbol.char_indices();
    let Some((_, first)) = chars.next() else {
        return Err(InvalidPitchError {
            input: String::new(),
        }
        .into());
    };
    let mut root_end = first.len_utf8();
    if matches!(chars.next(), Some((_, '#' | 'b'))) {
        root_end += 1;
    }

    let root: PitchClass = symbol[..root_end].parse()?;
    let quality = &symbol[root_end..];
    let offsets = expand_quality(quality)?;
    let tones = offsets.iter().map(|&o| root.transpose(o as i32)).collect();

    Ok(Chord {
        root,
        symbol: format!("{}{}", root.name(), quality),
        offsets: offsets.to_vec(),
        tones,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::PitchClass::*;

    #[test]
    fn major_triad_from_bare_root() {
        let chord = expand_chord("C").unwrap();
        assert_eq!(chord.root, C);
        assert_eq!(chord.tones, vec![C, E, G]);
        assert_eq!(chord.symbol, "C");
    }

    #[test]
    fn minor_seventh() {
        let chord = expand_chord("Am7").unwrap();
        assert_eq!(chord.tones, vec![A, C, E, G]);
        assert_eq!(chord.offsets, vec![0, 3, 7, 10]);
    }

    #[test]
    fn diminished_with_sharp_root() {
        let chord = expand_chord("F#dim").unwrap();
        assert_eq!(chord.tones, vec![Fs, A, C]);
    }

    #[test]
    fn flat_root_respells_canonically() {
        let chord = expand_chord("Bbmaj7").unwrap();
        assert_eq!(chord.root, As);
        assert_eq!(chord.symbol, "A#maj7");
        assert_eq!(chord.tones, vec![As, D, F, A]);
    }

    #[test]
    fn ninth_keeps_unreduced_offset() {
        let chord = expand_chord("Cmaj9").unwrap();
        assert_eq!(chord.offsets, vec![0, 4, 7, 11, 14]);
        assert_eq!(chord.tones.last(), Some(&D));
    }

    #[test]
    fn quality_aliases_agree() {
        assert_eq!(
            expand_chord("Cmin7").unwrap().tones,
            expand_chord("Cm7").unwrap().tones
        );
        assert_eq!(
            expand_chord("GM7").unwrap().tones,
            expand_chord("Gmaj7").unwrap().tones
        );
    }

    #[test]
    fn root_token_is_greedy() {
        // "Cb" is the note B with an empty suffix, not C plus a "b" quality.
        let chord = expand_chord("Cb").unwrap();
        assert_eq!(chord.root, B);
    }

    #[test]
    fn unknown_quality_is_reported() {
        match expand_chord("Cxyz") {
            Err(ChordSymbolError::Quality(e)) => assert_eq!(e.quality, "xyz"),
            other => panic!("expected quality error, got {other:?}"),
        }
    }

    #[test]
    fn bad_root_is_reported() {
        assert!(matches!(
            expand_chord("H7"),
            Err(ChordSymbolError::Pitch(_))
        ));
        assert!(matches!(expand_chord(""), Err(ChordSymbolError::Pitch(_))));
    }
}
