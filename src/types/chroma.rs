use crate::error::{Result, TheoryError};
use crate::types::interval::{Interval, Spelled};
use crate::types::theory_config::Spelling;
use std::fmt;
use std::str::FromStr;

/// One of the seven natural note letters, indexed from C
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

/// Semitone position of each natural letter within the octave, C first
const NATURAL_PITCH_CLASSES: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Semitones above C0 of the natural note `diatonic` letter steps above C0
pub(crate) fn natural_semitones(diatonic: i32) -> i32 {
    12 * diatonic.div_euclid(7) + NATURAL_PITCH_CLASSES[diatonic.rem_euclid(7) as usize]
}

/// [`natural_semitones`], or `None` when the result does not fit an `i32`
pub(crate) fn checked_natural_semitones(diatonic: i32) -> Option<i32> {
    diatonic
        .div_euclid(7)
        .checked_mul(12)?
        .checked_add(NATURAL_PITCH_CLASSES[diatonic.rem_euclid(7) as usize])
}

impl Letter {
    pub const ALL: [Letter; 7] = [
        Letter::C,
        Letter::D,
        Letter::E,
        Letter::F,
        Letter::G,
        Letter::A,
        Letter::B,
    ];

    /// Position of the letter counted from C (0-6)
    pub fn index(self) -> i32 {
        self as i32
    }

    /// Letter at a position counted from C, wrapping in both directions
    pub fn from_index(index: i32) -> Letter {
        Letter::ALL[index.rem_euclid(7) as usize]
    }

    pub fn natural_pitch_class(self) -> i32 {
        NATURAL_PITCH_CLASSES[self as usize]
    }

    /// Parse a letter (case-insensitive)
    pub fn from_char(c: char) -> Option<Letter> {
        match c.to_ascii_uppercase() {
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            'F' => Some(Letter::F),
            'G' => Some(Letter::G),
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        }
    }
}

/// A pitch class with an explicit spelling, independent of octave.
///
/// `==` compares spelling (letter and accidental). Use
/// [`Chroma::enharmonic_eq`] to compare by sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chroma {
    letter: Letter,
    accidental: i32, // semitones away from the natural letter
}

impl Chroma {
    pub const C: Chroma = Chroma::natural(Letter::C);
    pub const D_FLAT: Chroma = Chroma::new(Letter::D, -1);
    pub const D: Chroma = Chroma::natural(Letter::D);
    pub const E_FLAT: Chroma = Chroma::new(Letter::E, -1);
    pub const E: Chroma = Chroma::natural(Letter::E);
    pub const F: Chroma = Chroma::natural(Letter::F);
    pub const G_FLAT: Chroma = Chroma::new(Letter::G, -1);
    pub const G: Chroma = Chroma::natural(Letter::G);
    pub const A_FLAT: Chroma = Chroma::new(Letter::A, -1);
    pub const A: Chroma = Chroma::natural(Letter::A);
    pub const B_FLAT: Chroma = Chroma::new(Letter::B, -1);
    pub const B: Chroma = Chroma::natural(Letter::B);

    pub const fn new(letter: Letter, accidental: i32) -> Self {
        Chroma { letter, accidental }
    }

    pub const fn natural(letter: Letter) -> Self {
        Chroma::new(letter, 0)
    }

    /// Spell a pitch class with the process-wide spelling preference
    pub fn from_pitch_class(pitch_class: i32) -> Self {
        Self::from_pitch_class_with(pitch_class, Spelling::default_preference())
    }

    pub fn from_pitch_class_with(pitch_class: i32, spelling: Spelling) -> Self {
        spelling.spell(pitch_class)
    }

    /// Parse a note name such as `C`, `F#`, `Bbb` or `Ex`
    pub fn from_notation(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let mut chars = trimmed.chars();

        let letter = match chars.next() {
            Some(c) => Letter::from_char(c)
                .ok_or_else(|| TheoryError::parse(text, format!("unknown note letter '{}'", c)))?,
            None => return Err(TheoryError::parse(text, "empty note name")),
        };

        let accidental = parse_accidentals(chars.as_str()).map_err(|reason| TheoryError::parse(text, reason))?;
        Ok(Chroma::new(letter, accidental))
    }

    pub fn letter(&self) -> Letter {
        self.letter
    }

    pub fn accidental(&self) -> i32 {
        self.accidental
    }

    /// Semitone position within the octave (0-11)
    pub fn pitch_class(&self) -> i32 {
        (self.letter.natural_pitch_class() + self.accidental).rem_euclid(12)
    }

    /// Same sound, regardless of spelling
    pub fn enharmonic_eq(&self, other: &Chroma) -> bool {
        self.pitch_class() == other.pitch_class()
    }

    /// Same letter and same accidental
    pub fn spelled_eq(&self, other: &Chroma) -> bool {
        self == other
    }

    /// True when the spelling fits the notation without respelling
    pub fn has_canonical_spelling(&self) -> bool {
        self.accidental.abs() <= 2
    }

    /// Simplest spelling of the same pitch class under a preference
    pub fn respell(&self, spelling: Spelling) -> Chroma {
        spelling.spell(self.pitch_class())
    }

    /// Move by an interval, keeping letter distance and semitone distance exact
    pub fn transpose(&self, interval: Interval) -> Chroma {
        let from = self.letter.index();
        let to = from + interval.steps();
        let natural_shift = natural_semitones(to) - natural_semitones(from);
        Chroma {
            letter: Letter::from_index(to),
            accidental: self.accidental + interval.semitones() - natural_shift,
        }
    }

    /// Move by a number of semitones, spelling the result with the
    /// process-wide preference
    pub fn transpose_semitones(&self, semitones: i32) -> Chroma {
        self.transpose_semitones_with(semitones, Spelling::default_preference())
    }

    pub fn transpose_semitones_with(&self, semitones: i32, spelling: Spelling) -> Chroma {
        spelling.spell(self.pitch_class() + semitones)
    }

    /// Letter followed by `#` or `b` markers. Spellings beyond a double
    /// accidental are respelled with the process-wide preference.
    pub fn to_notation(&self) -> String {
        self.to_notation_with(Spelling::default_preference())
    }

    pub fn to_notation_with(&self, spelling: Spelling) -> String {
        if !self.has_canonical_spelling() {
            let respelled = self.respell(spelling);
            log::debug!(
                "respelling {}{:+} as {} ({})",
                self.letter.as_char(),
                self.accidental,
                respelled,
                spelling.name()
            );
            return respelled.to_string();
        }
        self.to_string()
    }

    /// LilyPond name using English accidental words (`csharp`, `bflat`)
    pub fn lilypond(&self) -> String {
        let base = self.letter.as_char().to_ascii_lowercase().to_string();
        let word = if self.accidental > 0 { "sharp" } else { "flat" };
        base + &word.repeat(self.accidental.unsigned_abs() as usize)
    }
}

/// Sum of a run of accidental markers, all pointing the same way
fn parse_accidentals(markers: &str) -> std::result::Result<i32, String> {
    let mut total = 0;
    let mut direction = 0;
    for c in markers.chars() {
        let step: i32 = match c {
            '#' | '♯' => 1,
            'x' | '𝄪' => 2,
            'b' | '♭' => -1,
            '𝄫' => -2,
            _ => return Err(format!("unexpected '{}' in accidentals", c)),
        };
        if direction != 0 && direction != step.signum() {
            return Err("mixed sharps and flats".to_string());
        }
        direction = step.signum();
        total += step;
    }
    Ok(total)
}

impl Spelled for Chroma {
    fn diatonic_position(&self) -> i32 {
        self.letter.index()
    }

    fn chromatic_position(&self) -> i32 {
        self.letter.natural_pitch_class() + self.accidental
    }

    fn has_octave(&self) -> bool {
        false
    }
}

impl FromStr for Chroma {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self> {
        Chroma::from_notation(s)
    }
}

impl fmt::Display for Chroma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.accidental > 0 { "#" } else { "b" };
        write!(
            f,
            "{}{}",
            self.letter.as_char(),
            marker.repeat(self.accidental.unsigned_abs() as usize)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chroma(s: &str) -> Chroma {
        s.parse().unwrap()
    }

    #[test]
    fn test_chroma_parsing() {
        assert_eq!(chroma("C"), Chroma::C);
        assert_eq!(chroma("Eb"), Chroma::E_FLAT);
        assert_eq!(chroma("f#"), Chroma::new(Letter::F, 1));
        assert_eq!(chroma("bb"), Chroma::B_FLAT);
        assert_eq!(chroma("Bbb"), Chroma::new(Letter::B, -2));
        assert_eq!(chroma("Gx"), Chroma::new(Letter::G, 2));
        assert_eq!(chroma("C##"), Chroma::new(Letter::C, 2));
        assert_eq!(chroma("D♭"), Chroma::D_FLAT);
        assert_eq!(chroma(" A "), Chroma::A);
    }

    #[test]
    fn test_chroma_parse_errors() {
        assert!(Chroma::from_notation("H").unwrap_err().is_parse());
        assert!(Chroma::from_notation("").unwrap_err().is_parse());
        assert!(Chroma::from_notation("C#b").unwrap_err().is_parse());
        assert!(Chroma::from_notation("C4").unwrap_err().is_parse());
        assert!(Chroma::from_notation("Eq").unwrap_err().is_parse());
    }

    #[test]
    fn test_pitch_class() {
        assert_eq!(chroma("C").pitch_class(), 0);
        assert_eq!(chroma("B#").pitch_class(), 0);
        assert_eq!(chroma("Cb").pitch_class(), 11);
        assert_eq!(chroma("Fbb").pitch_class(), 3);
        assert_eq!(chroma("A").pitch_class(), 9);
    }

    #[test]
    fn test_dual_equality() {
        let cs = chroma("C#");
        let db = chroma("Db");
        assert!(cs.enharmonic_eq(&db));
        assert!(!cs.spelled_eq(&db));
        assert_ne!(cs, db);
        assert!(cs.spelled_eq(&chroma("C#")));
    }

    #[test]
    fn test_notation_display() {
        assert_eq!(chroma("C").to_notation(), "C");
        assert_eq!(chroma("Db").to_notation_with(Spelling::Sharps), "Db");
        assert_eq!(chroma("Fx").to_notation(), "F##");
        assert_eq!(Chroma::new(Letter::C, 3).to_notation_with(Spelling::Flats), "Eb");
        assert_eq!(Chroma::new(Letter::C, 3).to_notation_with(Spelling::Sharps), "D#");
        assert_eq!(Chroma::new(Letter::E, -4).to_notation_with(Spelling::Sharps), "C");
    }

    #[test]
    fn test_lilypond_names() {
        assert_eq!(chroma("C").lilypond(), "c");
        assert_eq!(chroma("C#").lilypond(), "csharp");
        assert_eq!(chroma("Bb").lilypond(), "bflat");
        assert_eq!(chroma("F##").lilypond(), "fsharpsharp");
        assert_eq!(chroma("Ebb").lilypond(), "eflatflat");
    }

    #[test]
    fn test_transposition_keeps_spelling() {
        let p5: Interval = "P5".parse().unwrap();
        assert_eq!(chroma("C").transpose(p5).to_string(), "G");
        assert_eq!(chroma("B").transpose(p5).to_string(), "F#");
        assert_eq!(chroma("Bb").transpose(p5).to_string(), "F");

        let m3: Interval = "m3".parse().unwrap();
        assert_eq!(chroma("C").transpose(m3).to_string(), "Eb");
        assert_eq!(chroma("A").transpose(m3).to_string(), "C");
        assert_eq!(chroma("D#").transpose(m3).to_string(), "F#");

        let a4: Interval = "A4".parse().unwrap();
        assert_eq!(chroma("F").transpose(a4).to_string(), "B");
        assert_eq!(chroma("C").transpose(-a4).to_string(), "Gb");
    }

    #[test]
    fn test_repeated_transposition_does_not_drift() {
        let a1: Interval = "A1".parse().unwrap();
        let mut c = Chroma::C;
        for _ in 0..12 {
            c = c.transpose(a1);
        }
        assert_eq!(c, Chroma::new(Letter::C, 12));
        assert!(c.enharmonic_eq(&Chroma::C));

        let p5: Interval = "P5".parse().unwrap();
        let mut circle = Chroma::C;
        for _ in 0..12 {
            circle = circle.transpose(p5);
        }
        assert_eq!(circle.to_string(), "B#");
    }

    #[test]
    fn test_semitone_transposition_uses_preference() {
        assert_eq!(Chroma::C.transpose_semitones_with(1, Spelling::Sharps).to_string(), "C#");
        assert_eq!(Chroma::C.transpose_semitones_with(1, Spelling::Flats).to_string(), "Db");
        assert_eq!(Chroma::C.transpose_semitones_with(-1, Spelling::Flats).to_string(), "B");
        assert_eq!(chroma("E#").respell(Spelling::Sharps).to_string(), "F");
    }

    #[test]
    fn test_letter_wrapping() {
        assert_eq!(Letter::from_index(7), Letter::C);
        assert_eq!(Letter::from_index(-1), Letter::B);
        assert_eq!(natural_semitones(7), 12);
        assert_eq!(natural_semitones(-1), -1);
    }
}
