use crate::error::{Result, TheoryError};
use crate::types::chroma::{natural_semitones, Chroma, Letter};
use crate::types::interval::{Interval, Spelled};
use crate::types::theory_config::{Spelling, Tuning};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A spelled chroma placed in an octave.
///
/// Octaves use scientific numbering: the octave number changes between B
/// and C, and C4 is middle C (MIDI 60). The octave belongs to the letter,
/// so B#4 sounds as C5 and Cb4 sounds as B3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pitch {
    chroma: Chroma,
    octave: i32,
}

impl Pitch {
    pub fn new(chroma: Chroma, octave: i32) -> Self {
        Pitch { chroma, octave }
    }

    /// Spell a MIDI number with the process-wide spelling preference
    pub fn from_midi(midi: i32) -> Self {
        Self::from_midi_with(midi, Spelling::default_preference())
    }

    pub fn from_midi_with(midi: i32, spelling: Spelling) -> Self {
        Pitch {
            chroma: spelling.spell(midi.rem_euclid(12)),
            octave: midi.div_euclid(12) - 1,
        }
    }

    /// Parse a note name with an optional octave number (`C4`, `Eb3`,
    /// `C#-1`). Without an octave the pitch is placed in octave 4.
    pub fn from_notation(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let split = trimmed
            .char_indices()
            .skip(1)
            .find(|(_, c)| c.is_ascii_digit() || *c == '-' || *c == '+')
            .map(|(i, _)| i)
            .unwrap_or(trimmed.len());
        let (name, octave_part) = trimmed.split_at(split);

        let chroma = Chroma::from_notation(name).map_err(|e| match e {
            TheoryError::Parse { reason, .. } => TheoryError::parse(text, reason),
            other => other,
        })?;

        let octave = if octave_part.is_empty() {
            4
        } else {
            octave_part
                .parse::<i32>()
                .map_err(|_| TheoryError::parse(text, format!("invalid octave '{}'", octave_part)))?
        };

        Ok(Pitch { chroma, octave })
    }

    /// Parse ABC music notation: `^` / `_` / `=` accidentals, `C`-`B` in
    /// octave 4, `c`-`b` in octave 5, `'` and `,` to move by octaves.
    pub fn from_abc(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let mut chars = trimmed.chars().peekable();

        let mut accidental = 0;
        let mut natural_sign = false;
        while let Some(&c) = chars.peek() {
            match c {
                '^' if accidental >= 0 && !natural_sign => accidental += 1,
                '_' if accidental <= 0 && !natural_sign => accidental -= 1,
                '=' if accidental == 0 && !natural_sign => natural_sign = true,
                '^' | '_' | '=' => return Err(TheoryError::parse(text, "conflicting accidentals")),
                _ => break,
            }
            chars.next();
        }

        let (letter, mut octave) = match chars.next() {
            Some(c) => {
                let letter = Letter::from_char(c)
                    .ok_or_else(|| TheoryError::parse(text, format!("unknown note letter '{}'", c)))?;
                (letter, if c.is_ascii_lowercase() { 5 } else { 4 })
            }
            None => return Err(TheoryError::parse(text, "missing note letter")),
        };

        for c in chars {
            match c {
                '\'' => octave += 1,
                ',' => octave -= 1,
                _ => return Err(TheoryError::parse(text, format!("unexpected '{}' in octave marks", c))),
            }
        }

        Ok(Pitch::new(Chroma::new(letter, accidental), octave))
    }

    pub fn chroma(&self) -> Chroma {
        self.chroma
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    pub fn pitch_class(&self) -> i32 {
        self.chroma.pitch_class()
    }

    /// Same chroma in another octave
    pub fn with_octave(&self, octave: i32) -> Pitch {
        Pitch::new(self.chroma, octave)
    }

    /// Absolute semitone number, C4 = 60
    pub fn midi(&self) -> i32 {
        12 + natural_semitones(self.diatonic_index()) + self.chroma.accidental()
    }

    /// Letter steps above C0
    pub fn diatonic_index(&self) -> i32 {
        self.octave * 7 + self.chroma.letter().index()
    }

    /// Frequency in Hz with A4 = 440 Hz
    pub fn frequency(&self) -> f64 {
        self.frequency_with(&Tuning::default())
    }

    pub fn frequency_with(&self, tuning: &Tuning) -> f64 {
        tuning.frequency_of(self.midi())
    }

    /// Same sound, regardless of spelling
    pub fn enharmonic_eq(&self, other: &Pitch) -> bool {
        self.midi() == other.midi()
    }

    /// Simplest spelling of the same sound under a preference
    pub fn respell(&self, spelling: Spelling) -> Pitch {
        Pitch::from_midi_with(self.midi(), spelling)
    }

    /// Move by an interval. The letter and octave follow the interval's
    /// letter steps; the accidental makes the semitone distance exact.
    pub fn transpose(&self, interval: Interval) -> Pitch {
        let from = self.diatonic_index();
        let to = from + interval.steps();
        let natural_shift = natural_semitones(to) - natural_semitones(from);
        Pitch {
            chroma: Chroma::new(
                Letter::from_index(to),
                self.chroma.accidental() + interval.semitones() - natural_shift,
            ),
            octave: to.div_euclid(7),
        }
    }

    /// Move by a number of semitones, spelling the result with the
    /// process-wide preference
    pub fn transpose_semitones(&self, semitones: i32) -> Pitch {
        self.transpose_semitones_with(semitones, Spelling::default_preference())
    }

    pub fn transpose_semitones_with(&self, semitones: i32, spelling: Spelling) -> Pitch {
        Pitch::from_midi_with(self.midi() + semitones, spelling)
    }

    /// Note name and octave, respelled with the process-wide preference
    /// when the chroma needs more than a double accidental
    pub fn to_notation(&self) -> String {
        self.to_notation_with(Spelling::default_preference())
    }

    pub fn to_notation_with(&self, spelling: Spelling) -> String {
        if self.chroma.has_canonical_spelling() {
            self.to_string()
        } else {
            self.respell(spelling).to_string()
        }
    }

    pub fn to_abc(&self) -> String {
        let accidental = self.chroma.accidental();
        let mut out = if accidental > 0 {
            "^".repeat(accidental as usize)
        } else {
            "_".repeat(accidental.unsigned_abs() as usize)
        };
        let letter = self.chroma.letter().as_char();
        if self.octave >= 5 {
            out.push(letter.to_ascii_lowercase());
            out.push_str(&"'".repeat((self.octave - 5) as usize));
        } else {
            out.push(letter);
            out.push_str(&",".repeat((4 - self.octave) as usize));
        }
        out
    }

    /// LilyPond absolute pitch, `c'` = C4
    pub fn lilypond(&self) -> String {
        let ticks = if self.octave >= 3 {
            "'".repeat((self.octave - 3) as usize)
        } else {
            ",".repeat((3 - self.octave) as usize)
        };
        self.chroma.lilypond() + &ticks
    }
}

impl Spelled for Pitch {
    fn diatonic_position(&self) -> i32 {
        self.diatonic_index()
    }

    fn chromatic_position(&self) -> i32 {
        self.midi() - 12
    }

    fn has_octave(&self) -> bool {
        true
    }
}

impl Ord for Pitch {
    fn cmp(&self, other: &Self) -> Ordering {
        self.midi()
            .cmp(&other.midi())
            .then(self.diatonic_index().cmp(&other.diatonic_index()))
    }
}

impl PartialOrd for Pitch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Pitch {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self> {
        Pitch::from_notation(s)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.chroma, self.octave)
    }
}
