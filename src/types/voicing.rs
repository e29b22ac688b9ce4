use crate::error::{Result, TheoryError};
use crate::types::chroma::{natural_semitones, Chroma};
use crate::types::interval::Interval;
use crate::types::pitch::Pitch;
use anyhow::Context;
#[cfg(feature = "colored")]
use colored::*;
use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Label produced by the analyses for a silent voice
pub const REST_LABEL: &str = "R";

/// One voice of a voicing: a sounding pitch or a silent placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Tone {
    Pitch(Pitch),
    Rest,
}

impl Tone {
    pub fn pitch(&self) -> Option<Pitch> {
        match self {
            Tone::Pitch(p) => Some(*p),
            Tone::Rest => None,
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, Tone::Rest)
    }

    /// Rests match rests; pitches match by sound
    pub fn enharmonic_eq(&self, other: &Tone) -> bool {
        match (self, other) {
            (Tone::Rest, Tone::Rest) => true,
            (Tone::Pitch(a), Tone::Pitch(b)) => a.enharmonic_eq(b),
            _ => false,
        }
    }

    pub fn transpose(&self, interval: Interval) -> Tone {
        match self {
            Tone::Pitch(p) => Tone::Pitch(p.transpose(interval)),
            Tone::Rest => Tone::Rest,
        }
    }
}

impl From<Pitch> for Tone {
    fn from(pitch: Pitch) -> Self {
        Tone::Pitch(pitch)
    }
}

impl FromStr for Tone {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "_" => Ok(Tone::Rest),
            other => Ok(Tone::Pitch(other.parse()?)),
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tone::Pitch(p) => write!(f, "{}", p),
            Tone::Rest => write!(f, "_"),
        }
    }
}

/// An ordered set of voices anchored to a root chroma.
///
/// The order of `tones` is the spacing of the chord and is kept by every
/// operation. Voicings are values: every operation returns a new one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Voicing {
    root: Chroma,
    tones: Vec<Tone>,
}

impl Voicing {
    pub fn new(root: Chroma, tones: Vec<Tone>) -> Self {
        Voicing { root, tones }
    }

    pub fn from_pitches(root: Chroma, pitches: Vec<Pitch>) -> Self {
        Voicing::new(root, pitches.into_iter().map(Tone::Pitch).collect())
    }

    /// Build a voicing on `root` from interval labels, e.g.
    /// `["P1", "M3", "P5", "m7"]` for a dominant seventh.
    pub fn from_intervals(root: Pitch, labels: &[&str]) -> anyhow::Result<Self> {
        let mut voicing = Voicing::new(root.chroma(), Vec::new());
        for (i, label) in labels.iter().enumerate() {
            let interval: Interval = label
                .parse()
                .with_context(|| format!("Invalid interval {} ('{}') for root {}", i + 1, label, root))?;
            voicing = voicing.add(Tone::Pitch(root.transpose(interval)));
        }
        log::debug!("built {} from {} intervals", voicing, labels.len());
        Ok(voicing)
    }

    /// Parse display notation such as `C[C4 E4 G4]`, rests written `_`
    pub fn from_notation(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let open = trimmed
            .find('[')
            .ok_or_else(|| TheoryError::parse(text, "expected '[' after the root"))?;
        let body = trimmed[open + 1..]
            .strip_suffix(']')
            .ok_or_else(|| TheoryError::parse(text, "expected closing ']'"))?;

        let root = Chroma::from_notation(&trimmed[..open])?;
        let tones = body
            .split_whitespace()
            .map(Tone::from_str)
            .collect::<Result<Vec<_>>>()?;
        Ok(Voicing { root, tones })
    }

    /// Parse `root_pitch_class,midi,midi,...` with rests written `_`.
    /// Spelling follows the process-wide preference.
    pub fn from_csv(csv: &str) -> Result<Self> {
        let mut fields = csv.trim().split(',').map(str::trim);
        let root_field = fields.next().unwrap_or_default();
        let root_pc: i32 = root_field
            .parse()
            .map_err(|_| TheoryError::parse(csv, format!("invalid root pitch class '{}'", root_field)))?;

        let mut tones = Vec::new();
        for field in fields {
            if field == "_" {
                tones.push(Tone::Rest);
                continue;
            }
            let midi: i32 = field
                .parse()
                .map_err(|_| TheoryError::parse(csv, format!("invalid MIDI number '{}'", field)))?;
            tones.push(Tone::Pitch(Pitch::from_midi(midi)));
        }
        Ok(Voicing::new(Chroma::from_pitch_class(root_pc), tones))
    }

    pub fn root(&self) -> Chroma {
        self.root
    }

    pub fn tones(&self) -> &[Tone] {
        &self.tones
    }

    /// Sounding pitches in voice order
    pub fn pitches(&self) -> impl Iterator<Item = Pitch> + '_ {
        self.tones.iter().filter_map(Tone::pitch)
    }

    /// Number of voices, rests included
    pub fn len(&self) -> usize {
        self.tones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tones.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Tone> {
        self.tones.get(index)
    }

    /// Index of the first voice that sounds like `tone`
    pub fn position(&self, tone: &Tone) -> Option<usize> {
        self.tones.iter().position(|t| t.enharmonic_eq(tone))
    }

    pub fn contains(&self, tone: &Tone) -> bool {
        self.position(tone).is_some()
    }

    pub fn lowest(&self) -> Option<Pitch> {
        self.pitches().min()
    }

    /// The root placed at or below the lowest sounding pitch
    pub fn root_pitch(&self) -> Option<Pitch> {
        let lowest = self.lowest()?;
        let mut root = Pitch::new(self.root, lowest.octave());
        while root.diatonic_index() > lowest.diatonic_index() || root.midi() > lowest.midi() {
            root = root.with_octave(root.octave() - 1);
        }
        Some(root)
    }

    /// Transpose the root and every sounding voice; rests stay put
    pub fn transpose(&self, interval: Interval) -> Voicing {
        Voicing {
            root: self.root.transpose(interval),
            tones: self.tones.iter().map(|t| t.transpose(interval)).collect(),
        }
    }

    /// Transpose so that the root (placed under the lowest voice) lands
    /// on `target`
    pub fn transpose_to(&self, target: Pitch) -> Result<Voicing> {
        let interval = match self.root_pitch() {
            Some(root) => Interval::between(&root, &target)?,
            None => Interval::between(&self.root, &target.chroma())?,
        };
        Ok(self.transpose(interval))
    }

    /// A copy with `tone` appended as the new last voice
    pub fn add(&self, tone: Tone) -> Voicing {
        let mut tones = self.tones.clone();
        tones.push(tone);
        Voicing {
            root: self.root,
            tones,
        }
    }

    /// A copy without the first voice that sounds like `tone`.
    /// Removing a tone that is not present returns an equal voicing.
    pub fn remove(&self, tone: &Tone) -> Voicing {
        let mut tones = self.tones.clone();
        match self.position(tone) {
            Some(index) => {
                tones.remove(index);
            }
            None => log::trace!("{} not in {}, nothing removed", tone, self),
        }
        Voicing {
            root: self.root,
            tones,
        }
    }

    /// Voices by ascending pitch, rests last
    pub fn sorted(&self) -> Voicing {
        let mut pitches: Vec<Pitch> = self.pitches().collect();
        pitches.sort();
        let rests = self.tones.len() - pitches.len();
        let mut tones: Vec<Tone> = pitches.into_iter().map(Tone::Pitch).collect();
        tones.extend(std::iter::repeat(Tone::Rest).take(rests));
        Voicing {
            root: self.root,
            tones,
        }
    }

    /// Scale-degree label of every voice relative to the root, in voice
    /// order. Rests produce [`REST_LABEL`].
    pub fn tones_analysis(&self) -> Result<Vec<String>> {
        let root = match self.root_pitch() {
            Some(root) => root,
            None => return Ok(self.tones.iter().map(|_| REST_LABEL.to_string()).collect()),
        };

        self.tones
            .iter()
            .map(|tone| -> Result<String> {
                match tone {
                    Tone::Pitch(p) => Ok(scale_degree_label(&Interval::between(&root, p)?)),
                    Tone::Rest => Ok(REST_LABEL.to_string()),
                }
            })
            .collect()
    }

    /// Chord-symbol names of every voice (`sus4`, `add9`, `dom7`, ...),
    /// choosing between enharmonic names by looking at the other voices.
    pub fn chord_tones(&self) -> Vec<String> {
        let root = match self.root_pitch() {
            Some(root) => root,
            None => return self.tones.iter().map(|_| REST_LABEL.to_string()).collect(),
        };
        let offsets: BTreeSet<i32> = self
            .pitches()
            .map(|p| (p.pitch_class() - self.root.pitch_class()).rem_euclid(12))
            .collect();
        let has = |wanted: &[i32]| wanted.iter().any(|o| offsets.contains(o));

        self.tones
            .iter()
            .map(|tone| {
                let p = match tone {
                    Tone::Pitch(p) => *p,
                    Tone::Rest => return REST_LABEL.to_string(),
                };
                let compound = p.midi() - root.midi() > 12;
                let name = match (p.pitch_class() - self.root.pitch_class()).rem_euclid(12) {
                    0 => "1",
                    1 => "b9",
                    2 if compound => if has(&[10, 11]) { "9" } else { "add9" },
                    2 => if has(&[3, 4]) { "add2" } else { "sus2" },
                    3 => if has(&[4]) { "#9" } else { "min3" },
                    4 => "maj3",
                    5 if compound => if has(&[10, 11]) { "11" } else { "add11" },
                    5 => if has(&[3, 4]) { "add4" } else { "sus4" },
                    6 if has(&[4, 7, 9]) => "#11",
                    6 if has(&[3, 5]) => "b5",
                    6 => if compound { "#11" } else { "b5" },
                    7 => "5",
                    8 => if has(&[1, 3, 5, 6, 7, 9, 10]) { "b13" } else { "#5" },
                    9 if compound => "13",
                    9 if [0, 3, 6].iter().all(|o| offsets.contains(o)) && !has(&[10, 11]) => "dim7",
                    9 => "6",
                    10 => if has(&[4]) { "dom7" } else { "min7" },
                    _ => "maj7",
                };
                name.to_string()
            })
            .collect()
    }

    /// Lower the given voices by an octave. Voices are counted from the
    /// top (1 = highest pitch); rests are not counted and numbers outside
    /// the voice count are ignored. Every voice keeps its position.
    pub fn drop(&self, voices: &[usize]) -> Voicing {
        let mut ranked: Vec<(usize, Pitch)> = self
            .tones
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.pitch().map(|p| (i, p)))
            .collect();
        ranked.sort_by_key(|&(i, p)| (Reverse(p), i));

        let mut tones = self.tones.clone();
        let selected: BTreeSet<usize> = voices.iter().copied().collect();
        for voice in selected {
            match voice.checked_sub(1).and_then(|k| ranked.get(k)) {
                Some(&(index, pitch)) => {
                    tones[index] = Tone::Pitch(pitch.transpose(-Interval::OCTAVE));
                }
                None => log::debug!("drop: no voice {} in {}", voice, self),
            }
        }
        Voicing {
            root: self.root,
            tones,
        }
    }

    /// Second voice from the top down an octave
    pub fn drop2(&self) -> Voicing {
        self.drop(&[2])
    }

    /// Third voice from the top down an octave
    pub fn drop3(&self) -> Voicing {
        self.drop(&[3])
    }

    /// Second and fourth voices from the top down an octave
    pub fn drop2_and_4(&self) -> Voicing {
        self.drop(&[2, 4])
    }

    /// Same shape at another pitch level: equal rest positions, equal
    /// semitone gaps between voices and the same root relative to them
    pub fn is_transposition_of(&self, other: &Voicing) -> bool {
        if self.len() != other.len() {
            return false;
        }
        let rests_match = self
            .tones
            .iter()
            .zip(&other.tones)
            .all(|(a, b)| a.is_rest() == b.is_rest());
        if !rests_match {
            return false;
        }

        let (first, other_first) = match (self.pitches().next(), other.pitches().next()) {
            (Some(a), Some(b)) => (a, b),
            _ => return self.root.enharmonic_eq(&other.root),
        };
        let shift = other_first.midi() - first.midi();
        self.pitches()
            .zip(other.pitches())
            .all(|(a, b)| b.midi() - a.midi() == shift)
            && (other.root.pitch_class() - self.root.pitch_class() - shift).rem_euclid(12) == 0
    }

    /// Every pitch of `other` sounds in `self`, and `self` has more
    pub fn is_superset_of(&self, other: &Voicing) -> bool {
        let all_present = other
            .pitches()
            .all(|p| self.pitches().any(|q| q.enharmonic_eq(&p)));
        all_present && self.pitches().count() > other.pitches().count()
    }

    /// Lower voices of every pair whose distance has the size of
    /// `interval` (any spelling of that size)
    pub fn lowers_of(&self, interval: Interval) -> Vec<Pitch> {
        let pitches: Vec<Pitch> = self.pitches().collect();
        let mut lowers = Vec::new();
        for (i, lower) in pitches.iter().enumerate() {
            for upper in &pitches[i + 1..] {
                if upper.midi() - lower.midi() == interval.semitones() {
                    lowers.push(*lower);
                }
            }
        }
        lowers
    }

    /// Semitones from voice `i` (row) up to each later voice `j` (column);
    /// cells with `j <= i` are zero
    pub fn matrix(&self) -> Vec<Vec<i32>> {
        let pitches: Vec<Pitch> = self.pitches().collect();
        if pitches.len() <= 1 {
            return Vec::new();
        }
        (0..pitches.len() - 1)
            .map(|i| {
                (0..pitches.len())
                    .map(|j| if j > i { pitches[j].midi() - pitches[i].midi() } else { 0 })
                    .collect()
            })
            .collect()
    }

    /// `root_pitch_class,midi,midi,...` with rests written `_`
    pub fn to_csv(&self) -> String {
        let mut fields = vec![self.root.pitch_class().to_string()];
        fields.extend(self.tones.iter().map(|t| match t {
            Tone::Pitch(p) => p.midi().to_string(),
            Tone::Rest => "_".to_string(),
        }));
        fields.join(",")
    }

    /// LilyPond chord such as `<c' e' g'>`; rests are left out
    pub fn lilypond(&self) -> String {
        let notes: Vec<String> = self.pitches().map(|p| p.lilypond()).collect();
        format!("<{}>", notes.join(" "))
    }

    #[cfg(feature = "colored")]
    pub fn to_colored_string(&self) -> String {
        let tones: Vec<String> = self
            .tones
            .iter()
            .map(|t| match t {
                Tone::Pitch(p) => p.to_string().cyan().to_string(),
                Tone::Rest => "_".bright_black().to_string(),
            })
            .collect();
        format!(
            "{}[{}]",
            self.root.to_string().magenta().bold(),
            tones.join(" ")
        )
    }
}

/// Scale-degree label of an ascending interval above a chord root.
///
/// Thirds and sevenths read `maj3`, `min3`, `maj7`, `b7`; other degrees are
/// the degree number with `#`/`b` for each semitone away from the major or
/// perfect size. Seconds, fourths and sixths above the octave become 9, 11
/// and 13.
pub fn scale_degree_label(interval: &Interval) -> String {
    let compound = interval.steps().abs() > 7;
    let simple = interval.reduce();
    let number = simple.number().abs();

    let fixed = match (number, simple.semitones()) {
        (1, 0) | (8, 12) => Some("1"),
        (3, 4) => Some("maj3"),
        (3, 3) => Some("min3"),
        (5, 7) => Some("5"),
        (7, 10) => Some("b7"),
        (7, 11) => Some("maj7"),
        _ => None,
    };
    if let Some(label) = fixed {
        return label.to_string();
    }

    let alteration = simple.semitones().abs() - natural_semitones(simple.steps().abs());
    let prefix = if alteration > 0 { "#" } else { "b" }.repeat(alteration.unsigned_abs() as usize);
    let degree = match number {
        8 => 1,
        2 | 4 | 6 if compound => number + 7,
        n => n,
    };
    format!("{}{}", prefix, degree)
}

impl FromStr for Voicing {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self> {
        Voicing::from_notation(s)
    }
}

impl fmt::Display for Voicing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tones: Vec<String> = self.tones.iter().map(|t| t.to_string()).collect();
        write!(f, "{}[{}]", self.root, tones.join(" "))
    }
}
