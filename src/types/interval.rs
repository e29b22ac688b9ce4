use crate::error::{Result, TheoryError};
use crate::types::chroma::{checked_natural_semitones, natural_semitones};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

/// Anything with a letter position and a semitone position that an
/// interval can be measured between.
///
/// Positions only need to be consistent with each other: an interval is
/// computed from their differences.
pub trait Spelled {
    /// Letter steps above C (C0 for pitches)
    fn diatonic_position(&self) -> i32;

    /// Semitones above C (C0 for pitches), not wrapped
    fn chromatic_position(&self) -> i32;

    /// False for pitch classes, whose distance is taken within one octave
    fn has_octave(&self) -> bool;
}

/// Interval quality. Augmented and diminished carry their degree
/// (2 = doubly augmented, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Quality {
    Perfect,
    Major,
    Minor,
    Augmented(u32),
    Diminished(u32),
}

/// Unisons, fourths, fifths and octaves
fn is_perfect_family(steps: i32) -> bool {
    matches!(steps.rem_euclid(7), 0 | 3 | 4)
}

impl Quality {
    /// Semitones away from the perfect/major size, or `None` if this
    /// quality does not exist for the given family
    fn deviation(self, perfect_family: bool) -> Option<i32> {
        match (self, perfect_family) {
            (Quality::Perfect, true) | (Quality::Major, false) => Some(0),
            (Quality::Minor, false) => Some(-1),
            (Quality::Augmented(n), _) if n > 0 => Some(n as i32),
            (Quality::Diminished(n), true) if n > 0 => Some(-(n as i32)),
            (Quality::Diminished(n), false) if n > 0 => Some(-(n as i32) - 1),
            _ => None,
        }
    }

    fn from_deviation(deviation: i32, perfect_family: bool) -> Quality {
        match (deviation, perfect_family) {
            (0, true) => Quality::Perfect,
            (0, false) => Quality::Major,
            (-1, false) => Quality::Minor,
            (d, _) if d > 0 => Quality::Augmented(d as u32),
            (d, true) => Quality::Diminished(d.unsigned_abs()),
            (d, false) => Quality::Diminished(d.unsigned_abs() - 1),
        }
    }

    /// The quality of the inverted interval
    pub fn invert(self) -> Quality {
        match self {
            Quality::Perfect => Quality::Perfect,
            Quality::Major => Quality::Minor,
            Quality::Minor => Quality::Major,
            Quality::Augmented(n) => Quality::Diminished(n),
            Quality::Diminished(n) => Quality::Augmented(n),
        }
    }

    /// Short notation: `P`, `M`, `m`, `A`, `AA`, `d`, `dd`, ...
    pub fn notation(self) -> String {
        match self {
            Quality::Perfect => "P".to_string(),
            Quality::Major => "M".to_string(),
            Quality::Minor => "m".to_string(),
            Quality::Augmented(n) => "A".repeat(n as usize),
            Quality::Diminished(n) => "d".repeat(n as usize),
        }
    }

    /// Parse a quality prefix; repeated `A`/`d` give the degree
    pub fn from_notation(s: &str) -> Option<Quality> {
        match s {
            "P" => Some(Quality::Perfect),
            "M" => Some(Quality::Major),
            "m" => Some(Quality::Minor),
            _ if !s.is_empty() && s.chars().all(|c| c == 'A') => {
                Some(Quality::Augmented(s.len() as u32))
            }
            _ if !s.is_empty() && s.chars().all(|c| c == 'd') => {
                Some(Quality::Diminished(s.len() as u32))
            }
            _ => None,
        }
    }
}

/// A signed distance measured both in letter steps and in semitones.
///
/// Quality is never stored; it is derived from the two distances, so the
/// diatonic and chromatic views cannot disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    steps: i32,     // letter steps, 0 = unison
    semitones: i32, // chromatic size
}

impl Interval {
    pub const UNISON: Interval = Interval::from_steps(0, 0);
    pub const MINOR_SECOND: Interval = Interval::from_steps(1, 1);
    pub const MAJOR_SECOND: Interval = Interval::from_steps(1, 2);
    pub const MINOR_THIRD: Interval = Interval::from_steps(2, 3);
    pub const MAJOR_THIRD: Interval = Interval::from_steps(2, 4);
    pub const PERFECT_FOURTH: Interval = Interval::from_steps(3, 5);
    pub const TRITONE: Interval = Interval::from_steps(3, 6);
    pub const DIMINISHED_FIFTH: Interval = Interval::from_steps(4, 6);
    pub const PERFECT_FIFTH: Interval = Interval::from_steps(4, 7);
    pub const MINOR_SIXTH: Interval = Interval::from_steps(5, 8);
    pub const MAJOR_SIXTH: Interval = Interval::from_steps(5, 9);
    pub const MINOR_SEVENTH: Interval = Interval::from_steps(6, 10);
    pub const MAJOR_SEVENTH: Interval = Interval::from_steps(6, 11);
    pub const OCTAVE: Interval = Interval::from_steps(7, 12);

    /// Build from raw letter steps and semitones
    pub const fn from_steps(steps: i32, semitones: i32) -> Self {
        Interval { steps, semitones }
    }

    /// Build from a diatonic number (1 = unison, negative = descending)
    /// and a quality.
    pub fn new(number: i32, quality: Quality) -> Result<Self> {
        if number == 0 {
            return Err(TheoryError::invalid_interval(number, "there is no zeroth interval"));
        }
        let steps = number
            .checked_abs()
            .ok_or_else(|| TheoryError::invalid_interval(number, "interval is too wide"))?
            - 1;
        if steps == 0 && matches!(quality, Quality::Diminished(_)) {
            return Err(TheoryError::invalid_interval(number, "a unison cannot be diminished"));
        }
        let deviation = quality.deviation(is_perfect_family(steps)).ok_or_else(|| {
            TheoryError::invalid_interval(
                number,
                format!("quality '{}' does not apply to this number", quality.notation()),
            )
        })?;

        let semitones = checked_natural_semitones(steps)
            .and_then(|natural| natural.checked_add(deviation))
            .ok_or_else(|| TheoryError::invalid_interval(number, "interval is too wide"))?;
        let ascending = Interval::from_steps(steps, semitones);
        Ok(if number < 0 { -ascending } else { ascending })
    }

    /// `n` octaves (negative for descending)
    pub fn octaves(n: i32) -> Self {
        Interval::from_steps(7 * n, 12 * n)
    }

    /// The interval from `a` up (or down) to `b`.
    ///
    /// Between pitch classes the result is the ascending interval within
    /// one octave. Between pitches it is signed.
    pub fn between<T: Spelled + ?Sized, U: Spelled + ?Sized>(a: &T, b: &U) -> Result<Self> {
        let mut steps = b.diatonic_position() - a.diatonic_position();
        let mut semitones = b.chromatic_position() - a.chromatic_position();

        if !a.has_octave() || !b.has_octave() {
            let octaves = steps.div_euclid(7);
            steps -= 7 * octaves;
            semitones -= 12 * octaves;
            if steps == 0 && semitones < 0 {
                steps += 7;
                semitones += 12;
            }
        }

        let interval = Interval::from_steps(steps, semitones);
        let rebuilt = Interval::new(interval.number(), interval.quality())?;
        if rebuilt != interval {
            return Err(TheoryError::invalid_interval(
                interval.number(),
                format!(
                    "{} semitones disagree with quality {}",
                    semitones,
                    interval.quality().notation()
                ),
            ));
        }
        log::trace!("interval of {} steps, {} semitones is {}", steps, semitones, interval);
        Ok(interval)
    }

    /// Parse short notation such as `P5`, `m3`, `AA4`, `-M2` or `U`
    pub fn from_notation(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let (sign, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, trimmed),
        };
        if body == "U" {
            return Ok(Interval::UNISON);
        }

        let split = body.find(|c: char| c.is_ascii_digit()).unwrap_or(body.len());
        let (quality_part, number_part) = body.split_at(split);

        let quality = Quality::from_notation(quality_part).ok_or_else(|| {
            TheoryError::parse(text, format!("unknown interval quality '{}'", quality_part))
        })?;
        let number: i32 = number_part
            .parse()
            .map_err(|_| TheoryError::parse(text, format!("invalid interval number '{}'", number_part)))?;
        if number < 1 {
            return Err(TheoryError::parse(text, "interval number must be positive"));
        }

        Interval::new(sign * number, quality)
    }

    pub fn steps(&self) -> i32 {
        self.steps
    }

    pub fn semitones(&self) -> i32 {
        self.semitones
    }

    pub fn is_descending(&self) -> bool {
        self.steps < 0 || (self.steps == 0 && self.semitones < 0)
    }

    /// Diatonic number: 1 = unison, 3 = third, negative when descending
    pub fn number(&self) -> i32 {
        let size = self.steps.abs() + 1;
        if self.is_descending() {
            -size
        } else {
            size
        }
    }

    pub fn quality(&self) -> Quality {
        let (steps, semitones) = if self.is_descending() {
            (-self.steps, -self.semitones)
        } else {
            (self.steps, self.semitones)
        };
        Quality::from_deviation(semitones - natural_semitones(steps), is_perfect_family(steps))
    }

    /// Wider than an octave
    pub fn is_compound(&self) -> bool {
        self.steps.abs() > 7
    }

    pub fn is_simple(&self) -> bool {
        !self.is_compound()
    }

    /// Collapse a compound interval to its simple form (at most an octave)
    pub fn reduce(&self) -> Interval {
        if self.is_descending() {
            return -(-*self).reduce();
        }
        if self.steps <= 7 {
            return *self;
        }
        let octaves = (self.steps - 1) / 7;
        Interval::from_steps(self.steps - 7 * octaves, self.semitones - 12 * octaves)
    }

    /// The interval that completes an octave, e.g. M3 <-> m6
    pub fn invert(&self) -> Interval {
        if self.is_descending() {
            return -(-*self).invert();
        }
        let simple = self.reduce();
        Interval::from_steps(7 - simple.steps, 12 - simple.semitones)
    }

    pub fn add(&self, other: Interval) -> Interval {
        Interval::from_steps(self.steps + other.steps, self.semitones + other.semitones)
    }

    pub fn sub(&self, other: Interval) -> Interval {
        self.add(other.negate())
    }

    pub fn negate(&self) -> Interval {
        Interval::from_steps(-self.steps, -self.semitones)
    }

    pub fn to_notation(&self) -> String {
        self.to_string()
    }
}

impl Ord for Interval {
    fn cmp(&self, other: &Self) -> Ordering {
        self.semitones
            .cmp(&other.semitones)
            .then(self.steps.cmp(&other.steps))
    }
}

impl PartialOrd for Interval {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for Interval {
    type Output = Interval;

    fn add(self, other: Interval) -> Self::Output {
        Interval::add(&self, other)
    }
}

impl Sub for Interval {
    type Output = Interval;

    fn sub(self, other: Interval) -> Self::Output {
        Interval::sub(&self, other)
    }
}

impl Neg for Interval {
    type Output = Interval;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl FromStr for Interval {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self> {
        Interval::from_notation(s)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_descending() {
            write!(f, "-")?;
        }
        write!(f, "{}{}", self.quality().notation(), self.number().abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::chroma::Chroma;
    use crate::types::pitch::Pitch;

    fn interval(s: &str) -> Interval {
        s.parse().unwrap()
    }

    #[test]
    fn test_interval_parsing() {
        assert_eq!(interval("P5").semitones(), 7);
        assert_eq!(interval("P5").steps(), 4);
        assert_eq!(interval("m3").semitones(), 3);
        assert_eq!(interval("M3").semitones(), 4);
        assert_eq!(interval("A4").semitones(), 6);
        assert_eq!(interval("d5").semitones(), 6);
        assert_eq!(interval("dd7").semitones(), 8);
        assert_eq!(interval("AA4").semitones(), 7);
        assert_eq!(interval("M9").semitones(), 14);
        assert_eq!(interval("P8"), Interval::OCTAVE);
        assert_eq!(interval("U"), Interval::UNISON);
        assert_eq!(interval("-P5"), Interval::from_steps(-4, -7));
    }

    #[test]
    fn test_interval_parse_errors() {
        assert!(Interval::from_notation("X5").unwrap_err().is_parse());
        assert!(Interval::from_notation("P").unwrap_err().is_parse());
        assert!(Interval::from_notation("Pfive").unwrap_err().is_parse());
        assert!(Interval::from_notation("P0").unwrap_err().is_parse());
        assert!(Interval::from_notation("Ad4").unwrap_err().is_parse());
        assert!(Interval::from_notation("").unwrap_err().is_parse());
    }

    #[test]
    fn test_quality_family_mismatch() {
        assert!(Interval::from_notation("P3").unwrap_err().is_invalid_interval());
        assert!(Interval::from_notation("M5").unwrap_err().is_invalid_interval());
        assert!(Interval::from_notation("m8").unwrap_err().is_invalid_interval());
        assert!(Interval::from_notation("d1").unwrap_err().is_invalid_interval());
        assert!(Interval::new(0, Quality::Perfect).unwrap_err().is_invalid_interval());
    }

    #[test]
    fn test_interval_display() {
        for s in ["P1", "m2", "M2", "A2", "m3", "d4", "P4", "A4", "d5", "P5", "m6", "M7", "P8", "M9", "P11", "-m3", "AA4", "dd7"] {
            assert_eq!(interval(s).to_notation(), s);
        }
    }

    #[test]
    fn test_between_chromas() {
        let c = Chroma::C;
        assert_eq!(Interval::between(&c, &Chroma::E_FLAT).unwrap().to_notation(), "m3");
        assert_eq!(Interval::between(&c, &Chroma::G).unwrap().to_notation(), "P5");
        assert_eq!(Interval::between(&Chroma::G, &c).unwrap().to_notation(), "P4");
        assert_eq!(Interval::between(&c, &"D#".parse::<Chroma>().unwrap()).unwrap().to_notation(), "A2");
        assert_eq!(Interval::between(&Chroma::B, &c).unwrap().to_notation(), "m2");
        assert_eq!(Interval::between(&c, &"Cb".parse::<Chroma>().unwrap()).unwrap().to_notation(), "d8");
        assert_eq!(Interval::between(&c, &"C#".parse::<Chroma>().unwrap()).unwrap().to_notation(), "A1");
        assert_eq!(Interval::between(&c, &c).unwrap(), Interval::UNISON);
    }

    #[test]
    fn test_between_pitches() {
        let c4: Pitch = "C4".parse().unwrap();
        let e5: Pitch = "E5".parse().unwrap();
        let g3: Pitch = "G3".parse().unwrap();
        assert_eq!(Interval::between(&c4, &e5).unwrap().to_notation(), "M10");
        assert_eq!(Interval::between(&c4, &g3).unwrap().to_notation(), "-P4");
        assert_eq!(Interval::between(&g3, &c4).unwrap().to_notation(), "P4");

        let cs4: Pitch = "C#4".parse().unwrap();
        assert_eq!(Interval::between(&cs4, &c4).unwrap().to_notation(), "-A1");
    }

    #[test]
    fn test_oversized_number_is_an_error() {
        assert!(Interval::from_notation("P2000000000").unwrap_err().is_invalid_interval());
        assert!(Interval::from_notation("M2147483647").unwrap_err().is_invalid_interval());
        assert!(Interval::from_notation("P99999999999").unwrap_err().is_parse());
        assert!(Interval::new(i32::MIN, Quality::Perfect).unwrap_err().is_invalid_interval());
        assert_eq!(interval("P22").semitones(), 36);
    }

    #[test]
    fn test_between_chroma_and_pitch() {
        let e4: Pitch = "E4".parse().unwrap();
        assert_eq!(Interval::between(&Chroma::C, &e4).unwrap().to_notation(), "M3");
        assert_eq!(Interval::between(&e4, &Chroma::G).unwrap().to_notation(), "m3");
        assert_eq!(Interval::between(&e4, &Chroma::C).unwrap().to_notation(), "m6");

        let bb2: Pitch = "Bb2".parse().unwrap();
        assert_eq!(Interval::between(&Chroma::D, &bb2).unwrap().to_notation(), "m6");
        assert_eq!(Interval::between(&bb2, &Chroma::E_FLAT).unwrap().to_notation(), "P4");

        let c_flat: Chroma = "Cb".parse().unwrap();
        let c5: Pitch = "C5".parse().unwrap();
        assert_eq!(Interval::between(&c5, &c_flat).unwrap().to_notation(), "d8");
    }

    #[test]
    fn test_invert() {
        assert_eq!(interval("M3").invert(), interval("m6"));
        assert_eq!(interval("P5").invert(), interval("P4"));
        assert_eq!(interval("A4").invert(), interval("d5"));
        assert_eq!(interval("P1").invert(), interval("P8"));
        assert_eq!(interval("P8").invert(), interval("P1"));
        assert_eq!(interval("M9").invert(), interval("m7"));
        assert_eq!(interval("-m3").invert(), interval("-M6"));
    }

    #[test]
    fn test_reduce() {
        assert_eq!(interval("M9").reduce(), interval("M2"));
        assert_eq!(interval("P12").reduce(), interval("P5"));
        assert_eq!(interval("m13").reduce(), interval("m6"));
        assert_eq!(interval("P15").reduce(), interval("P8"));
        assert_eq!(interval("A11").reduce(), interval("A4"));
        assert_eq!(interval("P8").reduce(), interval("P8"));
        assert_eq!(interval("-M10").reduce(), interval("-M3"));
        assert!(interval("M9").is_compound());
        assert!(interval("P8").is_simple());
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(interval("P5") + interval("P4"), Interval::OCTAVE);
        assert_eq!(interval("M3") + interval("m3"), interval("P5"));
        assert_eq!(interval("M3") + interval("M3"), interval("A5"));
        assert_eq!(interval("m3") + interval("m3"), interval("d5"));
        assert_eq!(interval("P5") - interval("M3"), interval("m3"));
        assert_eq!(interval("M2") - interval("P5"), interval("-P4"));
        assert_eq!(-interval("M6"), interval("-M6"));
        assert_eq!(interval("M3").add(Interval::octaves(1)), interval("M10"));
    }

    #[test]
    fn test_ordering() {
        assert!(interval("m3") < interval("M3"));
        assert!(interval("A4") < interval("d5"));
        assert!(interval("-P5") < interval("U"));
    }

    #[test]
    fn test_quality_roundtrip_through_constructor() {
        for number in 1..=15 {
            let steps = number - 1;
            for deviation in -3..=3 {
                let i = Interval::from_steps(steps, natural_semitones(steps) + deviation);
                if i.is_descending() {
                    continue;
                }
                let rebuilt = Interval::new(i.number(), i.quality()).unwrap();
                assert_eq!(rebuilt, i, "{}", i);
            }
        }
    }
}
