//! Configuration types for spelling and tuning
//!
//! These are plain data values. `Spelling` decides which accidental is used
//! when a bare pitch class has to be given a name; `Tuning` anchors the
//! equal-tempered frequency mapping.

use crate::types::chroma::{Chroma, Letter};
use std::sync::atomic::{AtomicU8, Ordering};

/// Which accidental to prefer when a pitch class must be (re)spelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Spelling {
    #[default]
    Flats,
    Sharps,
}

// 0 = Flats, 1 = Sharps
static DEFAULT_SPELLING: AtomicU8 = AtomicU8::new(0);

impl Spelling {
    /// Parse a spelling preference from a string (case-insensitive)
    pub fn from_name(s: &str) -> Option<Spelling> {
        match s.trim().to_lowercase().as_str() {
            "flats" | "flat" | "b" => Some(Spelling::Flats),
            "sharps" | "sharp" | "#" => Some(Spelling::Sharps),
            _ => None,
        }
    }

    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            Spelling::Flats => "flats",
            Spelling::Sharps => "sharps",
        }
    }

    /// The process-wide preference consulted by respelling operations
    /// that are not given an explicit one.
    pub fn default_preference() -> Spelling {
        match DEFAULT_SPELLING.load(Ordering::Acquire) {
            1 => Spelling::Sharps,
            _ => Spelling::Flats,
        }
    }

    /// Replace the process-wide preference, returning the previous one.
    ///
    /// Values that already exist keep their spelling; only later
    /// respelling decisions see the new preference.
    pub fn set_default_preference(spelling: Spelling) -> Spelling {
        let raw = match spelling {
            Spelling::Flats => 0,
            Spelling::Sharps => 1,
        };
        match DEFAULT_SPELLING.swap(raw, Ordering::AcqRel) {
            1 => Spelling::Sharps,
            _ => Spelling::Flats,
        }
    }

    /// Spell a pitch class (taken mod 12) with at most one accidental
    pub fn spell(self, pitch_class: i32) -> Chroma {
        let pc = pitch_class.rem_euclid(12);
        if let Some(letter) = Letter::ALL.iter().find(|l| l.natural_pitch_class() == pc) {
            return Chroma::natural(*letter);
        }
        match self {
            Spelling::Sharps => Chroma::new(Self::natural_at(pc - 1), 1),
            Spelling::Flats => Chroma::new(Self::natural_at(pc + 1), -1),
        }
    }

    // Only called with a neighbour of a black key, which is always a white key.
    fn natural_at(pitch_class: i32) -> Letter {
        let pc = pitch_class.rem_euclid(12);
        Letter::ALL
            .iter()
            .copied()
            .find(|l| l.natural_pitch_class() == pc)
            .unwrap_or(Letter::C)
    }
}

/// Equal-tempered tuning reference
///
/// - `reference_midi`: MIDI number of the reference pitch (69 = A4)
/// - `reference_freq`: frequency of the reference pitch in Hz
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tuning {
    pub reference_midi: i32,
    pub reference_freq: f64,
}

impl Tuning {
    /// Create a custom tuning
    pub fn new(reference_midi: i32, reference_freq: f64) -> Self {
        Self {
            reference_midi,
            reference_freq,
        }
    }

    /// Concert pitch, A4 = 440 Hz
    pub fn a440() -> Self {
        Self::new(69, 440.0)
    }

    /// Baroque pitch, A4 = 415 Hz
    pub fn baroque() -> Self {
        Self::new(69, 415.0)
    }

    /// Frequency in Hz of a MIDI-numbered pitch.
    ///
    /// Whole octaves are applied as an exact power of two so that moving a
    /// pitch up an octave doubles its frequency without rounding error.
    pub fn frequency_of(&self, midi: i32) -> f64 {
        let distance = midi - self.reference_midi;
        let octaves = distance.div_euclid(12);
        let semitones = distance.rem_euclid(12);
        self.reference_freq * 2.0_f64.powi(octaves) * 2.0_f64.powf(semitones as f64 / 12.0)
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::a440()
    }
}
