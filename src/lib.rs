//! # Voicing
//!
//! Symbolic music theory with exact enharmonic spelling: chromas (spelled
//! pitch classes), pitches, intervals and chord voicings.
//!
//! Intervals are measured in letter steps and semitones at the same time,
//! so transposing `C` by a minor third gives `Eb` rather than `D#`, and
//! repeated transpositions never drift.
//!
//! ## Features
//!
//! - **serde**: Serialize/deserialize every value type
//! - **colored**: Colored terminal rendering of voicings
//!
//! ## Example
//!
//! ```
//! use voicing::{Chroma, Interval, Voicing};
//!
//! let p5: Interval = "P5".parse().unwrap();
//! assert_eq!(Chroma::C.transpose(p5).to_notation(), "G");
//!
//! let c_major: Voicing = "C[C4 E4 G4]".parse().unwrap();
//! assert_eq!(c_major.transpose(p5).to_string(), "G[G4 B4 D5]");
//! assert_eq!(c_major.tones_analysis().unwrap(), vec!["1", "maj3", "5"]);
//! ```

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{Result, TheoryError};
pub use types::{Chroma, Interval, Letter, Pitch, Quality, Spelling, Tone, Tuning, Voicing};
