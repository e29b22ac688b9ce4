// src/types/mod.rs

pub mod chroma;
pub mod interval;
pub mod pitch;
pub mod theory_config;
pub mod voicing;

pub use chroma::{Chroma, Letter};
pub use interval::{Interval, Quality, Spelled};
pub use pitch::Pitch;
pub use theory_config::{Spelling, Tuning};
pub use voicing::{scale_degree_label, Tone, Voicing, REST_LABEL};
