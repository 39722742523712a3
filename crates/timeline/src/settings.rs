use serde::{Deserialize, Serialize};

use crate::FRACTIONS_PER_BEAT;

/// Width in pixels of one quarter-note beat at a horizontal scale of 1.
pub const BASE_BEAT_WIDTH: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub beats: u32,
    pub note_value: u32,
}

impl TimeSignature {
    pub fn new(beats: u32, note_value: u32) -> Self {
        Self { beats, note_value }
    }

    pub fn beats_per_measure(&self) -> u32 {
        self.beats
    }

    /// Length of one beat relative to a quarter note (2.0 for x/2, 0.5 for x/8).
    pub fn quarter_notes_per_beat(&self) -> f64 {
        4.0 / self.note_value as f64
    }

    /// A signature the engine can compute with: at least one beat per measure
    /// and a power-of-two note value.
    pub fn is_valid(&self) -> bool {
        self.beats >= 1 && self.note_value >= 1 && self.note_value.is_power_of_two()
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::new(4, 4)
    }
}

impl From<(u32, u32)> for TimeSignature {
    fn from((beats, note_value): (u32, u32)) -> Self {
        Self::new(beats, note_value)
    }
}

impl From<TimeSignature> for (u32, u32) {
    fn from(ts: TimeSignature) -> Self {
        (ts.beats, ts.note_value)
    }
}

/// The timeline state every position computation is evaluated against.
///
/// Positions do not capture settings: the caller passes the current value into
/// each call, so a multi-step computation sees one consistent snapshot as long
/// as the same reference is used throughout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSettings {
    pub horizontal_scale: f64,
    pub time_signature: TimeSignature,
    pub tempo: f64,
}

impl TimelineSettings {
    pub fn new(horizontal_scale: f64, time_signature: impl Into<TimeSignature>, tempo: f64) -> Self {
        Self {
            horizontal_scale,
            time_signature: time_signature.into(),
            tempo,
        }
    }

    pub fn beats_per_measure(&self) -> i64 {
        i64::from(self.time_signature.beats_per_measure())
    }

    pub fn fractions_per_measure(&self) -> f64 {
        self.beats_per_measure() as f64 * FRACTIONS_PER_BEAT
    }

    pub fn beat_width(&self) -> f64 {
        BASE_BEAT_WIDTH * self.horizontal_scale * self.time_signature.quarter_notes_per_beat()
    }

    pub fn measure_width(&self) -> f64 {
        self.beat_width() * self.beats_per_measure() as f64
    }

    pub fn beats_per_second(&self) -> f64 {
        self.tempo / 60.0
    }
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self::new(1.0, TimeSignature::default(), 120.0)
    }
}
