//! Musical time for the editor timeline: `measure.beat.fraction` positions,
//! their arithmetic, and conversion to pixels and wall-clock time.

mod format;
mod position;
mod settings;
mod span;

pub use format::{ClockTime, ParsePositionError};
pub use position::{SnapMode, TimelinePosition, round_to_precision};
pub use settings::{BASE_BEAT_WIDTH, TimeSignature, TimelineSettings};
pub use span::{Direction, DirectionalTimelineSpan, TimelineSpan};

/// Fraction units per beat.
pub const FRACTIONS_PER_BEAT: f64 = 1000.0;
