use std::fmt;
use std::str::FromStr;

use crate::{TimelinePosition, TimelineSettings};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParsePositionError {
    #[error("expected at most 3 segments (measure.beat.fraction), found {0}")]
    TooManySegments(usize),

    #[error("segment {0} is empty")]
    EmptySegment(usize),

    #[error("invalid {segment} '{value}'")]
    InvalidNumber { segment: &'static str, value: String },

    #[error("fraction '{0}' is not a finite number")]
    NonFinite(String),
}

const SEGMENT_NAMES: [&str; 3] = ["measure", "beat", "fraction"];

impl FromStr for TimelinePosition {
    type Err = ParsePositionError;

    /// Parses `measure[.beat[.fraction]]`. Omitted trailing parts default to
    /// `1`, `1` and `0`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.trim().split('.').map(str::trim).collect();
        if segments.len() > SEGMENT_NAMES.len() {
            return Err(ParsePositionError::TooManySegments(segments.len()));
        }

        let last = segments.len() - 1;
        for (index, segment) in segments.iter().enumerate() {
            // "3." is accepted, ".2" and "3..5" are not
            if segment.is_empty() && (index == 0 || index < last) {
                return Err(ParsePositionError::EmptySegment(index));
            }
        }

        let segment = |index: usize| segments.get(index).copied().filter(|s| !s.is_empty());

        let integer = |index: usize, default: i64| match segment(index) {
            Some(value) => value
                .parse::<i64>()
                .map_err(|_| ParsePositionError::InvalidNumber {
                    segment: SEGMENT_NAMES[index],
                    value: value.to_string(),
                }),
            None => Ok(default),
        };

        let measure = integer(0, 1)?;
        let beat = integer(1, 1)?;
        let fraction = match segment(2) {
            Some(value) => {
                let fraction = value
                    .parse::<f64>()
                    .map_err(|_| ParsePositionError::InvalidNumber {
                        segment: SEGMENT_NAMES[2],
                        value: value.to_string(),
                    })?;
                if !fraction.is_finite() {
                    return Err(ParsePositionError::NonFinite(value.to_string()));
                }
                fraction
            }
            None => 0.0,
        };

        Ok(Self::new(measure, beat, fraction))
    }
}

impl TimelinePosition {
    /// Parses a dotted literal, returning `None` for anything malformed.
    pub fn parse_from_string(text: &str) -> Option<Self> {
        text.parse().ok()
    }

    /// Formats with the fraction fixed to `precision` decimals.
    pub fn to_string_with_precision(&self, precision: usize) -> String {
        format!(
            "{}.{}.{:.*}",
            self.measure,
            self.beat,
            precision,
            positive_zero(self.fraction)
        )
    }

    pub fn to_time(&self, settings: &TimelineSettings) -> ClockTime {
        ClockTime::from_seconds(self.to_seconds(settings))
    }

    pub fn to_time_string(&self, settings: &TimelineSettings) -> String {
        self.to_time(settings).to_string()
    }
}

impl fmt::Display for TimelinePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.measure,
            self.beat,
            positive_zero(self.fraction)
        )
    }
}

fn positive_zero(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

/// Wall-clock time split into display components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockTime {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub milliseconds: u64,
}

impl ClockTime {
    /// Times before the origin clamp to zero.
    pub fn from_seconds(seconds: f64) -> Self {
        let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
        Self {
            hours: total_ms / 3_600_000,
            minutes: total_ms / 60_000 % 60,
            seconds: total_ms / 1000 % 60,
            milliseconds: total_ms % 1000,
        }
    }

    pub fn total_seconds(&self) -> f64 {
        (self.hours * 3600 + self.minutes * 60 + self.seconds) as f64
            + self.milliseconds as f64 / 1000.0
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hours > 0 {
            write!(
                f,
                "{}:{:02}:{:02}.{:03}",
                self.hours, self.minutes, self.seconds, self.milliseconds
            )
        } else {
            write!(
                f,
                "{}:{:02}.{:03}",
                self.minutes, self.seconds, self.milliseconds
            )
        }
    }
}
