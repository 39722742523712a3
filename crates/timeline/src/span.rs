use serde::{Deserialize, Serialize};

/// A relative musical duration, not anchored to any position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSpan {
    pub measures: i64,
    pub beats: i64,
    pub fraction: f64,
}

impl TimelineSpan {
    pub fn new(measures: i64, beats: i64, fraction: f64) -> Self {
        Self {
            measures,
            beats,
            fraction,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn measures(measures: i64) -> Self {
        Self::new(measures, 0, 0.0)
    }

    pub fn beats(beats: i64) -> Self {
        Self::new(0, beats, 0.0)
    }

    pub fn fraction(fraction: f64) -> Self {
        Self::new(0, 0, fraction)
    }

    pub fn is_zero(&self) -> bool {
        self.measures == 0 && self.beats == 0 && self.fraction == 0.0
    }

    pub fn forward(self) -> DirectionalTimelineSpan {
        DirectionalTimelineSpan::new(self, Direction::Forward)
    }

    pub fn backward(self) -> DirectionalTimelineSpan {
        DirectionalTimelineSpan::new(self, Direction::Backward)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    pub fn from_sign(value: f64) -> Self {
        if value < 0.0 {
            Direction::Backward
        } else {
            Direction::Forward
        }
    }

    pub fn signum(self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// A span together with the direction it should be applied in.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DirectionalTimelineSpan {
    pub span: TimelineSpan,
    pub direction: Direction,
}

impl DirectionalTimelineSpan {
    pub fn new(span: TimelineSpan, direction: Direction) -> Self {
        Self { span, direction }
    }

    pub fn is_backward(&self) -> bool {
        self.direction == Direction::Backward
    }

    pub fn reversed(self) -> Self {
        Self::new(self.span, self.direction.reversed())
    }
}

impl From<TimelineSpan> for DirectionalTimelineSpan {
    fn from(span: TimelineSpan) -> Self {
        span.forward()
    }
}
