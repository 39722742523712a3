use std::cmp::Ordering;
use std::path::PathBuf;

use daw_timeline::{DirectionalTimelineSpan, TimelinePosition, TimelineSettings, TimelineSpan};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClipId(pub u64);

/// Hands out clip ids for copies and for the fragments produced by slicing.
#[derive(Debug, Clone)]
pub struct ClipIdAllocator {
    next: u64,
}

impl ClipIdAllocator {
    pub fn new(first: u64) -> Self {
        Self { next: first }
    }

    pub fn next_id(&mut self) -> ClipId {
        let id = ClipId(self.next);
        self.next += 1;
        id
    }

    /// The id the next call to `next_id` will return.
    pub fn peek(&self) -> ClipId {
        ClipId(self.next)
    }
}

impl Default for ClipIdAllocator {
    fn default() -> Self {
        Self::new(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipKind {
    Audio,
    Midi,
}

/// Where the clip's source material sits on the timeline. Moves with the clip
/// but is left alone by resizes, so trimmed edges keep playing the same audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipAudio {
    pub source: PathBuf,
    pub start: TimelinePosition,
    pub end: TimelinePosition,
}

/// A region on a lane.
///
/// Content plays over `[start, end)`. When `loop_end` lies after `end`, the
/// content repeats from `end` up to `loop_end`. The limits bound resizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: ClipId,
    pub name: String,
    pub kind: ClipKind,
    pub muted: bool,
    pub start: TimelinePosition,
    pub end: TimelinePosition,
    pub start_limit: Option<TimelinePosition>,
    pub end_limit: Option<TimelinePosition>,
    pub loop_end: Option<TimelinePosition>,
    pub audio: Option<ClipAudio>,
}

impl Clip {
    pub fn new(
        id: ClipId,
        name: impl Into<String>,
        kind: ClipKind,
        start: TimelinePosition,
        end: TimelinePosition,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            muted: false,
            start,
            end,
            start_limit: None,
            end_limit: None,
            loop_end: None,
            audio: None,
        }
    }

    /// An audio clip dropped at `start` that covers the whole source. The
    /// source bounds become the resize limits.
    pub fn from_audio(
        id: ClipId,
        name: impl Into<String>,
        source: impl Into<PathBuf>,
        start: TimelinePosition,
        length: TimelineSpan,
        settings: &TimelineSettings,
    ) -> Self {
        let end = start.added(length, settings);
        let mut clip = Self::new(id, name, ClipKind::Audio, start, end);
        clip.start_limit = Some(start);
        clip.end_limit = Some(end);
        clip.audio = Some(ClipAudio {
            source: source.into(),
            start,
            end,
        });
        clip
    }

    /// Same rule as [`Clip::set_loop_end`]: a tail at or before `end` is
    /// not kept.
    pub fn with_loop_end(mut self, loop_end: TimelinePosition, settings: &TimelineSettings) -> Self {
        self.set_loop_end(loop_end, settings);
        self
    }

    pub fn with_limits(
        mut self,
        start_limit: Option<TimelinePosition>,
        end_limit: Option<TimelinePosition>,
    ) -> Self {
        self.start_limit = start_limit;
        self.end_limit = end_limit;
        self
    }

    /// End of the clip including any loop tail.
    pub fn effective_end(&self) -> TimelinePosition {
        self.loop_end.unwrap_or(self.end)
    }

    /// Width of one pass over the content, in fraction units.
    pub fn content_width(&self, settings: &TimelineSettings) -> f64 {
        self.end.to_fraction(settings) - self.start.to_fraction(settings)
    }

    /// Width of one pass over the content, in pixels.
    pub fn content_margin(&self, settings: &TimelineSettings) -> f64 {
        self.end.to_margin(settings) - self.start.to_margin(settings)
    }

    pub fn is_looped(&self, settings: &TimelineSettings) -> bool {
        self.loop_end
            .is_some_and(|loop_end| loop_end.compare(&self.end, settings) == Ordering::Greater)
    }

    /// Every position anchored to the timeline, for bulk transforms.
    pub(crate) fn positions_mut(&mut self) -> impl Iterator<Item = &mut TimelinePosition> {
        let (audio_start, audio_end) = match self.audio.as_mut() {
            Some(audio) => (Some(&mut audio.start), Some(&mut audio.end)),
            None => (None, None),
        };
        [&mut self.start, &mut self.end]
            .into_iter()
            .chain(self.start_limit.as_mut())
            .chain(self.end_limit.as_mut())
            .chain(self.loop_end.as_mut())
            .chain(audio_start)
            .chain(audio_end)
    }

    /// Drags the clip: every anchored position moves by `span`.
    pub fn move_by(&mut self, span: DirectionalTimelineSpan, settings: &TimelineSettings) {
        for pos in self.positions_mut() {
            pos.translate(span, settings);
        }
    }

    /// Drags the clip so that it starts at `pos`.
    pub fn move_to(&mut self, pos: TimelinePosition, settings: &TimelineSettings) {
        let span = pos.diff(&self.start, settings);
        self.move_by(span, settings);
    }

    /// Moves the left edge, clamped to `start_limit`. Returns `false` when the
    /// edge would reach or pass `end`.
    pub fn resize_start(&mut self, pos: TimelinePosition, settings: &TimelineSettings) -> bool {
        let pos = match self.start_limit {
            Some(limit) if pos.compare(&limit, settings) == Ordering::Less => limit,
            _ => pos,
        };
        if pos.compare(&self.end, settings) != Ordering::Less {
            return false;
        }
        self.start = pos;
        true
    }

    /// Moves the right edge, clamped to `end_limit`. A loop tail that no
    /// longer reaches past the new end is dropped.
    pub fn resize_end(&mut self, pos: TimelinePosition, settings: &TimelineSettings) -> bool {
        let pos = match self.end_limit {
            Some(limit) if pos.compare(&limit, settings) == Ordering::Greater => limit,
            _ => pos,
        };
        if pos.compare(&self.start, settings) != Ordering::Greater {
            return false;
        }
        self.end = pos;
        if !self.is_looped(settings) {
            self.loop_end = None;
        }
        true
    }

    /// Loop-resize: only `loop_end` moves. Anything at or before `end`
    /// removes the tail.
    pub fn set_loop_end(&mut self, pos: TimelinePosition, settings: &TimelineSettings) {
        self.loop_end = (pos.compare(&self.end, settings) == Ordering::Greater).then_some(pos);
    }
}
