use std::cmp::Ordering;

use daw_timeline::{TimelinePosition, TimelineSettings};

use crate::clip::{Clip, ClipId, ClipIdAllocator};
use crate::clip_ops::{preserve_clip_margins, remove_all_clip_overlap};

/// The clips of one track lane.
#[derive(Debug, Clone, Default)]
pub struct Lane {
    /// Clips are always sorted by start and non-overlapping.
    /// Use insert_clip() to add clips - it enforces the invariant.
    clips: Vec<Clip>,
}

impl Lane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list of clips, inserting each one (resolving overlaps)
    pub fn from_clips(
        clips: Vec<Clip>,
        settings: &TimelineSettings,
        ids: &mut ClipIdAllocator,
    ) -> Self {
        let mut lane = Self::new();
        for clip in clips {
            lane.insert_clip(clip, settings, ids);
        }
        lane
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn clip(&self, id: ClipId) -> Option<&Clip> {
        self.clips.iter().find(|clip| clip.id == id)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Insert a clip, trimming/splitting/removing any overlapping clips.
    /// The new clip takes priority - existing clips in its range are modified.
    /// A clip already on the lane with the same id is replaced.
    pub fn insert_clip(&mut self, clip: Clip, settings: &TimelineSettings, ids: &mut ClipIdAllocator) {
        // Overlap resolution passes the priority's id through untouched
        self.clips.retain(|existing| existing.id != clip.id);
        let before = self.clips.len();
        let mut clips = remove_all_clip_overlap(&self.clips, Some(&clip), settings, ids);
        log::debug!(
            "inserting clip {:?} at {}: {} existing clips became {}",
            clip.id,
            clip.start,
            before,
            clips.len()
        );

        clips.push(clip);
        clips.sort_by(|a, b| a.start.compare(&b.start, settings));
        self.clips = clips;
    }

    /// Replace the clip with the same id after a drag or resize, re-resolving
    /// overlaps with the updated clip taking priority. Returns `false` if no
    /// clip has that id.
    pub fn update_clip(&mut self, clip: Clip, settings: &TimelineSettings, ids: &mut ClipIdAllocator) -> bool {
        if self.remove_clip(clip.id).is_none() {
            return false;
        }
        self.insert_clip(clip, settings, ids);
        true
    }

    pub fn remove_clip(&mut self, id: ClipId) -> Option<Clip> {
        let index = self.clips.iter().position(|clip| clip.id == id)?;
        Some(self.clips.remove(index))
    }

    pub fn clear_clips(&mut self) {
        self.clips.clear();
    }

    /// Keeps every clip at the same pixels after a tempo, zoom or time
    /// signature change.
    pub fn preserve_margins(&mut self, previous: &TimelineSettings, current: &TimelineSettings) {
        for clip in &mut self.clips {
            *clip = preserve_clip_margins(clip, previous, current);
        }
    }

    /// Latest effective end of any clip on the lane.
    pub fn end(&self, settings: &TimelineSettings) -> Option<TimelinePosition> {
        self.clips
            .iter()
            .map(Clip::effective_end)
            .max_by(|a, b| a.compare(b, settings))
    }

    /// The clip whose effective span contains `pos`.
    pub fn clip_at(&self, pos: TimelinePosition, settings: &TimelineSettings) -> Option<&Clip> {
        self.clips.iter().find(|clip| {
            pos.compare(&clip.start, settings) != Ordering::Less
                && pos.compare(&clip.effective_end(), settings) == Ordering::Less
        })
    }
}
