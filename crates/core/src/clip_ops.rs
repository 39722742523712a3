//! Pure functions for clip interval operations, designed to be testable without a lane.

use std::cmp::Ordering;

use daw_timeline::{TimelinePosition, TimelineSettings, round_to_precision};

use crate::clip::{Clip, ClipIdAllocator};

/// Copy of `clip` under a fresh id.
pub fn copy_clip(clip: &Clip, ids: &mut ClipIdAllocator) -> Clip {
    let mut copy = clip.clone();
    copy.id = ids.next_id();
    copy
}

/// Copy of `clip` moved so it starts at `target`, keeping its id. Every
/// anchored position moves, so the source material stays aligned.
pub fn clip_at_pos(target: TimelinePosition, clip: &Clip, settings: &TimelineSettings) -> Clip {
    let mut moved = clip.clone();
    moved.move_to(target, settings);
    moved
}

/// Half-open overlap of the effective spans, plus the fully coincident case.
pub fn clips_overlap(a: &Clip, b: &Clip, settings: &TimelineSettings) -> bool {
    let a_start = a.start.to_fraction(settings);
    let a_end = a.effective_end().to_fraction(settings);
    let b_start = b.start.to_fraction(settings);
    let b_end = b.effective_end().to_fraction(settings);

    (a_start < b_end && a_end > b_start) || (a_start == b_start && a_end == b_end)
}

/// Splits `clip` at `pos` when `pos` lies strictly inside its effective span.
///
/// Returns the fragments in timeline order. The first fragment keeps the
/// original id; the others get fresh ones. Fragments that fall in the loop tail
/// are re-anchored on their repetition so they keep playing the same part of
/// the source.
pub fn slice_clip(
    clip: &Clip,
    pos: TimelinePosition,
    settings: &TimelineSettings,
    ids: &mut ClipIdAllocator,
) -> Vec<Clip> {
    let start = clip.start.to_fraction(settings);
    let end = clip.end.to_fraction(settings);
    let effective_end = clip.effective_end().to_fraction(settings);
    let at = pos.to_fraction(settings);

    if at <= start || at >= effective_end {
        return vec![clip.clone()];
    }

    log::trace!("slicing clip {:?} at {}", clip.id, pos);

    let width = end - start;

    if at < end {
        let mut head = clip.clone();
        head.end = pos;
        head.loop_end = None;

        let mut body = clip.clone();
        body.id = ids.next_id();
        body.start = pos;
        body.loop_end = None;

        let mut fragments = vec![head, body];

        if let Some(loop_end) = clip.loop_end.filter(|_| effective_end > end) {
            let mut tail = clip_at_pos(clip.end, clip, settings);
            tail.id = ids.next_id();
            close_loop_tail(&mut tail, loop_end, settings);
            fragments.push(tail);
        }

        fragments
    } else {
        let mut head = clip.clone();
        head.loop_end = (at > end).then_some(pos);

        let repetitions = round_to_precision((at - end) / width).floor();
        let offset = TimelinePosition::fraction_to_span(repetitions * width, settings);
        let repetition_start = clip.end.translated(offset, settings);

        let mut rest = clip_at_pos(repetition_start, clip, settings);
        rest.id = ids.next_id();
        rest.start = pos;
        close_loop_tail(&mut rest, clip.effective_end(), settings);

        vec![head, rest]
    }
}

/// Keeps the loop tail on a re-anchored fragment only if it extends past one
/// more repetition; otherwise the fragment simply ends at `loop_end`.
fn close_loop_tail(fragment: &mut Clip, loop_end: TimelinePosition, settings: &TimelineSettings) {
    if loop_end.compare(&fragment.end, settings) == Ordering::Greater {
        fragment.loop_end = Some(loop_end);
    } else {
        fragment.end = loop_end;
        fragment.loop_end = None;
    }
}

/// Carves the part of `existing` covered by `priority` out of it, keeping what
/// lies before `priority.start` and after its effective end.
pub fn remove_clip_overlap(
    existing: &Clip,
    priority: &Clip,
    settings: &TimelineSettings,
    ids: &mut ClipIdAllocator,
) -> Vec<Clip> {
    if !clips_overlap(existing, priority, settings) {
        return vec![existing.clone()];
    }

    let priority_start = priority.start;
    let priority_end = priority.effective_end();

    let mut front = Vec::new();
    let mut back = Vec::new();
    for fragment in slice_clip(existing, priority_end, settings, ids) {
        if fragment.start.compare(&priority_end, settings) == Ordering::Less {
            front.push(fragment);
        } else {
            back.push(fragment);
        }
    }

    let mut kept = Vec::new();
    for fragment in &front {
        for piece in slice_clip(fragment, priority_start, settings, ids) {
            if piece.effective_end().compare(&priority_start, settings) != Ordering::Greater {
                kept.push(piece);
            }
        }
    }
    kept.extend(back);

    // The surviving piece closest to the original keeps its identity.
    if let Some(first) = kept.first_mut() {
        first.id = existing.id;
    }

    kept
}

/// Makes a lane's clips mutually non-overlapping.
///
/// Clips overlapping `priority` are trimmed around it first. Remaining
/// conflicts are resolved in list order, with later clips winning over
/// earlier ones. `priority` itself, if present in `clips`, is never cut.
pub fn remove_all_clip_overlap(
    clips: &[Clip],
    priority: Option<&Clip>,
    settings: &TimelineSettings,
    ids: &mut ClipIdAllocator,
) -> Vec<Clip> {
    let is_priority = |clip: &Clip| priority.is_some_and(|p| p.id == clip.id);

    let mut resolved = Vec::with_capacity(clips.len());
    for clip in clips {
        match priority {
            Some(priority) if !is_priority(clip) => {
                resolved.extend(remove_clip_overlap(clip, priority, settings, ids));
            }
            _ => resolved.push(clip.clone()),
        }
    }

    let mut result = Vec::with_capacity(resolved.len());
    for (index, clip) in resolved.iter().enumerate() {
        if is_priority(clip) {
            result.push(clip.clone());
            continue;
        }

        let mut fragments = vec![clip.clone()];
        for later in &resolved[index + 1..] {
            let mut next = Vec::with_capacity(fragments.len());
            for fragment in &fragments {
                next.extend(remove_clip_overlap(fragment, later, settings, ids));
            }
            fragments = next;
        }
        result.extend(fragments);
    }

    result
}

/// Re-derives every anchored position of `clip` so that it keeps its pixel
/// layout after the timeline settings change from `previous` to `current`.
pub fn preserve_clip_margins(
    clip: &Clip,
    previous: &TimelineSettings,
    current: &TimelineSettings,
) -> Clip {
    let mut preserved = clip.clone();
    for pos in preserved.positions_mut() {
        *pos = TimelinePosition::from_margin(pos.to_margin(previous), current);
    }
    preserved
}
