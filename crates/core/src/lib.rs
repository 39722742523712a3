pub mod clip;
pub mod clip_ops;
pub mod config;
pub mod lane;

pub use clip::{Clip, ClipAudio, ClipId, ClipIdAllocator, ClipKind};
pub use clip_ops::{
    clip_at_pos, clips_overlap, copy_clip, preserve_clip_margins, remove_all_clip_overlap,
    remove_clip_overlap, slice_clip,
};
pub use config::{ConfigError, EditorConfig, SnapConfig};
pub use lane::Lane;

pub use daw_timeline::{
    ClockTime, Direction, DirectionalTimelineSpan, ParsePositionError, SnapMode, TimeSignature,
    TimelinePosition, TimelineSettings, TimelineSpan,
};
