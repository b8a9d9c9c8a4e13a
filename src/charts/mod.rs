//! Charts module - frame building and GIF rendering

mod animator;
mod frame;

pub use animator::{Animator, AnimatorError, FRAME_DELAY_MS, FRAME_SIZE};
pub use frame::{
    axis_limit, build_frame, build_frames, radius_series, FrameError, FrameSpec, Slice,
    SliceKind, MAX_RADIUS,
};
