//! Reversal engine for midireverse.
//!
//! Turns a stream into its time-reversed equivalent. Notes are mirrored
//! around the stream duration; tempo, program and controller events are
//! replayed through a [`GlobalState`] so that every reversed event asserts
//! the value that was in effect *before* its original counterpart.
//!
//! The engine is pure: no I/O, no logging, no shared state between calls.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod assemble;
mod channel_state;
mod controller_defaults;
mod global_state;
pub mod reverse;

pub use assemble::assemble;
pub use channel_state::{ChannelState, MAX_CONTROLLERS};
pub use controller_defaults::{controller_default, CONTROLLER_DEFAULTS};
pub use global_state::{GlobalState, MIDI_CHANNELS};
pub use reverse::{
    reverse, reverse_global_events, reverse_notes, reversed_time, stream_duration,
};
