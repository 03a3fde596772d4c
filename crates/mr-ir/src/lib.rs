//! Core stream types for midireverse.
//!
//! This crate defines the in-memory representation of a MIDI performance.
//! The SMF reader emits it, the reversal engine transforms it, and the
//! writer serializes it back.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod event;
mod note;
mod stream;

pub use event::{EventPayload, TimedEvent, DEFAULT_TEMPO};
pub use note::Note;
pub use stream::{Stream, TimeDivision, Track};
