//! Stream container: tracks plus the time division they are measured in.

use alloc::vec::Vec;
use arrayvec::ArrayString;

use crate::event::TimedEvent;
use crate::note::Note;

/// Tick base declared by the stream header.
///
/// Carried through reversal untouched; no event is re-quantized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeDivision {
    /// Metrical timing: ticks per beat (quarter note)
    TicksPerBeat(u16),
    /// SMPTE timing: frames per second (24, 25, 29 or 30) and ticks per frame
    Timecode {
        frames_per_second: u8,
        ticks_per_frame: u8,
    },
}

impl Default for TimeDivision {
    fn default() -> Self {
        Self::TicksPerBeat(480)
    }
}

/// One track of a stream: notes plus non-note events.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Track {
    /// Track name (empty when the track has none)
    pub name: ArrayString<32>,
    /// Notes, ordered by start time
    pub notes: Vec<Note>,
    /// Non-note events, ordered by time
    pub events: Vec<TimedEvent>,
}

impl Track {
    /// Create a new empty track with a name.
    ///
    /// Names longer than 32 bytes are cut at the last char that fits.
    pub fn new(name: &str) -> Self {
        let mut track = Self::default();
        track.set_name(name);
        track
    }

    /// Build a track holding only notes.
    pub fn from_notes(notes: Vec<Note>) -> Self {
        Self {
            notes,
            ..Self::default()
        }
    }

    /// Build a track holding only timed events.
    pub fn from_events(events: Vec<TimedEvent>) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }

    /// Replace the track name, truncating to capacity.
    pub fn set_name(&mut self, name: &str) {
        self.name.clear();
        for c in name.chars() {
            if self.name.try_push(c).is_err() {
                break;
            }
        }
    }

    /// True when the track holds neither notes nor events.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty() && self.events.is_empty()
    }
}

/// A complete performance: ordered tracks and their time division.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stream {
    /// Tracks in file order
    pub tracks: Vec<Track>,
    /// Tick base shared by every track
    pub division: TimeDivision,
}

impl Stream {
    /// Build a stream from tracks.
    pub fn new(tracks: Vec<Track>, division: TimeDivision) -> Self {
        Self { tracks, division }
    }

    /// Every note of every track, in track order.
    pub fn notes(&self) -> impl Iterator<Item = &Note> + '_ {
        self.tracks.iter().flat_map(|t| t.notes.iter())
    }

    /// Every timed event of every track, in track order.
    ///
    /// No global time ordering is promised across tracks.
    pub fn timed_events(&self) -> impl Iterator<Item = &TimedEvent> + '_ {
        self.tracks.iter().flat_map(|t| t.events.iter())
    }

    /// Total number of notes across tracks.
    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(|t| t.notes.len()).sum()
    }

    /// Total number of timed events across tracks.
    pub fn event_count(&self) -> usize {
        self.tracks.iter().map(|t| t.events.len()).sum()
    }
}
