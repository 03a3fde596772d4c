//! Notes with absolute start time and length.

/// A note: a note-on/note-off pair collapsed into one value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Note {
    /// Key number (0-127)
    pub pitch: u8,
    /// MIDI channel (0-15)
    pub channel: u8,
    /// Absolute start time in stream ticks
    pub start: u64,
    /// Length in stream ticks
    pub length: u64,
    /// Note-on velocity (0-127)
    pub velocity: u8,
    /// Note-off velocity (0-127)
    pub off_velocity: u8,
}

impl Note {
    /// Create a note with default on/off velocities.
    pub const fn new(pitch: u8, channel: u8, start: u64, length: u64) -> Self {
        Self {
            pitch,
            channel,
            start,
            length,
            velocity: 64,
            off_velocity: 0,
        }
    }

    /// Builder-style velocity override.
    pub const fn with_velocities(self, velocity: u8, off_velocity: u8) -> Self {
        Self {
            velocity,
            off_velocity,
            ..self
        }
    }

    /// Tick at which the note is released.
    pub const fn end(&self) -> u64 {
        self.start.saturating_add(self.length)
    }
}
