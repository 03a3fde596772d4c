//! Non-note events positioned on the stream timeline.

/// Standard MIDI default tempo: 500,000 µs per beat (120 BPM).
pub const DEFAULT_TEMPO: u32 = 500_000;

/// A non-note event at an absolute stream time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimedEvent {
    /// Absolute time in stream ticks
    pub time: u64,
    /// What the event does
    pub payload: EventPayload,
}

impl TimedEvent {
    /// Create a new event.
    pub fn new(time: u64, payload: EventPayload) -> Self {
        Self { time, payload }
    }
}

/// What an event does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventPayload {
    // === Global state ===
    /// Set tempo in microseconds per beat
    SetTempo(u32),

    // === Channel state ===
    /// Select the instrument on a channel
    ProgramChange { channel: u8, program: u8 },
    /// Set a continuous controller on a channel
    ControlChange {
        channel: u8,
        controller: u8,
        value: u8,
    },

    // === Positional metadata ===
    /// Time signature (denominator stored as a power of two, as in SMF)
    TimeSignature {
        numerator: u8,
        denominator: u8,
        clocks_per_click: u8,
        thirty_seconds_per_quarter: u8,
    },
    /// Key signature: sharps (negative = flats) and mode
    KeySignature { sharps: i8, minor: bool },
}

impl EventPayload {
    /// Control change shorthand.
    pub fn control(channel: u8, controller: u8, value: u8) -> Self {
        Self::ControlChange {
            channel,
            controller,
            value,
        }
    }
}
