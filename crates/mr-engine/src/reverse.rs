//! Time reversal of notes and state events.
//!
//! Everything pivots on a single stream duration: the latest note end
//! across all tracks. An event at original time `t` lands at
//! `duration - t` (clamped at zero).
//!
//! State events are handled by a forward scan. Playing backward, the
//! moment a value is *entered* in the original is the moment it is *left*
//! in the reversal, so each reversed event carries the value the original
//! event replaced. Whatever holds at the end of the original becomes the
//! initial state of the reversal, emitted at time zero.

use alloc::vec::Vec;
use mr_ir::{EventPayload, Note, Stream, TimedEvent, Track, DEFAULT_TEMPO};

use crate::assemble::assemble;
use crate::channel_state::ChannelState;
use crate::controller_defaults::controller_default;
use crate::global_state::GlobalState;

/// Reverse a whole stream.
///
/// The result holds one track of reconstructed state events (omitted when
/// empty) followed by one track of reversed notes per input track.
pub fn reverse(stream: &Stream) -> Stream {
    let duration = stream_duration(stream.notes());
    let global_events = reverse_global_events(stream.timed_events(), duration);

    let note_tracks = stream
        .tracks
        .iter()
        .map(|track| Track {
            name: track.name,
            notes: reverse_notes(&track.notes, duration),
            events: Vec::new(),
        })
        .collect();

    assemble(global_events, note_tracks, stream.division)
}

/// Latest note end, or 0 when there are no notes.
pub fn stream_duration<'a>(notes: impl IntoIterator<Item = &'a Note>) -> u64 {
    notes.into_iter().map(Note::end).max().unwrap_or(0)
}

/// Mirror `time` around `duration`, clamping at zero.
pub const fn reversed_time(time: u64, duration: u64) -> u64 {
    duration.saturating_sub(time)
}

/// Mirror note timing around `duration`.
///
/// A note ending at `e` starts at `duration - e` in the reversal; every
/// other field is kept. The result is sorted by reversed start.
pub fn reverse_notes<'a>(notes: impl IntoIterator<Item = &'a Note>, duration: u64) -> Vec<Note> {
    let mut reversed: Vec<Note> = notes
        .into_iter()
        .map(|note| Note {
            start: reversed_time(note.end(), duration),
            ..*note
        })
        .collect();
    reversed.sort_by_key(|note| note.start);
    reversed
}

/// Reverse non-note events, reconstructing channel and tempo state.
///
/// `events` may come in any order; they are scanned in stable
/// ascending-time order. The result is sorted by reversed time, ties
/// keeping emission order.
pub fn reverse_global_events<'a>(
    events: impl IntoIterator<Item = &'a TimedEvent>,
    duration: u64,
) -> Vec<TimedEvent> {
    let mut ordered: Vec<&TimedEvent> = events.into_iter().collect();
    ordered.sort_by_key(|event| event.time);

    let mut scan = ReverseScan::new(duration);
    for event in ordered {
        scan.step(event);
    }
    scan.finish()
}

/// Scratch state for one forward scan. Lives for a single call.
struct ReverseScan {
    duration: u64,
    state: GlobalState,
    output: Vec<TimedEvent>,
}

impl ReverseScan {
    fn new(duration: u64) -> Self {
        Self {
            duration,
            state: GlobalState::new(),
            output: Vec::new(),
        }
    }

    fn emit(&mut self, time: u64, payload: EventPayload) {
        self.output.push(TimedEvent::new(time, payload));
    }

    fn emit_reversed(&mut self, original_time: u64, payload: EventPayload) {
        let time = reversed_time(original_time, self.duration);
        self.emit(time, payload);
    }

    fn step(&mut self, event: &TimedEvent) {
        match event.payload {
            // Positional metadata stays where it was.
            EventPayload::TimeSignature { .. } | EventPayload::KeySignature { .. } => {
                self.emit(event.time, event.payload);
            }
            EventPayload::SetTempo(tempo) => {
                let previous = self.state.set_tempo(tempo);
                self.emit_reversed(event.time, EventPayload::SetTempo(previous));
            }
            EventPayload::ProgramChange { channel, program } => {
                self.program_change(event.time, channel, program);
            }
            EventPayload::ControlChange {
                channel,
                controller,
                value,
            } => {
                self.control_change(event.time, channel, controller, value);
            }
        }
    }

    fn program_change(&mut self, time: u64, channel: u8, program: u8) {
        let previous = match self.state.channel_mut(channel) {
            Some(channel_state) => channel_state.set_program(program),
            None => {
                // Nothing is known about what preceded the channel's first
                // appearance: assume the default instrument.
                self.state.register(channel, ChannelState::with_program(program));
                0
            }
        };
        self.emit_reversed(
            time,
            EventPayload::ProgramChange {
                channel,
                program: previous,
            },
        );
    }

    fn control_change(&mut self, time: u64, channel: u8, controller: u8, value: u8) {
        let previous = match self.state.channel_mut(channel) {
            Some(channel_state) => channel_state.record_control(controller, value),
            None => {
                let mut channel_state = ChannelState::new();
                channel_state.record_control(controller, value);
                self.state.register(channel, channel_state);
                None
            }
        };

        // First sighting of a controller without a known default emits
        // nothing here; its final value is asserted at time zero instead.
        let Some(restored) = previous.or_else(|| controller_default(controller)) else {
            return;
        };
        self.emit_reversed(time, EventPayload::control(channel, controller, restored));
    }

    /// Emit the end-of-original state at time zero and sort the output.
    fn finish(mut self) -> Vec<TimedEvent> {
        let mut initial = Vec::new();

        let tempo = self.state.tempo();
        if tempo != DEFAULT_TEMPO {
            initial.push(EventPayload::SetTempo(tempo));
        }

        for (channel, channel_state) in self.state.channels() {
            let program = channel_state.program();
            if program != 0 {
                initial.push(EventPayload::ProgramChange { channel, program });
            }

            for (controller, value) in channel_state.controls() {
                if controller_default(controller) != Some(value) {
                    initial.push(EventPayload::control(channel, controller, value));
                }
            }
        }

        self.output
            .extend(initial.into_iter().map(|payload| TimedEvent::new(0, payload)));
        self.output.sort_by_key(|event| event.time);
        self.output
    }
}
