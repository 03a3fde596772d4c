//! Standard MIDI File reader.

use std::collections::{BTreeMap, VecDeque};

use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use mr_ir::{EventPayload, Note, Stream, TimeDivision, TimedEvent, Track};

use crate::{repair, FormatError};

/// Load a Standard MIDI File from bytes.
///
/// Note-on/note-off pairs become [`Note`]s; tempo, program, controller,
/// time signature and key signature messages become [`TimedEvent`]s.
/// Everything else is dropped. Channel data bytes with the top bit set
/// keep their low 7 bits.
pub fn load_smf(data: &[u8]) -> Result<Stream, FormatError> {
    let data = repair::mask_data_bytes(data);
    let smf = Smf::parse(&data)?;

    let division = match smf.header.timing {
        Timing::Metrical(ticks) => TimeDivision::TicksPerBeat(ticks.as_int()),
        Timing::Timecode(fps, ticks_per_frame) => TimeDivision::Timecode {
            frames_per_second: fps.as_int(),
            ticks_per_frame,
        },
    };

    let tracks = smf
        .tracks
        .iter()
        .enumerate()
        .map(|(index, events)| read_track(index, events))
        .collect();

    Ok(Stream::new(tracks, division))
}

fn read_track(index: usize, events: &[TrackEvent<'_>]) -> Track {
    let mut reader = TrackReader::default();
    let mut tick: u64 = 0;
    for event in events {
        tick += u64::from(event.delta.as_int());
        reader.read_event(tick, event.kind);
    }
    if !matches!(
        events.last().map(|event| event.kind),
        Some(TrackEventKind::Meta(MetaMessage::EndOfTrack))
    ) {
        log::warn!(
            "track {}: no end-of-track marker, events after tick {} may be lost",
            index,
            tick
        );
    }
    reader.finish(index)
}

/// A note-on still waiting for its note-off.
struct OpenNote {
    start: u64,
    velocity: u8,
    /// Position in note-on order, for stable sorting
    seq: usize,
}

#[derive(Default)]
struct TrackReader {
    track: Track,
    named: bool,
    /// (channel, key) → open notes, oldest first
    open: BTreeMap<(u8, u8), VecDeque<OpenNote>>,
    /// Closed notes with their note-on sequence number
    closed: Vec<(usize, Note)>,
    next_seq: usize,
    dropped: usize,
    unmatched_offs: usize,
}

impl TrackReader {
    fn read_event(&mut self, tick: u64, kind: TrackEventKind<'_>) {
        match kind {
            TrackEventKind::Midi { channel, message } => {
                self.read_message(tick, channel.as_int(), message);
            }
            TrackEventKind::Meta(meta) => self.read_meta(tick, meta),
            TrackEventKind::SysEx(_) | TrackEventKind::Escape(_) => self.dropped += 1,
        }
    }

    fn read_message(&mut self, tick: u64, channel: u8, message: MidiMessage) {
        match message {
            MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                self.note_on(tick, channel, key.as_int(), vel.as_int());
            }
            // Zero-velocity note-on doubles as note-off
            MidiMessage::NoteOn { key, .. } => self.note_off(tick, channel, key.as_int(), 0),
            MidiMessage::NoteOff { key, vel } => {
                self.note_off(tick, channel, key.as_int(), vel.as_int());
            }
            MidiMessage::ProgramChange { program } => self.push_event(
                tick,
                EventPayload::ProgramChange {
                    channel,
                    program: program.as_int(),
                },
            ),
            MidiMessage::Controller { controller, value } => self.push_event(
                tick,
                EventPayload::control(channel, controller.as_int(), value.as_int()),
            ),
            MidiMessage::Aftertouch { .. }
            | MidiMessage::ChannelAftertouch { .. }
            | MidiMessage::PitchBend { .. } => self.dropped += 1,
        }
    }

    fn read_meta(&mut self, tick: u64, meta: MetaMessage<'_>) {
        match meta {
            MetaMessage::Tempo(tempo) => {
                self.push_event(tick, EventPayload::SetTempo(tempo.as_int()));
            }
            MetaMessage::TimeSignature(numerator, denominator, clocks_per_click, notated) => {
                self.push_event(
                    tick,
                    EventPayload::TimeSignature {
                        numerator,
                        denominator,
                        clocks_per_click,
                        thirty_seconds_per_quarter: notated,
                    },
                );
            }
            MetaMessage::KeySignature(sharps, minor) => {
                self.push_event(tick, EventPayload::KeySignature { sharps, minor });
            }
            MetaMessage::TrackName(name) if !self.named => {
                self.track.set_name(&String::from_utf8_lossy(name));
                self.named = true;
            }
            MetaMessage::EndOfTrack => {}
            _ => self.dropped += 1,
        }
    }

    fn push_event(&mut self, tick: u64, payload: EventPayload) {
        self.track.events.push(TimedEvent::new(tick, payload));
    }

    fn note_on(&mut self, tick: u64, channel: u8, key: u8, velocity: u8) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.open.entry((channel, key)).or_default().push_back(OpenNote {
            start: tick,
            velocity,
            seq,
        });
    }

    /// Close the oldest open note on (channel, key).
    fn note_off(&mut self, tick: u64, channel: u8, key: u8, off_velocity: u8) {
        let Some(open) = self.open.get_mut(&(channel, key)).and_then(VecDeque::pop_front) else {
            log::trace!("note-off without note-on: channel {} key {} at {}", channel, key, tick);
            self.unmatched_offs += 1;
            return;
        };
        let note = Note::new(key, channel, open.start, tick - open.start)
            .with_velocities(open.velocity, off_velocity);
        self.closed.push((open.seq, note));
    }

    fn finish(mut self, index: usize) -> Track {
        let unterminated: usize = self.open.values().map(VecDeque::len).sum();
        if unterminated > 0 {
            log::debug!("track {}: dropped {} notes with no note-off", index, unterminated);
        }
        if self.unmatched_offs > 0 {
            log::debug!("track {}: ignored {} unmatched note-offs", index, self.unmatched_offs);
        }
        if self.dropped > 0 {
            log::debug!("track {}: skipped {} unsupported events", index, self.dropped);
        }

        self.closed.sort_by_key(|&(seq, note)| (note.start, seq));
        self.track.notes = self.closed.into_iter().map(|(_, note)| note).collect();
        self.track
    }
}
