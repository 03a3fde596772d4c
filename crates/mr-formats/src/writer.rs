//! Standard MIDI File writer.

use std::path::Path;

use midly::num::{u15, u24, u28, u4, u7};
use midly::{Format, Fps, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use mr_ir::{EventPayload, Stream, TimeDivision, Track};

use crate::FormatError;

/// Largest delta time a variable-length quantity can hold.
const MAX_DELTA: u64 = (1 << 28) - 1;

/// Largest tempo a tempo meta event can hold.
const MAX_TEMPO: u32 = (1 << 24) - 1;

/// Serialize a stream to Standard MIDI File bytes (format 1).
pub fn write_smf(stream: &Stream) -> Result<Vec<u8>, FormatError> {
    let smf = to_smf(stream)?;
    let mut buf = Vec::new();
    smf.write_std(&mut buf)?;
    Ok(buf)
}

/// Serialize a stream and write it to `path`, replacing any existing file.
pub fn save_smf(stream: &Stream, path: impl AsRef<Path>) -> Result<(), FormatError> {
    let bytes = write_smf(stream)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

fn to_smf(stream: &Stream) -> Result<Smf<'_>, FormatError> {
    let timing = match stream.division {
        TimeDivision::TicksPerBeat(ticks) if ticks > 0 && ticks <= 0x7FFF => {
            Timing::Metrical(u15::new(ticks))
        }
        TimeDivision::Timecode {
            frames_per_second,
            ticks_per_frame,
        } => match Fps::from_int(frames_per_second) {
            Some(fps) => Timing::Timecode(fps, ticks_per_frame),
            None => return Err(FormatError::UnsupportedDivision(stream.division)),
        },
        TimeDivision::TicksPerBeat(_) => {
            return Err(FormatError::UnsupportedDivision(stream.division))
        }
    };

    let mut smf = Smf::new(Header::new(Format::Parallel, timing));
    for track in &stream.tracks {
        smf.tracks.push(encode_track(track)?);
    }
    Ok(smf)
}

/// Ordering of messages sharing a tick.
///
/// Releasing before re-striking keeps back-to-back notes on the same key
/// from swallowing each other. A zero-length note is struck and released
/// before any longer note on that tick starts, so its own off can only
/// pair with its own on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Slot {
    NoteOff,
    Event,
    ZeroLengthOn,
    ZeroLengthOff,
    NoteOn,
}

fn encode_track(track: &Track) -> Result<Vec<TrackEvent<'_>>, FormatError> {
    let mut timeline: Vec<(u64, Slot, TrackEventKind<'_>)> =
        Vec::with_capacity(track.notes.len() * 2 + track.events.len());

    for note in &track.notes {
        let channel = u4::new(note.channel & 0x0F);
        let key = u7::new(note.pitch & 0x7F);
        let (on_slot, off_slot) = if note.length == 0 {
            (Slot::ZeroLengthOn, Slot::ZeroLengthOff)
        } else {
            (Slot::NoteOn, Slot::NoteOff)
        };
        timeline.push((
            note.start,
            on_slot,
            TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn {
                    key,
                    vel: u7::new(note.velocity & 0x7F),
                },
            },
        ));
        timeline.push((
            note.end(),
            off_slot,
            TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff {
                    key,
                    vel: u7::new(note.off_velocity & 0x7F),
                },
            },
        ));
    }

    for event in &track.events {
        timeline.push((event.time, Slot::Event, encode_payload(event.payload)));
    }

    timeline.sort_by_key(|&(time, slot, _)| (time, slot));

    let mut out = Vec::with_capacity(timeline.len() + 2);
    if !track.name.is_empty() {
        out.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::TrackName(track.name.as_bytes())),
        });
    }

    let mut last = 0;
    for (time, _, kind) in timeline {
        out.push(TrackEvent {
            delta: delta(last, time)?,
            kind,
        });
        last = time;
    }

    out.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    Ok(out)
}

fn delta(from: u64, to: u64) -> Result<u28, FormatError> {
    let gap = to - from;
    if gap > MAX_DELTA {
        return Err(FormatError::DeltaOverflow(gap));
    }
    Ok(u28::new(gap as u32))
}

fn encode_payload(payload: EventPayload) -> TrackEventKind<'static> {
    match payload {
        EventPayload::SetTempo(tempo) => {
            TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo.min(MAX_TEMPO))))
        }
        EventPayload::ProgramChange { channel, program } => TrackEventKind::Midi {
            channel: u4::new(channel & 0x0F),
            message: MidiMessage::ProgramChange {
                program: u7::new(program & 0x7F),
            },
        },
        EventPayload::ControlChange {
            channel,
            controller,
            value,
        } => TrackEventKind::Midi {
            channel: u4::new(channel & 0x0F),
            message: MidiMessage::Controller {
                controller: u7::new(controller & 0x7F),
                value: u7::new(value & 0x7F),
            },
        },
        EventPayload::TimeSignature {
            numerator,
            denominator,
            clocks_per_click,
            thirty_seconds_per_quarter,
        } => TrackEventKind::Meta(MetaMessage::TimeSignature(
            numerator,
            denominator,
            clocks_per_click,
            thirty_seconds_per_quarter,
        )),
        EventPayload::KeySignature { sharps, minor } => {
            TrackEventKind::Meta(MetaMessage::KeySignature(sharps, minor))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mr_ir::{Note, TimedEvent};

    fn kinds(bytes: &[u8], track: usize) -> Vec<(u32, String)> {
        let smf = Smf::parse(bytes).unwrap();
        let mut tick = 0;
        smf.tracks[track]
            .iter()
            .map(|event| {
                tick += event.delta.as_int();
                (tick, format!("{:?}", event.kind))
            })
            .collect()
    }

    #[test]
    fn writes_format_one_with_division() {
        let stream = Stream::new(vec![Track::default()], TimeDivision::TicksPerBeat(384));
        let bytes = write_smf(&stream).unwrap();
        let smf = Smf::parse(&bytes).unwrap();
        assert_eq!(smf.header.format, Format::Parallel);
        assert_eq!(smf.header.timing, Timing::Metrical(u15::new(384)));
        assert_eq!(smf.tracks.len(), 1);
    }

    #[test]
    fn every_track_ends_with_end_of_track() {
        let track = Track::from_notes(vec![Note::new(60, 0, 0, 96)]);
        let bytes = write_smf(&Stream::new(vec![track], TimeDivision::default())).unwrap();
        let events = kinds(&bytes, 0);
        let (tick, last) = events.last().unwrap();
        assert_eq!(*tick, 96);
        assert!(last.contains("EndOfTrack"));
    }

    #[test]
    fn note_off_precedes_note_on_at_same_tick() {
        let track = Track::from_notes(vec![Note::new(60, 0, 0, 10), Note::new(60, 0, 10, 10)]);
        let bytes = write_smf(&Stream::new(vec![track], TimeDivision::default())).unwrap();
        let events = kinds(&bytes, 0);

        assert_eq!(events[1].0, 10);
        assert!(events[1].1.contains("NoteOff"));
        assert_eq!(events[2].0, 10);
        assert!(events[2].1.contains("NoteOn"));
    }

    #[test]
    fn zero_length_note_is_struck_before_released() {
        let track = Track::from_notes(vec![
            Note::new(36, 9, 0, 10),
            Note::new(36, 9, 10, 0),
            Note::new(36, 9, 10, 5),
        ]);
        let bytes = write_smf(&Stream::new(vec![track], TimeDivision::default())).unwrap();
        let order: Vec<(u32, bool)> = kinds(&bytes, 0)
            .iter()
            .filter(|(_, kind)| kind.contains("Note"))
            .map(|(tick, kind)| (*tick, kind.contains("NoteOn")))
            .collect();

        assert_eq!(
            order,
            [(0, true), (10, false), (10, true), (10, false), (10, true), (15, false)]
        );
    }

    #[test]
    fn events_keep_their_order_within_a_tick() {
        let track = Track::from_events(vec![
            TimedEvent::new(0, EventPayload::control(0, 7, 100)),
            TimedEvent::new(0, EventPayload::control(0, 7, 90)),
        ]);
        let bytes = write_smf(&Stream::new(vec![track], TimeDivision::default())).unwrap();
        let events = kinds(&bytes, 0);
        assert!(events[0].1.contains("100"));
        assert!(events[1].1.contains("90"));
    }

    #[test]
    fn track_name_written_first() {
        let mut track = Track::new("Bass");
        track.notes.push(Note::new(40, 1, 0, 5));
        let bytes = write_smf(&Stream::new(vec![track], TimeDivision::default())).unwrap();
        let smf = Smf::parse(&bytes).unwrap();
        assert_eq!(
            smf.tracks[0][0].kind,
            TrackEventKind::Meta(MetaMessage::TrackName(b"Bass"))
        );
    }

    #[test]
    fn timecode_division_round_trips() {
        let division = TimeDivision::Timecode {
            frames_per_second: 25,
            ticks_per_frame: 40,
        };
        let bytes = write_smf(&Stream::new(Vec::new(), division)).unwrap();
        let smf = Smf::parse(&bytes).unwrap();
        assert_eq!(smf.header.timing, Timing::Timecode(Fps::Fps25, 40));
    }

    #[test]
    fn bad_divisions_are_rejected() {
        for division in [
            TimeDivision::TicksPerBeat(0),
            TimeDivision::TicksPerBeat(0x8000),
            TimeDivision::Timecode {
                frames_per_second: 31,
                ticks_per_frame: 4,
            },
        ] {
            let result = write_smf(&Stream::new(Vec::new(), division));
            assert!(matches!(result, Err(FormatError::UnsupportedDivision(_))), "{:?}", division);
        }
    }

    #[test]
    fn huge_gap_is_an_error() {
        let track = Track::from_events(vec![TimedEvent::new(1 << 30, EventPayload::SetTempo(1))]);
        let result = write_smf(&Stream::new(vec![track], TimeDivision::default()));
        assert!(matches!(result, Err(FormatError::DeltaOverflow(_))));
    }
}
