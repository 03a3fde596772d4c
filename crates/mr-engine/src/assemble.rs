//! Packaging reversed events and notes into a new stream.

use alloc::vec::Vec;
use mr_ir::{Stream, TimeDivision, TimedEvent, Track};

/// Build the reversed stream.
///
/// The global events become the first track when there are any; the note
/// tracks follow in their original order. `division` is carried unchanged.
pub fn assemble(
    global_events: Vec<TimedEvent>,
    note_tracks: Vec<Track>,
    division: TimeDivision,
) -> Stream {
    let mut tracks = Vec::with_capacity(note_tracks.len() + 1);
    if !global_events.is_empty() {
        tracks.push(Track::from_events(global_events));
    }
    tracks.extend(note_tracks);
    Stream::new(tracks, division)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use mr_ir::{EventPayload, Note};

    #[test]
    fn global_track_comes_first() {
        let events = vec![TimedEvent::new(0, EventPayload::SetTempo(400_000))];
        let notes = vec![Track::from_notes(vec![Note::new(60, 0, 0, 10)])];
        let stream = assemble(events, notes, TimeDivision::TicksPerBeat(96));

        assert_eq!(stream.tracks.len(), 2);
        assert_eq!(stream.tracks[0].events.len(), 1);
        assert!(stream.tracks[0].notes.is_empty());
        assert_eq!(stream.tracks[1].notes.len(), 1);
    }

    #[test]
    fn no_global_track_without_events() {
        let notes = vec![Track::default(), Track::default()];
        let stream = assemble(Vec::new(), notes, TimeDivision::default());
        assert_eq!(stream.tracks.len(), 2);
    }

    #[test]
    fn timecode_division_is_preserved() {
        let division = TimeDivision::Timecode {
            frames_per_second: 25,
            ticks_per_frame: 40,
        };
        let stream = assemble(Vec::new(), Vec::new(), division);
        assert_eq!(stream.division, division);
        assert!(stream.tracks.is_empty());
    }
}
