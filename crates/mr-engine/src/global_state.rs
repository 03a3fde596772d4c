//! Stream-wide playback state built up during the reversal scan.

use heapless::LinearMap;
use mr_ir::DEFAULT_TEMPO;

use crate::channel_state::ChannelState;

/// Number of MIDI channels per stream.
pub const MIDI_CHANNELS: usize = 16;

/// Tempo plus one [`ChannelState`] per channel touched so far.
///
/// Channels are registered lazily and iterate in first-touch order.
#[derive(Clone, Debug)]
pub struct GlobalState {
    /// Current tempo in microseconds per beat
    tempo: u32,
    /// Channel index → channel state
    channels: LinearMap<u8, ChannelState, MIDI_CHANNELS>,
}

impl Default for GlobalState {
    fn default() -> Self {
        Self {
            tempo: DEFAULT_TEMPO,
            channels: LinearMap::new(),
        }
    }
}

impl GlobalState {
    /// Fresh state: default tempo, no channels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current tempo.
    pub fn tempo(&self) -> u32 {
        self.tempo
    }

    /// Set a new tempo, returning the one it replaces.
    pub fn set_tempo(&mut self, tempo: u32) -> u32 {
        core::mem::replace(&mut self.tempo, tempo)
    }

    #[cfg(test)]
    fn channel(&self, channel: u8) -> Option<&ChannelState> {
        self.channels.get(&(channel & 0x0F))
    }

    /// Mutable state of `channel`, if it has been registered.
    pub fn channel_mut(&mut self, channel: u8) -> Option<&mut ChannelState> {
        self.channels.get_mut(&(channel & 0x0F))
    }

    /// Register `channel` with an initial state.
    ///
    /// Replaces any state already registered for it.
    pub fn register(&mut self, channel: u8, state: ChannelState) {
        // Keys are masked to 4 bits, so the map never runs out of slots.
        let _ = self.channels.insert(channel & 0x0F, state);
    }

    /// Registered channels in first-touch order.
    pub fn channels(&self) -> impl Iterator<Item = (u8, &ChannelState)> + '_ {
        self.channels.iter().map(|(&ch, state)| (ch, state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn starts_at_default_tempo() {
        let state = GlobalState::new();
        assert_eq!(state.tempo(), DEFAULT_TEMPO);
        assert_eq!(state.channels().count(), 0);
    }

    #[test]
    fn set_tempo_returns_previous() {
        let mut state = GlobalState::new();
        assert_eq!(state.set_tempo(400_000), DEFAULT_TEMPO);
        assert_eq!(state.set_tempo(300_000), 400_000);
    }

    #[test]
    fn unregistered_channel_is_absent() {
        let mut state = GlobalState::new();
        assert!(state.channel(3).is_none());
        assert!(state.channel_mut(3).is_none());
    }

    #[test]
    fn register_then_lookup() {
        let mut state = GlobalState::new();
        state.register(9, ChannelState::with_program(33));
        assert_eq!(state.channel(9).map(ChannelState::program), Some(33));
    }

    #[test]
    fn channels_keep_first_touch_order() {
        let mut state = GlobalState::new();
        state.register(9, ChannelState::new());
        state.register(0, ChannelState::new());
        state.register(4, ChannelState::new());

        let order: Vec<u8> = state.channels().map(|(ch, _)| ch).collect();
        assert_eq!(order, [9, 0, 4]);
    }
}
