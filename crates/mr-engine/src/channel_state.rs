//! Per-channel state tracked during the reversal scan.

use heapless::LinearMap;

/// One slot per 7-bit controller id.
pub const MAX_CONTROLLERS: usize = 128;

/// Program and controller values of a single MIDI channel.
///
/// Controllers iterate in the order they were first recorded.
#[derive(Clone, Debug, Default)]
pub struct ChannelState {
    /// Current program (0-127)
    program: u8,
    /// Controller id → last recorded value
    controls: LinearMap<u8, u8, MAX_CONTROLLERS>,
}

impl ChannelState {
    /// Create a channel with program 0 and no recorded controllers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a channel that already selected `program`.
    pub fn with_program(program: u8) -> Self {
        Self {
            program,
            ..Self::default()
        }
    }

    /// Current program.
    pub fn program(&self) -> u8 {
        self.program
    }

    /// Select a new program, returning the one it replaces.
    pub fn set_program(&mut self, program: u8) -> u8 {
        core::mem::replace(&mut self.program, program)
    }

    #[cfg(test)]
    fn control(&self, controller: u8) -> Option<u8> {
        self.controls.get(&(controller & 0x7F)).copied()
    }

    /// Record a controller value, returning the previous one if the
    /// controller had been recorded before.
    pub fn record_control(&mut self, controller: u8, value: u8) -> Option<u8> {
        // Keys are masked to 7 bits, so the map never runs out of slots.
        self.controls
            .insert(controller & 0x7F, value)
            .unwrap_or_default()
    }

    /// Recorded controllers as `(controller, value)`, in first-recorded order.
    pub fn controls(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.controls.iter().map(|(&c, &v)| (c, v))
    }
}
