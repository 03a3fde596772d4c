//! Power-on defaults for the controllers whose prior value can be assumed.

/// Modulation wheel
pub const MODULATION: u8 = 1;
/// Channel volume
pub const VOLUME: u8 = 7;
/// Pan
pub const PAN: u8 = 10;
/// Expression
pub const EXPRESSION: u8 = 11;
/// Sustain pedal
pub const SUSTAIN: u8 = 64;
/// Reset all controllers
pub const RESET_ALL_CONTROLLERS: u8 = 121;

/// Controller id → default value, for every controller with a known default.
pub const CONTROLLER_DEFAULTS: [(u8, u8); 6] = [
    (MODULATION, 0),
    (VOLUME, 100),
    (PAN, 64),
    (EXPRESSION, 127),
    (SUSTAIN, 0),
    (RESET_ALL_CONTROLLERS, 0),
];

/// Default value of `controller`, or `None` when nothing can be assumed.
pub const fn controller_default(controller: u8) -> Option<u8> {
    match controller {
        MODULATION => Some(0),
        VOLUME => Some(100),
        PAN => Some(64),
        EXPRESSION => Some(127),
        SUSTAIN => Some(0),
        RESET_ALL_CONTROLLERS => Some(0),
        _ => None,
    }
}
