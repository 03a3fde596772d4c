//! Format I/O for midireverse.
//!
//! Reads Standard MIDI Files into the stream IR and writes streams back
//! out. Parsing is delegated to `midly` in its lenient (non-strict) mode,
//! after out-of-range data bytes are masked to 7 bits.

mod reader;
mod repair;
mod writer;

pub use reader::load_smf;
pub use writer::{save_smf, write_smf};

use mr_ir::TimeDivision;
use thiserror::Error;

/// Error type for format reading and writing.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The bytes are not a Standard MIDI File midly can recover
    #[error("malformed MIDI data: {0}")]
    Malformed(#[from] midly::Error),
    /// The header cannot encode this time division
    #[error("unsupported time division {0:?}")]
    UnsupportedDivision(TimeDivision),
    /// Two consecutive events are further apart than a delta time can express
    #[error("gap of {0} ticks exceeds the 28-bit delta-time limit")]
    DeltaOverflow(u64),
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
