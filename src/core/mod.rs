pub mod field;
pub mod loudness;
pub mod pitch;
pub mod readout;
pub mod tone;
pub mod wave;

use thiserror::Error;

/// Audible frequency bounds in Hz. Frequencies outside are rejected by
/// callers, never stored.
pub const MIN_FREQUENCY: f32 = 20.0;
pub const MAX_FREQUENCY: f32 = 20000.0;

pub fn audible(frequency: f32) -> bool {
    (MIN_FREQUENCY..=MAX_FREQUENCY).contains(&frequency)
}

/// Errors produced by the pure mapping layer. Callers treat both as
/// "ignore this input, keep prior state".
#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("unknown note name: {0}")]
    InvalidNote(String),
    #[error("frequency {0} Hz is outside the audible range")]
    OutOfRange(f32),
}
